pub mod callback_handler;
pub mod command_handler;
pub mod mailing_handler;

pub use callback_handler::CallbackHandler;
pub use command_handler::CommandHandler;
pub use mailing_handler::MailingHandler;
