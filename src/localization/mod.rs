mod messages;

pub use messages::Lang;
