pub mod bot;
pub mod broadcast;
pub mod config;
pub mod handlers;
pub mod keyboards;
pub mod localization;
pub mod migrations;
pub mod recipient_store;
pub mod transport;
pub mod utils;
