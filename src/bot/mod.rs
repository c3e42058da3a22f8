//! Bot module for handling Telegram interactions
//!
//! - `message_handler`: turns incoming messages into controller input and sends replies
//! - `ui_builder`: renders controller outcomes as localized text

pub mod message_handler;
pub mod ui_builder;

pub use message_handler::{message_handler, recover_from_error};
pub use ui_builder::{bot_commands, render_outcome, Reply};
