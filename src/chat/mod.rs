//! Chat-bot front end: command parsing and reply rendering.
//!
//! Transport-neutral; any message source (terminal, bot SDK) feeds text into
//! [`ChatBot::handle`] and sends back the returned reply.

mod bot;
mod command;

pub use bot::{ChatBot, HELP_TEXT, WELCOME_TEXT};
pub use command::{ChatCommand, CommandError};
