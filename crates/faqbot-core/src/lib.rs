//! FAQ Bot Core — shared error type and server configuration.

pub mod config;
pub mod error;

pub use config::FaqBotConfig;
pub use error::{Error, Result};
