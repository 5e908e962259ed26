//! Application-wide error types using thiserror.

use herald_commands::RegistryError;
use herald_common::HeraldError;
use poise::serenity_prelude as serenity;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] HeraldError),

    /// Command loading error.
    #[error("Command loading error: {0}")]
    Registry(#[from] RegistryError),

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Slash command registration error.
    #[error("Registration error: {0}")]
    Registration(String),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
