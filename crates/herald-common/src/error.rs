//! Application-wide error type.

/// Common result type for the application.
pub type Result<T> = std::result::Result<T, HeraldError>;

/// Application-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum HeraldError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging setup error.
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HeraldError {
    /// Creates a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
