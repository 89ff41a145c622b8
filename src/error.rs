//! Custom error types for the titlebar crate
//!
//! Rendering and window-state operations never fail; errors only surface at the
//! configuration boundary (colors, option files).

use thiserror::Error;

/// Main error type for titlebar configuration
#[derive(Error, Debug)]
pub enum TitlebarError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TitlebarError {
    fn from(err: toml::de::Error) -> Self {
        TitlebarError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for TitlebarError {
    fn from(err: toml::ser::Error) -> Self {
        TitlebarError::Serialization(err.to_string())
    }
}

/// Result type alias for titlebar operations
pub type TitlebarResult<T> = Result<T, TitlebarError>;
