//! Error handling for configuration loading.
//!
//! This module defines the `Error` type raised while reading and merging the
//! TOML configuration file, along with a convenient `Result` type alias.
//!
//! # Examples
//!
//! ```
//! use pyclientgen::core::error::{Error, Result};
//!
//! fn require_output(output: Option<&str>) -> Result<&str> {
//!     output.ok_or_else(|| Error::config("output directory is required"))
//! }
//!
//! assert!(require_output(None).is_err());
//! ```

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for configuration operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
