//! Core configuration and error types shared by the CLI and the library

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
