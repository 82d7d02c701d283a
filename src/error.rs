//! Centralized error types and handling

use crate::netlink::AddressFamily;
use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Collection error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Kernel query errors. Any of these aborts the whole collection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("couldn't open netlink connection: {0}")]
    Connection(String),

    #[error("couldn't get links: {0}")]
    Links(String),

    #[error("couldn't get {family} routes: {reason}")]
    Routes {
        family: AddressFamily,
        reason: String,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}
