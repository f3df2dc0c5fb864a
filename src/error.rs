// src/error.rs

//! Error types shared across the crate

use crate::compression::CompressionError;
use thiserror::Error;

/// Errors raised while loading configuration, fetching indexes or running
/// the solver
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file is unreadable or malformed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP request failed or returned a non-success status
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    IoError(String),

    /// Required external tool is not installed
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// External command could not be run
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Startup resource (HTTP client, thread pool) could not be created
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
