//! Error types for the Vigil clustering pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Vigil operations.
#[derive(Error, Debug)]
pub enum VigilError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found or unopenable.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Dataset or record magic did not match the expected constant.
    #[error("Header mismatch: {0}")]
    HeaderMismatch(String),

    /// Feature counts differ between rows of the same dataset.
    #[error("Structural inconsistency: {0}")]
    Structural(String),

    /// An encoder append would overflow the output buffer.
    #[error("Buffer exhausted: need {needed} bytes, {available} available")]
    BufferExhausted {
        /// Bytes the append would occupy, including the reserved end header.
        needed: usize,
        /// Remaining capacity of the output buffer.
        available: usize,
    },

    /// A record payload exceeds the wire format's 16-bit size field.
    #[error("Payload too large: {0} bytes exceeds the record size field")]
    PayloadTooLarge(usize),

    /// Unrecognized generator name in the configuration.
    #[error("Unknown generator function: {0}")]
    UnknownGenerator(String),

    /// Unrecognized neighborhood function name in the configuration.
    #[error("Unknown neighborhood function: {0}")]
    UnknownNeighborhood(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during training.
    #[error("Training error: {0}")]
    Training(String),
}

/// Result type alias for Vigil operations.
pub type Result<T> = std::result::Result<T, VigilError>;
