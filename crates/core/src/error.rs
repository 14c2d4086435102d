//! Error types for litestore
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for litestore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the record store
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid store configuration, surfaced before any state change
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value could not be encoded into its storable byte form
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Stored bytes could not be decoded back into a value.
    /// Signals corruption or a codec/version mismatch.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A predicate failed while being evaluated against a record
    #[error("predicate error: {0}")]
    Predicate(String),

    /// A push-down callback observed predicate state bound by another
    /// thread. Unreachable while the per-instance lock is respected.
    #[error("concurrency invariant violated: {0}")]
    ConcurrencyInvariant(String),

    /// Underlying SQL engine error (durable backend)
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O error (file operations during open, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a `Configuration` error from any displayable cause.
    pub fn configuration(msg: impl std::fmt::Display) -> Self {
        Error::Configuration(msg.to_string())
    }

    /// Build an `Encoding` error from any displayable cause.
    pub fn encoding(msg: impl std::fmt::Display) -> Self {
        Error::Encoding(msg.to_string())
    }

    /// Build a `Decoding` error from any displayable cause.
    pub fn decoding(msg: impl std::fmt::Display) -> Self {
        Error::Decoding(msg.to_string())
    }

    /// Build a `Predicate` error from any displayable cause.
    pub fn predicate(msg: impl std::fmt::Display) -> Self {
        Error::Predicate(msg.to_string())
    }

    /// Build an `Engine` error from any displayable cause.
    pub fn engine(msg: impl std::fmt::Display) -> Self {
        Error::Engine(msg.to_string())
    }
}
