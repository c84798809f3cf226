//! Error types for Keyward
//!
//! Provides a unified error type for all operations.
//!
//! Registry errors carry the exact text a client sees after the `Error: `
//! prefix, so `Display` is part of the wire contract. `KeyNotFound` is the
//! one reply sent without the prefix.

use thiserror::Error;

/// Result type alias using KeywardError
pub type Result<T> = std::result::Result<T, KeywardError>;

/// Unified error type for Keyward operations
#[derive(Debug, Error)]
pub enum KeywardError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Registry Errors (reported to the originating client only)
    // -------------------------------------------------------------------------
    #[error("Key already exists.")]
    KeyExists,

    #[error("Key not found.")]
    KeyNotFound,

    #[error("Key does not exist or you are not the owner of the key.")]
    NotOwnerOrNotFound,

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    MissingField(MissingField),

    #[error("Unknown command. Valid commands are ADD, REMOVE, GET, REQUEST.")]
    UnknownCommand(String),

    #[error("REQUEST command requires both key and response.")]
    MalformedVerdict,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("server is at capacity")]
    ServerCapacity,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Which required field a command was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    /// ADD needs both a key and a value
    AddKeyOrValue,

    /// REMOVE needs a key
    RemoveKey,

    /// GET needs a key
    GetKey,

    /// REQUEST needs a key (the verdict is checked separately)
    RequestKey,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            MissingField::AddKeyOrValue => "ADD command requires both key and value.",
            MissingField::RemoveKey => "REMOVE command requires a key.",
            MissingField::GetKey => "GET command requires a key.",
            MissingField::RequestKey => "REQUEST command requires both key and response.",
        };
        f.write_str(text)
    }
}
