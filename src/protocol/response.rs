//! Server message definitions
//!
//! Everything the server pushes to a client, rendered as one text line.

use std::fmt;

use crate::error::KeywardError;

/// A message pushed from the server to one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Keys known at the moment the client connected
    KeySnapshot { keys: Vec<String> },

    /// Broadcast: a key was added (the value is never broadcast)
    Added { key: String },

    /// Broadcast: a key was removed
    Removed { key: String },

    /// Owner fast-path read
    Value { value: String },

    /// Sent to an owner when someone else wants to read their key
    AccessRequested { key: String },

    /// Sent to a requester whose read was approved
    Approved { value: String },

    /// Sent to a requester whose read was denied
    Denied,

    /// Reply to a GET on a key that does not exist (sent without a prefix)
    NotFound,

    /// Direct error reply
    Error { message: String },
}

impl ServerMessage {
    /// Create an error reply from an error
    pub fn error(err: &KeywardError) -> Self {
        match err {
            KeywardError::KeyNotFound => Self::NotFound,
            _ => Self::Error {
                message: err.to_string(),
            },
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::KeySnapshot { keys } => {
                write!(f, "List of available keys: [{}]", keys.join(", "))
            }
            ServerMessage::Added { key } => write!(f, "New object added: Key={key}"),
            ServerMessage::Removed { key } => write!(f, "Object removed: Key={key}"),
            ServerMessage::Value { value } => write!(f, "Object found: {value}"),
            ServerMessage::AccessRequested { key } => write!(
                f,
                "Client requests to view object with key: {key}. \
                 Approve? [REQUEST:{key}:approve or REQUEST:{key}:deny]"
            ),
            ServerMessage::Approved { value } => {
                write!(f, "Approval received. Object value: {value}")
            }
            ServerMessage::Denied => f.write_str("Approval denied."),
            ServerMessage::NotFound => f.write_str("Key not found."),
            ServerMessage::Error { message } => write!(f, "Error: {message}"),
        }
    }
}
