//! Command definitions
//!
//! Parses client lines into commands.

use std::fmt;
use std::str::FromStr;

use crate::error::{KeywardError, MissingField, Result};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Add,
    Remove,
    Get,
    Request,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Add => "ADD",
            CommandType::Remove => "REMOVE",
            CommandType::Get => "GET",
            CommandType::Request => "REQUEST",
        }
    }
}

impl FromStr for CommandType {
    type Err = KeywardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(CommandType::Add),
            "remove" => Ok(CommandType::Remove),
            "get" => Ok(CommandType::Get),
            "request" => Ok(CommandType::Request),
            other => Err(KeywardError::UnknownCommand(other.to_string())),
        }
    }
}

/// An owner's decision on a pending read request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Deny,
}

impl Verdict {
    /// Parse `approve` / `deny`, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("approve") {
            Some(Verdict::Approve)
        } else if s.eq_ignore_ascii_case("deny") {
            Some(Verdict::Deny)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approve => "approve",
            Verdict::Deny => "deny",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a key owned by the sender
    Add { key: String, value: String },

    /// Delete a key the sender owns
    Remove { key: String },

    /// Read a key, directly or through the owner's approval
    Get { key: String },

    /// Answer the pending request on a key.
    ///
    /// `verdict` is `None` when the line carried something other than
    /// approve/deny; the dispatcher treats that as a deny plus a usage error.
    Request { key: String, verdict: Option<Verdict> },
}

impl Command {
    /// Parse one protocol line (without its line terminator)
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.splitn(3, ':');
        let command_type: CommandType = parts.next().unwrap_or_default().parse()?;
        // An empty key (`GET:`) is still a key
        let key = parts.next().map(str::to_string);
        let value = parts.next();

        match command_type {
            CommandType::Add => match (key, value) {
                (Some(key), Some(value)) => Ok(Command::Add {
                    key,
                    value: value.to_string(),
                }),
                _ => Err(KeywardError::MissingField(MissingField::AddKeyOrValue)),
            },
            CommandType::Remove => key
                .map(|key| Command::Remove { key })
                .ok_or(KeywardError::MissingField(MissingField::RemoveKey)),
            CommandType::Get => key
                .map(|key| Command::Get { key })
                .ok_or(KeywardError::MissingField(MissingField::GetKey)),
            CommandType::Request => key
                .map(|key| Command::Request {
                    key,
                    verdict: value.and_then(Verdict::parse),
                })
                .ok_or(KeywardError::MissingField(MissingField::RequestKey)),
        }
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Add { .. } => CommandType::Add,
            Command::Remove { .. } => CommandType::Remove,
            Command::Get { .. } => CommandType::Get,
            Command::Request { .. } => CommandType::Request,
        }
    }

    /// The key this command targets
    pub fn key(&self) -> &str {
        match self {
            Command::Add { key, .. }
            | Command::Remove { key }
            | Command::Get { key }
            | Command::Request { key, .. } => key,
        }
    }
}

impl fmt::Display for Command {
    /// Renders the wire form, e.g. `ADD:car:toyota`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.command_type().as_str();
        match self {
            Command::Add { key, value } => write!(f, "{name}:{key}:{value}"),
            Command::Remove { key } | Command::Get { key } => write!(f, "{name}:{key}"),
            Command::Request { key, verdict } => {
                // A malformed verdict has no faithful wire form; it goes out as deny.
                let verdict = verdict.unwrap_or(Verdict::Deny);
                write!(f, "{name}:{key}:{}", verdict.as_str())
            }
        }
    }
}
