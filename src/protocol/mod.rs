//! Protocol Module
//!
//! Defines the line-oriented wire protocol between clients and the server.
//!
//! ## Request Format
//! ```text
//! COMMAND:KEY[:VALUE]\n
//! ```
//! The command is case-insensitive. A line splits on its first two colons,
//! so values may contain colons of their own.
//!
//! ### Commands
//! - `ADD:key:value`        - create a key owned by the sender
//! - `REMOVE:key`           - delete a key (owner only)
//! - `GET:key`              - read a key; non-owners trigger an approval request
//! - `REQUEST:key:approve`  - answer a pending read request (`approve` / `deny`)
//!
//! ## Server Pushes
//! Every server message is an independent text line. There is no
//! correlation id: broadcasts, direct replies, invitations and verdicts
//! interleave on the same connection in delivery order.

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, Verdict};
pub use response::ServerMessage;
pub use codec::{read_line, write_line, write_command, write_message, MAX_LINE_LEN};
