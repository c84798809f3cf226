//! Protocol codec
//!
//! Line framing for the wire protocol.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────┬──────┐
//! │   UTF-8 text (no '\n' inside)       │ '\n' │
//! └─────────────────────────────────────┴──────┘
//! ```
//! A trailing `'\r'` is tolerated so telnet/netcat clients work. Blank lines
//! are skipped.

use std::io::{BufRead, Read, Write};

use crate::error::{KeywardError, Result};
use super::{Command, ServerMessage};

/// Maximum line length in bytes, terminator excluded (64 KB)
pub const MAX_LINE_LEN: usize = 64 * 1024;

const LINE_ENDINGS: &[u8] = b"\r\n";

/// Read the next non-empty line from a stream
///
/// Returns `Ok(None)` on a clean end of stream.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        // Room for a full line plus its "\r\n"
        let limit = (MAX_LINE_LEN + 2) as u64;
        let read = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }

        let mut len = buf.len();
        while len > 0 && LINE_ENDINGS.contains(&buf[len - 1]) {
            len -= 1;
        }
        if len > MAX_LINE_LEN {
            return Err(KeywardError::Protocol(format!(
                "Line too long: more than {} bytes",
                MAX_LINE_LEN
            )));
        }
        if len == 0 {
            continue;
        }

        let line = std::str::from_utf8(&buf[..len])
            .map_err(|e| KeywardError::Protocol(format!("Line is not valid UTF-8: {}", e)))?;
        return Ok(Some(line.to_string()));
    }
}

/// Write one line and flush
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write a command in its wire form
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    write_line(writer, &command.to_string())
}

/// Write a server message
pub fn write_message<W: Write>(writer: &mut W, message: &ServerMessage) -> Result<()> {
    write_line(writer, &message.to_string())
}
