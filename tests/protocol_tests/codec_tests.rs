//! Codec Tests
//!
//! Tests for line framing, command parsing and server message text.

use std::io::Cursor;

use keyward::protocol::{
    read_line, write_command, write_line, write_message, Command, CommandType, ServerMessage,
    Verdict,
};
use keyward::KeywardError;

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_write_line_appends_newline() {
    let mut buf = Vec::new();
    write_line(&mut buf, "GET:car").unwrap();

    assert_eq!(buf, b"GET:car\n");
}

#[test]
fn test_read_many_lines() {
    let mut buf = Vec::new();
    for i in 0..100 {
        write_line(&mut buf, &format!("ADD:key{}:value{}", i, i)).unwrap();
    }

    let mut reader = Cursor::new(buf);
    for i in 0..100 {
        let line = read_line(&mut reader).unwrap().unwrap();
        assert_eq!(line, format!("ADD:key{}:value{}", i, i));
    }
    assert_eq!(read_line(&mut reader).unwrap(), None);
}

#[test]
fn test_read_empty_stream() {
    let mut reader = Cursor::new(Vec::new());
    assert_eq!(read_line(&mut reader).unwrap(), None);
}

#[test]
fn test_crlf_lines() {
    let mut reader = Cursor::new(b"ADD:car:toyota\r\nGET:car\r\n".to_vec());

    let first = read_line(&mut reader).unwrap().unwrap();
    let second = read_line(&mut reader).unwrap().unwrap();

    assert_eq!(Command::parse(&first).unwrap().command_type(), CommandType::Add);
    assert_eq!(Command::parse(&second).unwrap().command_type(), CommandType::Get);
}

#[test]
fn test_unicode_values() {
    let mut buf = Vec::new();
    write_line(&mut buf, "ADD:città:naïve ☃").unwrap();

    let mut reader = Cursor::new(buf);
    let line = read_line(&mut reader).unwrap().unwrap();

    assert_eq!(
        Command::parse(&line).unwrap(),
        Command::Add { key: "città".into(), value: "naïve ☃".into() }
    );
}

#[test]
fn test_max_length_line_is_accepted() {
    let mut data = b"ADD:k:".to_vec();
    data.resize(keyward::protocol::MAX_LINE_LEN, b'x');
    data.push(b'\n');

    let mut reader = Cursor::new(data);
    let line = read_line(&mut reader).unwrap().unwrap();

    assert_eq!(line.len(), keyward::protocol::MAX_LINE_LEN);
}

#[test]
fn test_max_length_line_with_crlf_is_accepted() {
    let mut data = b"ADD:k:".to_vec();
    data.resize(keyward::protocol::MAX_LINE_LEN, b'x');
    data.extend_from_slice(b"\r\nGET:k\r\n");

    let mut reader = Cursor::new(data);
    let line = read_line(&mut reader).unwrap().unwrap();

    assert_eq!(line.len(), keyward::protocol::MAX_LINE_LEN);
    assert_eq!(read_line(&mut reader).unwrap().as_deref(), Some("GET:k"));
}

#[test]
fn test_one_byte_over_with_crlf_is_rejected() {
    let mut data = vec![b'x'; keyward::protocol::MAX_LINE_LEN + 1];
    data.extend_from_slice(b"\r\n");
    let mut reader = Cursor::new(data);

    assert!(matches!(read_line(&mut reader), Err(KeywardError::Protocol(_))));
}

#[test]
fn test_oversized_line_is_rejected() {
    let data = vec![b'x'; keyward::protocol::MAX_LINE_LEN * 2];
    let mut reader = Cursor::new(data);

    assert!(matches!(read_line(&mut reader), Err(KeywardError::Protocol(_))));
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_write_command_wire_form() {
    let mut buf = Vec::new();
    write_command(
        &mut buf,
        &Command::Add { key: "car".into(), value: "toyota".into() },
    )
    .unwrap();
    write_command(
        &mut buf,
        &Command::Request { key: "car".into(), verdict: Some(Verdict::Deny) },
    )
    .unwrap();

    assert_eq!(buf, b"ADD:car:toyota\nREQUEST:car:deny\n");
}

#[test]
fn test_written_command_parses_back() {
    let original = Command::Request { key: "car".into(), verdict: Some(Verdict::Approve) };
    let mut buf = Vec::new();
    write_command(&mut buf, &original).unwrap();

    let mut reader = Cursor::new(buf);
    let line = read_line(&mut reader).unwrap().unwrap();

    assert_eq!(Command::parse(&line).unwrap(), original);
}

#[test]
fn test_command_key_accessor() {
    assert_eq!(Command::parse("REMOVE:car").unwrap().key(), "car");
    assert_eq!(Command::parse("REQUEST:bike:deny").unwrap().key(), "bike");
}

#[test]
fn test_empty_value_is_allowed() {
    assert_eq!(
        Command::parse("ADD:car:").unwrap(),
        Command::Add { key: "car".into(), value: String::new() }
    );
}

#[test]
fn test_empty_command_is_unknown() {
    assert!(matches!(
        Command::parse(":car"),
        Err(KeywardError::UnknownCommand(_))
    ));
}

// =============================================================================
// Server Message Tests
// =============================================================================

#[test]
fn test_server_message_text() {
    let cases = vec![
        (
            ServerMessage::KeySnapshot { keys: vec!["a".into(), "b".into()] },
            "List of available keys: [a, b]",
        ),
        (ServerMessage::Added { key: "car".into() }, "New object added: Key=car"),
        (ServerMessage::Removed { key: "car".into() }, "Object removed: Key=car"),
        (ServerMessage::Value { value: "toyota".into() }, "Object found: toyota"),
        (
            ServerMessage::Approved { value: "toyota".into() },
            "Approval received. Object value: toyota",
        ),
        (ServerMessage::Denied, "Approval denied."),
        (
            ServerMessage::error(&KeywardError::KeyExists),
            "Error: Key already exists.",
        ),
        (ServerMessage::error(&KeywardError::KeyNotFound), "Key not found."),
        (
            ServerMessage::error(&KeywardError::ServerCapacity),
            "Error: server is at capacity",
        ),
    ];

    for (message, expected) in cases {
        assert_eq!(message.to_string(), expected);
    }
}

#[test]
fn test_invitation_is_single_line() {
    let mut buf = Vec::new();
    write_message(&mut buf, &ServerMessage::AccessRequested { key: "car".into() }).unwrap();

    assert_eq!(buf.iter().filter(|b| **b == b'\n').count(), 1);
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("Client requests to view object with key: car."));
    assert!(text.contains("REQUEST:car:approve"));
}
