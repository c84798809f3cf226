//! Keyward CLI Client
//!
//! Interactive client: type `ADD <key> <value>`, `REMOVE <key>`, `GET <key>`
//! or `REQUEST <key> <approve|deny>`. Server messages are printed as they
//! arrive, independent of what you are typing.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::thread;

use clap::Parser;
use crossterm::style::Stylize;
use crossterm::{cursor, execute, terminal};
use keyward::protocol::{read_line, write_line};

/// Keyward CLI
#[derive(Parser, Debug)]
#[command(name = "keyward-cli")]
#[command(about = "Interactive client for the Keyward registry")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:12345")]
    server: String,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> io::Result<()> {
    let stream = TcpStream::connect(&args.server)?;
    println!("Connected to server at {}", args.server);

    let read_stream = stream.try_clone()?;
    thread::spawn(move || listen_for_server_messages(read_stream));

    println!(
        "{}",
        "Available commands:\n-> ADD <key> <value>\n-> REMOVE <key>\n-> GET <key>\n-> REQUEST <key> <approve/deny>"
            .bold()
    );
    prompt()?;

    let mut writer = BufWriter::new(stream);
    for line in io::stdin().lock().lines() {
        let line = line?;
        match to_wire(&line) {
            Some(wire) => {
                if let Err(e) = write_line(&mut writer, &wire) {
                    eprintln!("Failed to send command: {}", e);
                    break;
                }
            }
            None => print_server_line(
                "Invalid command. Please provide at least a command and a key.",
            )?,
        }
        prompt()?;
    }

    Ok(())
}

/// Turn `CMD key [value words...]` into `CMD:key[:value]`
fn to_wire(input: &str) -> Option<String> {
    let mut words = input.split_whitespace();
    let command = words.next()?;
    let key = words.next()?;
    let value: Vec<&str> = words.collect();

    if value.is_empty() {
        Some(format!("{command}:{key}"))
    } else {
        Some(format!("{command}:{key}:{}", value.join(" ")))
    }
}

fn listen_for_server_messages(stream: TcpStream) {
    let mut reader = BufReader::new(stream);
    loop {
        match read_line(&mut reader) {
            Ok(Some(line)) => {
                if print_server_line(&line).and_then(|_| prompt()).is_err() {
                    return;
                }
            }
            Ok(None) => {
                println!("\nLost connection to server");
                std::process::exit(0);
            }
            Err(e) => {
                println!("\nLost connection to server: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Print a server line over whatever prompt is currently shown
fn print_server_line(line: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine)
    )?;
    writeln!(stdout, "{} {}", "Server:".blue().bold(), line)
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{} ", "Client:".green().bold())?;
    stdout.flush()
}
