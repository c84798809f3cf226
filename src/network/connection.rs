//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;

use crate::clients::ClientId;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{KeywardError, Result};
use crate::protocol::{read_line, write_message, ServerMessage};

/// Handles a single client connection
///
/// The connection's own thread reads and dispatches lines; a companion
/// writer thread drains the client's outbound queue to the socket.
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// Reference to the registry engine
    engine: Arc<Engine>,

    /// Registry identity of this connection
    client: ClientId,

    /// Writer thread, joined when the connection ends
    writer: Option<JoinHandle<()>>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Set up a connection: start its writer and register it with the engine.
    ///
    /// Registration pushes the key snapshot, so it is the first line the
    /// client sees.
    pub fn accept(stream: TcpStream, engine: Arc<Engine>, config: &Config) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_write_timeout(config.write_timeout())?;

        // Clone stream for separate read/write handles
        let write_stream = stream.try_clone()?;
        let read_stream = stream;

        let (handle, outbound) = engine.new_client(peer_addr.clone());
        let client = handle.id();

        let writer_peer = peer_addr.clone();
        let writer = thread::Builder::new()
            .name(format!("keyward-writer-{}", client.as_u64()))
            .spawn(move || run_writer(write_stream, outbound, writer_peer))?;

        if let Err(e) = engine.connect(handle) {
            // The handle was dropped with the failed registration, so the
            // writer sees a closed queue and exits on its own.
            let _ = writer.join();
            return Err(e);
        }

        Ok(Self {
            reader: BufReader::new(read_stream),
            engine,
            client,
            writer: Some(writer),
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads lines in a loop and dispatches them. Returns when the client
    /// disconnects, the server closes the connection, or an error occurs.
    /// The client is unregistered in every case.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {} as {}", self.peer_addr, self.client);

        let result = self.read_loop();
        self.engine.disconnect(self.client);
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }

        result
    }

    fn read_loop(&mut self) -> Result<()> {
        loop {
            let line = match read_line(&mut self.reader) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    // Client disconnected gracefully, or the writer shut the socket
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(KeywardError::Io(ref e))
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::ConnectionReset
                            | std::io::ErrorKind::ConnectionAborted
                            | std::io::ErrorKind::UnexpectedEof
                    ) =>
                {
                    tracing::debug!("Connection to {} dropped: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e @ KeywardError::Protocol(_)) => {
                    tracing::warn!("Protocol violation from {}: {}", self.peer_addr, e);
                    self.engine
                        .clients()
                        .send_to(self.client, ServerMessage::error(&e));
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            self.engine.handle_line(self.client, &line);
        }
    }

    /// Registry identity of this connection
    pub fn client(&self) -> ClientId {
        self.client
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Drain a client's outbound queue to its socket.
///
/// Ends when the queue closes (client unregistered) or a write fails. Either
/// way the socket is shut down, which also ends the reading side.
fn run_writer(stream: TcpStream, outbound: Receiver<ServerMessage>, peer_addr: String) {
    let mut writer = BufWriter::new(stream);

    for message in outbound.iter() {
        if let Err(e) = write_message(&mut writer, &message) {
            tracing::warn!("Error writing to {}: {}", peer_addr, e);
            break;
        }
    }

    // Closing the queue first makes further sends to this client fail fast
    drop(outbound);
    let _ = writer.get_ref().shutdown(Shutdown::Both);
    tracing::trace!("Writer for {} finished", peer_addr);
}
