//! TCP Server
//!
//! Accepts connections and runs one worker thread per client.

use std::io::{self, BufWriter};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{KeywardError, Result};
use crate::protocol::{write_message, ServerMessage};
use super::Connection;

/// Cloneable trigger for stopping a running [`Server`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop accepting and close all connections
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for Keyward
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    local_addr: SocketAddr,
    workers: Vec<JoinHandle<()>>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            KeywardError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            config,
            engine,
            listener,
            local_addr,
            workers: Vec::new(),
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Accept errors are logged and never end the loop. On shutdown every
    /// live connection is closed and its worker joined.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr);

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.config.accept_poll_interval());
                }
                Err(e) => {
                    tracing::warn!("Error accepting client connection: {}", e);
                }
            }
        }

        let closed = self.engine.shutdown();
        tracing::info!("Shutting down, closed {} connection(s)", closed);
        // A worker still in setup may register after the first sweep
        while !self.workers.is_empty() {
            self.engine.shutdown();
            self.workers.retain(|worker| !worker.is_finished());
            thread::sleep(self.config.accept_poll_interval());
        }

        Ok(())
    }

    /// Hand an accepted stream to a new worker, or turn it away at capacity
    fn dispatch(&mut self, stream: TcpStream, peer: SocketAddr) {
        tracing::info!("Client connected: {}", peer);

        // Accepted sockets may inherit non-blocking mode from the listener
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Failed to configure stream from {}: {}", peer, e);
            return;
        }

        self.workers.retain(|worker| !worker.is_finished());
        if self.workers.len() >= self.config.max_connections {
            tracing::warn!(
                "Rejecting {}: {} connections already open",
                peer,
                self.config.max_connections
            );
            reject(stream);
            return;
        }

        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();
        let spawned = thread::Builder::new()
            .name(format!("keyward-conn-{}", peer))
            .spawn(move || serve(stream, engine, &config));

        match spawned {
            Ok(worker) => self.workers.push(worker),
            Err(e) => tracing::warn!("Failed to spawn worker for {}: {}", peer, e),
        }
    }

    /// Number of connection workers still running
    pub fn active_workers(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_finished()).count()
    }
}

/// Worker body: one client from accept to disconnect
fn serve(stream: TcpStream, engine: Arc<Engine>, config: &Config) {
    let mut connection = match Connection::accept(stream, engine, config) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.handle() {
        tracing::warn!("Connection {} closed with error: {}", connection.peer_addr(), e);
    }
}

fn reject(stream: TcpStream) {
    let mut writer = BufWriter::new(stream);
    let _ = write_message(
        &mut writer,
        &ServerMessage::error(&KeywardError::ServerCapacity),
    );
}
