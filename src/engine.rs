//! Engine Module
//!
//! Ties the client registry, ownership store and approval flow together and
//! dispatches parsed commands.
//!
//! ## Responsibilities
//! - Register/unregister connections (with the key snapshot)
//! - Parse and execute client lines
//! - Report command errors to the originating client only

use std::sync::Arc;

use crossbeam::channel::Receiver;

use crate::access::{AccessState, Resolution};
use crate::clients::{ClientHandle, ClientId, ClientRegistry};
use crate::config::Config;
use crate::error::{KeywardError, Result};
use crate::protocol::{Command, ServerMessage, Verdict};
use crate::store::{OwnershipStore, ReadOutcome};

/// The registry engine
///
/// ## Concurrency Model
///
/// Every connection worker calls into the same `Engine` concurrently.
/// Each worker handles its own client's lines strictly in order; ordering
/// between clients is decided by the store lock (see [`crate::store`]).
/// Nothing here blocks on another client: a non-owner GET returns as soon
/// as the owner has been invited.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Live connections
    clients: Arc<ClientRegistry>,

    /// Records and their approval slots
    store: OwnershipStore,
}

impl Engine {
    /// Create an engine with the given config
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let clients = Arc::new(ClientRegistry::new());
        let store = OwnershipStore::new(Arc::clone(&clients));

        Ok(Self {
            config,
            clients,
            store,
        })
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Allocate a handle for a new connection along with its outbound queue
    pub fn new_client(&self, peer: impl Into<String>) -> (ClientHandle, Receiver<ServerMessage>) {
        ClientHandle::channel(
            self.clients.next_id(),
            peer,
            self.config.outbound_queue_capacity,
        )
    }

    /// Register a connection and push the current key snapshot to it.
    ///
    /// Runs under the store read lock so no ADD/REMOVE lands between the
    /// snapshot and the registration.
    pub fn connect(&self, handle: ClientHandle) -> Result<ClientId> {
        let id = handle.id();
        self.store
            .with_keys(|keys| self.clients.register(handle, keys))?;
        Ok(id)
    }

    /// Unregister a connection. Its pending requests are left untouched.
    pub fn disconnect(&self, client: ClientId) {
        self.clients.unregister(client);
    }

    /// Close every connection. Returns how many were closed.
    pub fn shutdown(&self) -> usize {
        self.clients.close_all()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Parse and execute one line from `client`, replying with an error on failure
    pub fn handle_line(&self, client: ClientId, line: &str) {
        tracing::trace!("Received line from {}: {:?}", client, line);

        let result = Command::parse(line).and_then(|command| self.execute(client, command));
        if let Err(e) = result {
            tracing::debug!("Command from {} failed: {}", client, e);
            self.clients.send_to(client, ServerMessage::error(&e));
        }
    }

    /// Execute a command on behalf of `client`
    ///
    /// Routes commands to appropriate handlers. Successful ADD/REMOVE reply
    /// through their broadcast; errors are returned for the caller to report.
    pub fn execute(&self, client: ClientId, command: Command) -> Result<()> {
        match command {
            Command::Add { key, value } => self.store.add(&key, &value, client),
            Command::Remove { key } => self.store.remove(&key, client),
            Command::Get { key } => {
                if let ReadOutcome::Value(value) = self.store.get(&key, client)? {
                    self.clients.send_to(client, ServerMessage::Value { value });
                }
                Ok(())
            }
            Command::Request { key, verdict: Some(verdict) } => {
                self.request(&key, verdict);
                Ok(())
            }
            Command::Request { key, verdict: None } => {
                // A verdict we cannot read still closes the request, as a deny
                self.request(&key, Verdict::Deny);
                Err(KeywardError::MalformedVerdict)
            }
        }
    }

    /// Apply a verdict to the pending request on `key`, returning what happened
    pub fn request(&self, key: &str, verdict: Verdict) -> Resolution {
        self.store.resolve(key, verdict)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn store(&self) -> &OwnershipStore {
        &self.store
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn access_state(&self, key: &str) -> Option<AccessState> {
        self.store.access_state(key)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
