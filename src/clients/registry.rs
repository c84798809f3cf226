//! Client registry implementation
//!
//! HashMap of live clients behind a RwLock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::RwLock;

use crate::error::{KeywardError, Result};
use crate::protocol::ServerMessage;
use super::ClientId;

/// Outbound side of one connection
///
/// Not `Clone`: the registry holds the only sender, so removing a client
/// from the registry closes its queue and lets the writer thread finish.
#[derive(Debug)]
pub struct ClientHandle {
    id: ClientId,
    peer: String,
    outbound: Sender<ServerMessage>,
}

impl ClientHandle {
    pub fn new(id: ClientId, peer: impl Into<String>, outbound: Sender<ServerMessage>) -> Self {
        Self {
            id,
            peer: peer.into(),
            outbound,
        }
    }

    /// Create a handle together with the receiving end of its queue
    pub fn channel(
        id: ClientId,
        peer: impl Into<String>,
        capacity: usize,
    ) -> (Self, Receiver<ServerMessage>) {
        let (tx, rx) = channel::bounded(capacity);
        (Self::new(id, peer, tx), rx)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Enqueue a message without blocking
    pub fn send(&self, message: ServerMessage) -> Result<()> {
        self.outbound.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => KeywardError::Network(format!(
                "outbound queue for {} ({}) is full",
                self.id, self.peer
            )),
            TrySendError::Disconnected(_) => KeywardError::Network(format!(
                "connection {} ({}) is closed",
                self.id, self.peer
            )),
        })
    }
}

/// Registry of every connected client
pub struct ClientRegistry {
    /// Live clients by id
    clients: RwLock<HashMap<ClientId, ClientHandle>>,

    /// Source of fresh client ids
    next_id: AtomicU64,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate an id for a connection about to register
    pub fn next_id(&self) -> ClientId {
        ClientId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a client and send it the snapshot of known keys.
    ///
    /// A client that cannot take its snapshot is not registered.
    pub fn register(&self, handle: ClientHandle, keys: Vec<String>) -> Result<()> {
        handle.send(ServerMessage::KeySnapshot { keys })?;

        tracing::debug!("Registered {} ({})", handle.id(), handle.peer());
        self.clients.write().insert(handle.id(), handle);
        Ok(())
    }

    /// Remove a client and close its queue. Idempotent.
    pub fn unregister(&self, id: ClientId) -> bool {
        match self.clients.write().remove(&id) {
            Some(handle) => {
                tracing::debug!("Unregistered {} ({})", id, handle.peer());
                true
            }
            None => false,
        }
    }

    /// Deliver a message to one client.
    ///
    /// Returns `false` if the client is unknown or its send failed; a failed
    /// client is unregistered.
    pub fn send_to(&self, id: ClientId, message: ServerMessage) -> bool {
        let result = {
            let clients = self.clients.read();
            match clients.get(&id) {
                Some(handle) => handle.send(message),
                None => return false,
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Dropping {} after failed send: {}", id, e);
                self.unregister(id);
                false
            }
        }
    }

    /// Deliver a message to every registered client.
    ///
    /// Sends are independent: a failing client is evicted and logged, the
    /// rest still receive the message. Returns the number of deliveries.
    pub fn broadcast(&self, message: &ServerMessage) -> usize {
        let mut failed = Vec::new();
        let mut delivered = 0;

        {
            let clients = self.clients.read();
            for (id, handle) in clients.iter() {
                match handle.send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!("Broadcast to {} failed: {}", id, e);
                        failed.push(*id);
                    }
                }
            }
        }

        for id in failed {
            self.unregister(id);
        }

        delivered
    }

    /// Remove every client, closing all queues. Returns how many were removed.
    pub fn close_all(&self) -> usize {
        let drained: Vec<ClientHandle> = self.clients.write().drain().map(|(_, h)| h).collect();
        drained.len()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    /// Ids of all registered clients, sorted
    pub fn ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self.clients.read().keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
