//! Ownership store implementation

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::access::{AccessCoordinator, AccessState, Resolution};
use crate::clients::{ClientId, ClientRegistry};
use crate::error::{KeywardError, Result};
use crate::protocol::{ServerMessage, Verdict};
use super::Record;

/// What a GET produced for the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Caller owns the key
    Value(String),

    /// Caller does not own the key; the owner has been asked
    Pending,
}

/// In-memory ownership-gated store
pub struct OwnershipStore {
    /// Records by key
    records: RwLock<HashMap<String, Record>>,

    /// Broadcast target for add/remove notices
    clients: Arc<ClientRegistry>,

    /// Approval flow for non-owner reads
    access: AccessCoordinator,
}

impl OwnershipStore {
    pub fn new(clients: Arc<ClientRegistry>) -> Self {
        let access = AccessCoordinator::new(Arc::clone(&clients));
        Self {
            records: RwLock::new(HashMap::new()),
            clients,
            access,
        }
    }

    /// Create `key` owned by `owner` and broadcast the addition
    pub fn add(&self, key: &str, value: &str, owner: ClientId) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(key) {
            return Err(KeywardError::KeyExists);
        }
        records.insert(key.to_string(), Record::new(value, owner));

        tracing::debug!("{} added {:?}", owner, key);
        // Broadcast under the write lock so notices keep mutation order
        self.clients.broadcast(&ServerMessage::Added {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Delete `key` if `owner` owns it and broadcast the removal
    pub fn remove(&self, key: &str, owner: ClientId) -> Result<()> {
        let mut records = self.records.write();
        match records.get(key) {
            Some(record) if record.owner == owner => {}
            _ => return Err(KeywardError::NotOwnerOrNotFound),
        }
        if let Some(record) = records.remove(key) {
            if let Some(pending) = record.pending.peek() {
                tracing::debug!(
                    "Pending request by {} on {:?} dropped with its record",
                    pending.requester,
                    key
                );
            }
        }

        tracing::debug!("{} removed {:?}", owner, key);
        self.clients.broadcast(&ServerMessage::Removed {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Read `key`: directly for the owner, through approval for anyone else
    pub fn get(&self, key: &str, requester: ClientId) -> Result<ReadOutcome> {
        let records = self.records.read();
        let record = records.get(key).ok_or(KeywardError::KeyNotFound)?;

        if record.owner == requester {
            return Ok(ReadOutcome::Value(record.value.clone()));
        }

        self.access.open(key, record, requester);
        Ok(ReadOutcome::Pending)
    }

    /// Apply a verdict to the pending request on `key`.
    ///
    /// The sender is not checked against the owner.
    pub fn resolve(&self, key: &str, verdict: Verdict) -> Resolution {
        let records = self.records.read();
        self.access.resolve(key, records.get(key), verdict)
    }

    /// Run `f` with a snapshot of current keys while no ADD/REMOVE can run
    pub fn with_keys<R>(&self, f: impl FnOnce(Vec<String>) -> R) -> R {
        let records = self.records.read();
        let mut keys: Vec<String> = records.keys().cloned().collect();
        keys.sort();
        f(keys)
    }

    /// Current keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.with_keys(|keys| keys)
    }

    pub fn owner_of(&self, key: &str) -> Option<ClientId> {
        self.records.read().get(key).map(|r| r.owner)
    }

    /// Approval state of `key`, `None` if the key does not exist
    pub fn access_state(&self, key: &str) -> Option<AccessState> {
        self.records.read().get(key).map(|r| r.pending.state())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
