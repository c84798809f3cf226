//! Store Module
//!
//! Key → (value, owner) mapping with owner-checked mutation.
//!
//! ## Locking
//! A single `RwLock` over the record map:
//! - ADD / REMOVE take the write lock, so all mutations across all keys are
//!   serialized (one winner on duplicate ADD, owner check and delete are
//!   atomic).
//! - GET / REQUEST take the read lock and then the record's pending-slot
//!   mutex, so concurrent reads on different keys never contend.
//!
//! Lock order is always store → client registry; the registry never calls
//! back into the store.

mod ownership;

pub use ownership::{OwnershipStore, ReadOutcome};

use crate::access::PendingSlot;
use crate::clients::ClientId;

/// The stored value, owner and approval slot for one key
#[derive(Debug)]
pub struct Record {
    pub value: String,
    pub owner: ClientId,
    pub pending: PendingSlot,
}

impl Record {
    pub fn new(value: impl Into<String>, owner: ClientId) -> Self {
        Self {
            value: value.into(),
            owner,
            pending: PendingSlot::new(),
        }
    }
}
