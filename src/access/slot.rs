//! Pending request slot
//!
//! One mutex-guarded cell per record. Setting (on GET) and consuming
//! (on REQUEST) both go through the same lock.

use parking_lot::Mutex;

use crate::clients::ClientId;
use super::{AccessState, PendingRequest};

#[derive(Debug, Default)]
pub struct PendingSlot {
    cell: Mutex<Option<PendingRequest>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a requester, returning the request it displaced
    pub fn replace(&self, requester: ClientId) -> Option<PendingRequest> {
        self.cell.lock().replace(PendingRequest { requester })
    }

    /// Consume the pending request, leaving the slot idle
    pub fn take(&self) -> Option<PendingRequest> {
        self.cell.lock().take()
    }

    pub fn peek(&self) -> Option<PendingRequest> {
        *self.cell.lock()
    }

    pub fn state(&self) -> AccessState {
        match self.peek() {
            Some(PendingRequest { requester }) => AccessState::AwaitingOwnerDecision { requester },
            None => AccessState::Idle,
        }
    }
}
