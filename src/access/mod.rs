//! Access Module
//!
//! Cross-client read approval.
//!
//! ## State Machine (per key)
//! ```text
//!            GET from non-owner
//!   ┌──────┐ ──────────────────────▶ ┌─────────────────────────┐
//!   │ Idle │                          │ AwaitingOwnerDecision   │
//!   └──────┘ ◀────────────────────── │ (exactly one requester) │
//!            REQUEST approve/deny     └─────────────────────────┘
//! ```
//! A second GET while awaiting replaces the recorded requester; the first
//! requester never hears back. Pending requests have no timeout and survive
//! the disconnect of either party. They are dropped with their record when
//! the owner removes the key.

mod coordinator;
mod slot;

pub use coordinator::{AccessCoordinator, Resolution};
pub use slot::PendingSlot;

use crate::clients::ClientId;

/// The single outstanding read request on a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub requester: ClientId,
}

/// Observable state of a key's approval flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Idle,
    AwaitingOwnerDecision { requester: ClientId },
}
