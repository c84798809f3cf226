//! Access request coordinator
//!
//! Routes read requests to owners and verdicts back to requesters.

use std::sync::Arc;

use crate::clients::{ClientId, ClientRegistry};
use crate::protocol::{ServerMessage, Verdict};
use crate::store::Record;
use super::PendingRequest;

/// Outcome of applying a verdict to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The requester was sent the value or the denial
    Delivered { requester: ClientId, verdict: Verdict },

    /// The slot was consumed but the requester is no longer connected
    RequesterGone { requester: ClientId },

    /// Nothing was pending (or the key does not exist); verdict dropped
    NoPendingRequest,
}

/// Drives the per-key approval state machine.
///
/// Stateless apart from the registry it delivers through: the pending
/// request itself lives in each record's [`PendingSlot`](super::PendingSlot).
/// Callers must hold the store's read lock while passing a `&Record` in.
pub struct AccessCoordinator {
    clients: Arc<ClientRegistry>,
}

impl AccessCoordinator {
    pub fn new(clients: Arc<ClientRegistry>) -> Self {
        Self { clients }
    }

    /// Idle/Awaiting → Awaiting: record `requester` and invite the owner.
    ///
    /// Returns the request that was overwritten, if any.
    pub fn open(&self, key: &str, record: &Record, requester: ClientId) -> Option<PendingRequest> {
        let displaced = record.pending.replace(requester);
        if let Some(previous) = displaced {
            tracing::debug!(
                "Pending request on {:?} by {} replaced by {}",
                key,
                previous.requester,
                requester
            );
        }

        let invited = self.clients.send_to(
            record.owner,
            ServerMessage::AccessRequested {
                key: key.to_string(),
            },
        );
        if !invited {
            tracing::debug!(
                "Owner {} of {:?} is unreachable; request from {} stays pending",
                record.owner,
                key,
                requester
            );
        }

        displaced
    }

    /// Awaiting → Idle: deliver the verdict to the recorded requester.
    ///
    /// `record` is `None` when the key does not exist.
    pub fn resolve(&self, key: &str, record: Option<&Record>, verdict: Verdict) -> Resolution {
        let Some(record) = record else {
            tracing::trace!("Verdict for missing key {:?} dropped", key);
            return Resolution::NoPendingRequest;
        };
        let Some(PendingRequest { requester }) = record.pending.take() else {
            tracing::trace!("Verdict for {:?} with nothing pending dropped", key);
            return Resolution::NoPendingRequest;
        };

        let reply = match verdict {
            Verdict::Approve => ServerMessage::Approved {
                value: record.value.clone(),
            },
            Verdict::Deny => ServerMessage::Denied,
        };

        if self.clients.send_to(requester, reply) {
            tracing::debug!("Verdict {:?} on {:?} delivered to {}", verdict, key, requester);
            Resolution::Delivered { requester, verdict }
        } else {
            Resolution::RequesterGone { requester }
        }
    }
}
