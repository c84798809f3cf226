//! Clients Module
//!
//! The connection registry: every live client and its outbound queue.
//!
//! ## Responsibilities
//! - Hand out opaque, comparable client ids
//! - Register new clients with a snapshot of known keys
//! - Broadcast to everyone, evicting clients whose send fails
//! - Direct delivery to a single client
//!
//! ## Delivery Model
//! Each client owns a bounded `crossbeam` channel. The registry only ever
//! enqueues (`try_send`), so a slow or dead socket can never stall a
//! broadcast. A dedicated writer thread per connection drains the queue to
//! the socket; when it dies its receiver is dropped and the next send to that
//! client fails, which evicts it.

mod registry;

pub use registry::{ClientHandle, ClientRegistry};

use std::fmt;

/// Opaque identity of one connection.
///
/// Ownership is handle identity: two connections from the same peer are two
/// different owners. Ids are never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl ClientId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}
