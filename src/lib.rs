//! # Keyward
//!
//! A multi-client, in-memory key registry where every key belongs to the
//! connection that created it:
//! - Only the owner may remove a key or read it directly
//! - Anyone else's read is forwarded to the owner for approval
//! - Additions and removals are broadcast to every connected client
//! - Line-based TCP protocol, one worker thread per client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │            (one worker + one writer per client)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ COMMAND:KEY[:VALUE]
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Engine (dispatcher)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌──────────────┐         ┌────────────────┐
//!   │  Ownership   │────────▶│ Access Request │
//!   │    Store     │         │  Coordinator   │
//!   │   (RwLock)   │         │ (slot / key)   │
//!   └──────┬───────┘         └───────┬────────┘
//!          │   broadcasts / replies  │
//!          ▼                         ▼
//!   ┌─────────────────────────────────────────┐
//!   │      Client Registry (queues)           │
//!   └─────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod clients;
pub mod access;
pub mod store;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KeywardError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Keyward
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
