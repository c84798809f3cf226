//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polled for shutdown)
//! - One worker thread per connection, plus a writer thread draining its queue
//! - Lines routed through Engine

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
