//! Configuration for Keyward
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{KeywardError, Result};

/// Main configuration for a Keyward server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,

    /// How long the accept loop sleeps when no connection is waiting
    pub accept_poll_interval_ms: u64,

    // -------------------------------------------------------------------------
    // Delivery Configuration
    // -------------------------------------------------------------------------
    /// Lines buffered per client before a send counts as failed
    pub outbound_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:12345".to_string(),
            max_connections: 1024,
            write_timeout_ms: 5000,
            accept_poll_interval_ms: 50,
            outbound_queue_capacity: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(KeywardError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.outbound_queue_capacity == 0 {
            return Err(KeywardError::Config(
                "outbound_queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.accept_poll_interval_ms == 0 {
            return Err(KeywardError::Config(
                "accept_poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    pub fn accept_poll_interval(&self) -> Duration {
        Duration::from_millis(self.accept_poll_interval_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the write timeout (in milliseconds, 0 disables it)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the accept loop poll interval (in milliseconds)
    pub fn accept_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.accept_poll_interval_ms = ms;
        self
    }

    /// Set the per-client outbound queue capacity (in lines)
    pub fn outbound_queue_capacity(mut self, lines: usize) -> Self {
        self.config.outbound_queue_capacity = lines;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
