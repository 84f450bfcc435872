//! Configuration for resplink
//!
//! Centralized client tunables with sensible defaults.

use std::time::Duration;

/// Default upper bound on buffered reply bytes (16 MB)
pub const DEFAULT_MAX_REPLY_SIZE: usize = 16 * 1024 * 1024;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Timeout for establishing a TCP connection (None = OS default)
    pub connect_timeout: Option<Duration>,

    /// Socket read/write timeout in microseconds
    /// `None` leaves the socket untouched, `Some(0)` blocks forever.
    pub timeout_us: Option<u64>,

    /// TCP keepalive interval in seconds
    /// `None` leaves the socket untouched, `Some(0)` disables keepalive.
    pub keep_alive_secs: Option<u32>,

    // -------------------------------------------------------------------------
    // Decoder Configuration
    // -------------------------------------------------------------------------
    /// Max bytes buffered for a reply that is still being decoded (0 = unbounded)
    pub max_reply_size: usize,

    // -------------------------------------------------------------------------
    // Reply Handling
    // -------------------------------------------------------------------------
    /// Return top-level error replies as `Err(LinkError::Reply)` instead of data
    pub throw_on_error_reply: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            timeout_us: None,
            keep_alive_secs: None,
            max_reply_size: DEFAULT_MAX_REPLY_SIZE,
            throw_on_error_reply: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Socket timeout as a `Duration`, `None` meaning "block forever"
    pub(crate) fn socket_timeout(&self) -> Option<Duration> {
        match self.timeout_us {
            Some(0) | None => None,
            Some(us) => Some(Duration::from_micros(us)),
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the read/write timeout (in microseconds)
    pub fn timeout_us(mut self, us: u64) -> Self {
        self.config.timeout_us = Some(us);
        self
    }

    /// Set the keepalive interval (in seconds)
    pub fn keep_alive_secs(mut self, secs: u32) -> Self {
        self.config.keep_alive_secs = Some(secs);
        self
    }

    /// Set the maximum buffered reply size (in bytes)
    pub fn max_reply_size(mut self, bytes: usize) -> Self {
        self.config.max_reply_size = bytes;
        self
    }

    /// Escalate top-level error replies to `Err`
    pub fn throw_on_error_reply(mut self, enabled: bool) -> Self {
        self.config.throw_on_error_reply = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
