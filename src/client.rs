//! Client Facade
//!
//! Connection lifecycle plus the call / enqueue / drain API.
//!
//! ## Session States
//! ```text
//!                 connect / connect_path / reconnect
//!  Disconnected ──────────────────────────────────────► Connected
//!       ▲   ▲        (dial + keepalive + timeout;          │
//!       │   │         any failure → Disconnected)          │ connection or
//!       │   │                                              │ protocol error
//!       │   └──────────── close() ──────────── Faulted ◄───┘
//!       │                                         │
//!       └───────────── close() ───────────────────┘ reconnect() → Connected
//! ```
//!
//! - Command operations need `Connected`. `Disconnected` fails with
//!   `UsageError::NotConnected`, `Faulted` re-returns the recorded fault;
//!   neither touches the transport.
//! - A fault drops the transport, read buffer and decode stack at once.
//!   Nothing is retried; reconnecting is up to the caller.
//! - Error replies from the server are ordinary `Reply::Error` data unless
//!   `throw_on_error_reply` is set, in which case a top-level one is
//!   returned as `Err(LinkError::Reply)` and the session stays usable.

#[cfg(unix)]
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::error::{LinkError, Result, UsageError};
use crate::network::{Endpoint, Pipeline, Transport};
use crate::protocol::{Command, Reply, ToArg};
use crate::verbs::{VerbResolver, VerbTable};

/// Connection state of a [`Client`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Faulted,
}

/// Blocking client for one server connection
///
/// Not internally synchronized: share it across threads only behind a lock.
#[derive(Debug, Default)]
pub struct Client {
    /// Tunables, applied on every (re)connect
    config: Config,

    /// Last endpoint dialed, kept for `reconnect`
    endpoint: Option<Endpoint>,

    /// Live connection (`Some` iff Connected)
    session: Option<Pipeline<Transport>>,

    /// Fatal error that ended the last session (`Some` iff Faulted)
    fault: Option<LinkError>,

    /// Most recent error returned by any operation
    last_error: Option<LinkError>,
}

impl Client {
    /// Create a disconnected client with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a disconnected client with a custom configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Connected
        } else if self.fault.is_some() {
            SessionState::Faulted
        } else {
            SessionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Replies enqueued but not yet drained
    pub fn pending(&self) -> usize {
        self.session.as_ref().map_or(0, Pipeline::outstanding)
    }

    /// Most recent error, if any operation failed since the last connect
    pub fn last_error(&self) -> Option<&LinkError> {
        self.last_error.as_ref()
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Connect over TCP, using the configured connect timeout
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let endpoint = Endpoint::Tcp {
            host: host.to_string(),
            port,
            connect_timeout: self.config.connect_timeout,
        };
        self.open(endpoint)
    }

    /// Connect over TCP with an explicit connect timeout
    pub fn connect_with_timeout(&mut self, host: &str, port: u16, timeout: Duration) -> Result<()> {
        let endpoint = Endpoint::Tcp {
            host: host.to_string(),
            port,
            connect_timeout: Some(timeout),
        };
        self.open(endpoint)
    }

    /// Connect to a unix domain socket
    #[cfg(unix)]
    pub fn connect_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let endpoint = Endpoint::Unix {
            path: path.as_ref().to_path_buf(),
        };
        self.open(endpoint)
    }

    /// Tear down any existing connection and dial the last endpoint again
    pub fn reconnect(&mut self) -> Result<()> {
        match self.endpoint.clone() {
            Some(endpoint) => self.open(endpoint),
            None => self.fail(UsageError::NoEndpoint.into()),
        }
    }

    /// Drop the connection (if any) and return to `Disconnected`
    pub fn close(&mut self) {
        self.teardown();
        self.fault = None;
    }

    fn open(&mut self, endpoint: Endpoint) -> Result<()> {
        self.teardown();
        self.fault = None;
        self.endpoint = Some(endpoint.clone());

        let transport = match Transport::dial(&endpoint) {
            Ok(transport) => transport,
            Err(e) => {
                tracing::warn!("Failed to connect to {}: {}", endpoint, e);
                return self.fail(e);
            }
        };

        // All-or-nothing: a failed post-connect step discards the socket
        if let Err(e) = self.prepare(&transport) {
            tracing::warn!("Post-connect setup for {} failed: {}", endpoint, e);
            drop(transport);
            return self.fail(e);
        }

        self.session = Some(Pipeline::new(transport, self.config.max_reply_size));
        self.last_error = None;
        tracing::debug!("Connected to {}", endpoint);
        Ok(())
    }

    /// Apply keepalive and timeout to a freshly dialed transport
    fn prepare(&self, transport: &Transport) -> Result<()> {
        if let Some(secs) = self.config.keep_alive_secs {
            transport
                .set_keepalive(secs)
                .map_err(|e| LinkError::Config(format!("failed to set keepalive: {}", e)))?;
        }
        if self.config.timeout_us.is_some() {
            transport
                .set_timeout(self.config.socket_timeout())
                .map_err(|e| LinkError::Config(format!("failed to set timeout: {}", e)))?;
        }
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            if session.outstanding() > 0 {
                tracing::debug!(
                    "Closing connection to {} with {} replies undrained",
                    self.endpoint_name(),
                    session.outstanding()
                );
            } else {
                tracing::debug!("Closing connection to {}", self.endpoint_name());
            }
        }
    }

    // =========================================================================
    // Tunables
    // =========================================================================

    /// Set the read/write timeout in microseconds (0 = block forever)
    ///
    /// Stored for future connections and applied to the live one, if any.
    pub fn set_timeout(&mut self, timeout_us: u64) -> Result<()> {
        self.config.timeout_us = Some(timeout_us);
        let timeout = self.config.socket_timeout();
        let applied = self
            .session
            .as_ref()
            .map(|session| session.get_ref().set_timeout(timeout));
        if let Some(Err(e)) = applied {
            return self.fail(LinkError::Config(format!("failed to set timeout: {}", e)));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<u64> {
        self.config.timeout_us
    }

    /// Set the keepalive interval in seconds (0 disables keepalive)
    pub fn set_keep_alive(&mut self, interval_secs: u32) -> Result<()> {
        self.config.keep_alive_secs = Some(interval_secs);
        let applied = self
            .session
            .as_ref()
            .map(|session| session.get_ref().set_keepalive(interval_secs));
        if let Some(Err(e)) = applied {
            return self.fail(LinkError::Config(format!("failed to set keepalive: {}", e)));
        }
        Ok(())
    }

    pub fn keep_alive(&self) -> Option<u32> {
        self.config.keep_alive_secs
    }

    /// Bound buffered reply bytes (0 = unbounded)
    pub fn set_max_reply_size(&mut self, bytes: usize) {
        self.config.max_reply_size = bytes;
        if let Some(session) = self.session.as_mut() {
            session.set_max_reply_size(bytes);
        }
    }

    pub fn max_reply_size(&self) -> usize {
        self.config.max_reply_size
    }

    pub fn set_throw_on_error_reply(&mut self, enabled: bool) {
        self.config.throw_on_error_reply = enabled;
    }

    pub fn throw_on_error_reply(&self) -> bool {
        self.config.throw_on_error_reply
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Send a command and wait for one reply
    ///
    /// With commands already enqueued, the reply returned is the oldest
    /// pending one.
    pub fn call(&mut self, command: &Command) -> Result<Reply> {
        self.enqueue(command)?;
        self.drain_one()
    }

    /// Send a command without waiting for its reply
    pub fn enqueue(&mut self, command: &Command) -> Result<()> {
        let result = match self.session.as_mut() {
            Some(session) => session.enqueue(command),
            None => Err(self.unavailable()),
        };
        self.settle(result)
    }

    /// Wait for the oldest outstanding reply
    pub fn drain_one(&mut self) -> Result<Reply> {
        let result = match self.session.as_mut() {
            Some(session) => session.drain_one(),
            None => Err(self.unavailable()),
        };
        let reply = self.settle(result)?;

        match reply {
            Reply::Error(err) if self.config.throw_on_error_reply => {
                self.settle(Err(LinkError::Reply(err)))
            }
            reply => Ok(reply),
        }
    }

    /// Call a command by method name through the built-in verb table
    ///
    /// `client.invoke("hget", ["key", "field"])` sends `HGET key field`.
    pub fn invoke<I, A>(&mut self, name: &str, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = A>,
        A: ToArg,
    {
        self.invoke_with(&VerbTable, name, args)
    }

    /// Call a command by method name through a custom resolver
    pub fn invoke_with<R, I, A>(&mut self, resolver: &R, name: &str, args: I) -> Result<Reply>
    where
        R: VerbResolver + ?Sized,
        I: IntoIterator<Item = A>,
        A: ToArg,
    {
        let Some(verb) = resolver.resolve(name) else {
            return self.fail(UsageError::UnknownVerb(name.to_string()).into());
        };

        let mut command = Command::new(verb);
        command.extend(args);
        self.call(&command)
    }

    // =========================================================================
    // Error Bookkeeping
    // =========================================================================

    fn unavailable(&self) -> LinkError {
        match &self.fault {
            Some(fault) => fault.clone(),
            None => UsageError::NotConnected.into(),
        }
    }

    /// Record a failed operation; fatal errors also end the session
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if err.is_fatal() && self.session.take().is_some() {
            tracing::warn!("Connection to {} faulted: {}", self.endpoint_name(), err);
            self.fault = Some(err.clone());
        }
        self.fail(err)
    }

    fn fail<T>(&mut self, err: LinkError) -> Result<T> {
        self.last_error = Some(err.clone());
        Err(err)
    }

    fn endpoint_name(&self) -> String {
        self.endpoint
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string())
    }
}
