//! Error types for resplink
//!
//! Provides a unified error type for all operations, plus the classifier
//! that separates fatal transport/protocol faults from error replies sent
//! by the server.
//!
//! ## Categories
//! - **Connection**: write/read failure, timeout, closed socket. Fatal.
//! - **Protocol**: malformed stream, reply over the size bound, close in
//!   the middle of a reply. Fatal.
//! - **ApplicationReply**: a well-formed `-ERR ...` reply. Not fatal; the
//!   exchange itself succeeded.
//! - **Usage**: caller misuse (nothing pending, not connected, ...). Never
//!   touches the transport.
//! - **Config**: a tunable could not be applied to a live socket.

use std::fmt;
use std::io::ErrorKind;

use thiserror::Error;

use crate::protocol::ErrorReply;

/// Result type alias using LinkError
pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for resplink operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection error ({code}): {message}")]
    Connection { code: ErrorCode, message: String },

    // -------------------------------------------------------------------------
    // Wire Format Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error ({code}): {message}")]
    Protocol { code: ErrorCode, message: String },

    // -------------------------------------------------------------------------
    // Server Error Replies (escalated)
    // -------------------------------------------------------------------------
    #[error("Error reply: {0}")]
    Reply(ErrorReply),

    // -------------------------------------------------------------------------
    // Caller Misuse
    // -------------------------------------------------------------------------
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Numeric-style code attached to connection and protocol errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Generic I/O failure on the socket
    Io,
    /// Peer closed the connection
    Eof,
    /// Read or write timed out
    Timeout,
    /// Stream did not follow the RESP grammar
    Protocol,
    /// Reply exceeded the configured size or nesting bound
    Limit,
    /// Anything else (resolution failures, missing addresses)
    Other,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::Io => "io",
            ErrorCode::Eof => "eof",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Protocol => "protocol",
            ErrorCode::Limit => "limit",
            ErrorCode::Other => "other",
        };
        f.write_str(name)
    }
}

/// Caller misuse, reported before any I/O happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("command has no arguments")]
    EmptyCommand,

    #[error("no reply is pending")]
    NoPendingReply,

    #[error("not connected")]
    NotConnected,

    #[error("no endpoint to reconnect to")]
    NoEndpoint,

    #[error("unknown verb: {0}")]
    UnknownVerb(String),
}

/// Coarse classification of a [`LinkError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Connection,
    Protocol,
    ApplicationReply,
    Usage,
    Config,
}

impl LinkError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        LinkError::Protocol {
            code: ErrorCode::Protocol,
            message: message.into(),
        }
    }

    pub(crate) fn limit(message: impl Into<String>) -> Self {
        LinkError::Protocol {
            code: ErrorCode::Limit,
            message: message.into(),
        }
    }

    /// Which of the error categories this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinkError::Connection { .. } => ErrorCategory::Connection,
            LinkError::Protocol { .. } => ErrorCategory::Protocol,
            LinkError::Reply(_) => ErrorCategory::ApplicationReply,
            LinkError::Usage(_) => ErrorCategory::Usage,
            LinkError::Config(_) => ErrorCategory::Config,
        }
    }

    /// True when the session cannot be used again without reconnecting
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Connection | ErrorCategory::Protocol
        )
    }

    /// Code for connection/protocol errors, `None` otherwise
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            LinkError::Connection { code, .. } | LinkError::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The escalated error reply, if this is one
    pub fn as_reply(&self) -> Option<&ErrorReply> {
        match self {
            LinkError::Reply(reply) => Some(reply),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => ErrorCode::Timeout,
            ErrorKind::UnexpectedEof => ErrorCode::Eof,
            _ => ErrorCode::Io,
        };
        LinkError::Connection {
            code,
            message: err.to_string(),
        }
    }
}
