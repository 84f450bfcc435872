//! # resplink
//!
//! A blocking client-side bridge for RESP key-value servers:
//! - Multibulk command encoding for binary-safe arguments
//! - Incremental reply decoding into nested values under a memory bound
//! - Pipelining with strict FIFO reply ordering
//! - Clear split between transport faults and server error replies
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                                │
//! │        (connect / reconnect / call / enqueue / drain)        │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!        ┌──────────────┐               ┌──────────────┐
//!        │  Verb Table  │               │   Pipeline   │
//!        │ (name→verb)  │               │ (FIFO count) │
//!        └──────────────┘               └──────┬───────┘
//!                                              │
//!                        ┌─────────────────────┼─────────────────────┐
//!                        ▼                     ▼                     ▼
//!                 ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!                 │   Encoder   │       │  Transport  │       │   Decoder   │
//!                 │ (multibulk) │       │ (TCP/unix)  │       │ (task stack)│
//!                 └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use resplink::{Client, Command, Reply};
//!
//! let mut client = Client::new();
//! client.connect("127.0.0.1", 6379)?;
//!
//! client.enqueue(&Command::new("SET").arg("counter").arg(1))?;
//! client.enqueue(&Command::new("INCR").arg("counter"))?;
//! assert!(matches!(client.drain_one()?, Reply::SimpleString(_)));
//! assert_eq!(client.drain_one()?, Reply::Integer(2));
//! # Ok::<(), resplink::LinkError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod verbs;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorCategory, ErrorCode, LinkError, Result, UsageError};
pub use config::Config;
pub use protocol::{Command, ErrorReply, Reply, ToArg};
pub use verbs::{VerbResolver, VerbTable};
pub use client::{Client, SessionState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of resplink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
