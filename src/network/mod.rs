//! Network Module
//!
//! Transport and request/reply plumbing for a single connection.
//!
//! ## Architecture
//! - `Transport`: one blocking TCP or unix socket stream
//! - `Pipeline`: FIFO enqueue/drain on top of any `Read + Write` stream
//! - No internal locking; callers serialize access

mod transport;
mod pipeline;

pub use transport::{Endpoint, Transport};
pub use pipeline::Pipeline;
