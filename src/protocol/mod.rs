//! Protocol Module
//!
//! Defines the RESP wire protocol spoken with the server.
//!
//! ## Request Format (Multibulk)
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<arg bytes>\r\n      (repeated argc times)
//! ```
//!
//! ## Reply Format
//! ```text
//! ┌────────┬──────────────────────────────┬──────────────────┐
//! │ Sigil  │ Line                         │ Reply            │
//! ├────────┼──────────────────────────────┼──────────────────┤
//! │   +    │ +OK\r\n                      │ SimpleString     │
//! │   -    │ -ERR message\r\n             │ Error            │
//! │   :    │ :1000\r\n                    │ Integer          │
//! │   $    │ $5\r\nhello\r\n  / $-1\r\n   │ BulkString / Nil │
//! │   *    │ *2\r\n<elem><elem> / *-1\r\n │ Array / Nil      │
//! └────────┴──────────────────────────────┴──────────────────┘
//! ```
//!
//! Replies carry no correlation ids: they come back in request order.

mod command;
mod reply;
mod codec;
mod decoder;

pub use command::{Command, ToArg};
pub use reply::{ErrorReply, Reply};
pub use codec::{encode_command, write_command};
pub use decoder::{ReplyDecoder, MAX_NESTING_DEPTH};
