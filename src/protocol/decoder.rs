//! Reply decoder
//!
//! Incremental, restartable decoding of the reply stream.
//!
//! ## Reply Grammar
//! ```text
//! +<text>\r\n            simple string
//! -<message>\r\n         error
//! :<i64>\r\n             integer
//! $<len>\r\n<bytes>\r\n  bulk string      ($-1 = nil)
//! *<len>\r\n<elem>...    array of len     (*-1 = nil)
//! ```
//!
//! ## Decode Stack
//! Instead of recursing, the decoder keeps an explicit stack of decode
//! tasks. Each task records its parent's position on the stack and its own
//! index inside that parent. An array task with `len > 0` pushes its first
//! child; whenever a child completes it is stored at its index, the
//! parent's `remaining` counter drops, and the next child is pushed. When
//! `remaining` reaches zero the array itself completes and is nested into
//! its own parent, collapsing the stack as far as it goes.
//!
//! ```text
//!  *2\r\n *1\r\n :1\r\n $-1\r\n
//!
//!  [root *2 rem=2] [*1 rem=1 idx=0] [:1 idx=0]   -> :1 done, *1 done
//!  [root *2 rem=1] [$-1 idx=1]                   -> nil done, root done
//!  []                                            -> Array[Array[1], Nil]
//! ```
//!
//! Because all state lives in the decoder, bytes can arrive in chunks of
//! any size: `decode` returns `Ok(None)` until a top-level reply is
//! complete and resumes exactly where it stopped on the next call. The
//! stack is empty before and after every top-level reply.
//!
//! ## Memory Bound
//! Buffered-but-unconsumed bytes never exceed `max_buffered` (when it is
//! non-zero). A bulk header that could not fit is rejected before any of
//! its payload is read, and array headers reserve nothing for their
//! declared children.

use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::error::{ErrorCode, LinkError, Result};
use super::{ErrorReply, Reply};

/// Deepest array nesting accepted before the stream is considered hostile
pub const MAX_NESTING_DEPTH: usize = 512;

/// Bytes pulled from a reader per `read` call
const READ_CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug)]
enum TaskKind {
    /// Header line not read yet
    Pending,

    /// Header read; waiting for `len` payload bytes plus CRLF
    Bulk { len: usize },

    /// Container with `len` declared children, `remaining` still open
    Array {
        len: usize,
        remaining: usize,
        items: Vec<Reply>,
    },
}

/// One in-progress value
#[derive(Debug)]
struct DecodeTask {
    kind: TaskKind,
    /// Stack position of the enclosing array (`None` for the root)
    parent: Option<usize>,
    /// Position within the parent array
    index: usize,
}

impl DecodeTask {
    fn root() -> Self {
        Self {
            kind: TaskKind::Pending,
            parent: None,
            index: 0,
        }
    }

    fn child(parent: usize, index: usize) -> Self {
        Self {
            kind: TaskKind::Pending,
            parent: Some(parent),
            index,
        }
    }
}

enum Phase {
    Header,
    Payload(usize),
}

enum Step {
    Incomplete,
    Continue,
    Value(Reply),
}

/// Incremental reply decoder
#[derive(Debug)]
pub struct ReplyDecoder {
    /// Bytes received but not yet consumed
    buffer: BytesMut,

    /// Decode tasks; empty between top-level replies
    stack: Vec<DecodeTask>,

    /// Bound on `buffer.len()` (0 = unbounded)
    max_buffered: usize,

    /// Prefix of `buffer` already searched for CRLF
    scanned: usize,
}

impl ReplyDecoder {
    /// Create a decoder bounded to `max_buffered` bytes (0 = unbounded)
    pub fn new(max_buffered: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            stack: Vec::new(),
            max_buffered,
            scanned: 0,
        }
    }

    pub fn max_buffered(&self) -> usize {
        self.max_buffered
    }

    pub fn set_max_buffered(&mut self, max_buffered: usize) {
        self.max_buffered = max_buffered;
    }

    /// Bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of open decode tasks
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True when no reply is partially decoded and nothing is buffered
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty() && self.buffer.is_empty()
    }

    /// How many more bytes may be fed before hitting the bound
    pub fn capacity_left(&self) -> usize {
        if self.max_buffered == 0 {
            usize::MAX
        } else {
            self.max_buffered.saturating_sub(self.buffer.len())
        }
    }

    /// Drop all buffered bytes and in-progress tasks
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.stack.clear();
        self.scanned = 0;
    }

    /// Append received bytes
    ///
    /// Fails (and resets the decoder) if the bytes would push the buffer
    /// over `max_buffered`.
    pub fn feed(&mut self, data: &[u8]) -> Result<()> {
        if self.max_buffered > 0 && self.buffer.len() + data.len() > self.max_buffered {
            let err = LinkError::limit(format!(
                "buffered reply data would reach {} bytes (max {})",
                self.buffer.len() + data.len(),
                self.max_buffered
            ));
            self.reset();
            return Err(err);
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Try to decode one top-level reply from the buffered bytes
    ///
    /// Returns `Ok(None)` when more data is needed. Any error leaves the
    /// decoder reset.
    pub fn decode(&mut self) -> Result<Option<Reply>> {
        let result = self.advance();
        if result.is_err() {
            self.reset();
        }
        result
    }

    /// Read from `reader` until one top-level reply is complete
    ///
    /// Never reads more than the remaining buffer budget. Bytes belonging
    /// to later replies stay buffered for the next call.
    pub fn read_reply<R: Read>(&mut self, reader: &mut R) -> Result<Reply> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(reply) = self.decode()? {
                return Ok(reply);
            }

            let room = self.capacity_left().min(chunk.len());
            if room == 0 {
                self.reset();
                return Err(LinkError::limit(format!(
                    "reply exceeds max reply size of {} bytes",
                    self.max_buffered
                )));
            }

            let n = match reader.read(&mut chunk[..room]) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.reset();
                    return Err(e.into());
                }
            };

            if n == 0 {
                let err = if self.is_idle() {
                    LinkError::Connection {
                        code: ErrorCode::Eof,
                        message: "connection closed by peer".to_string(),
                    }
                } else {
                    LinkError::Protocol {
                        code: ErrorCode::Eof,
                        message: "connection closed in the middle of a reply".to_string(),
                    }
                };
                self.reset();
                return Err(err);
            }

            self.feed(&chunk[..n])?;
        }
    }

    // =========================================================================
    // State Machine
    // =========================================================================

    fn advance(&mut self) -> Result<Option<Reply>> {
        if self.stack.is_empty() {
            if self.buffer.is_empty() {
                return Ok(None);
            }
            self.stack.push(DecodeTask::root());
        }

        loop {
            let top = self.stack.len() - 1;
            let phase = match &self.stack[top].kind {
                TaskKind::Pending => Phase::Header,
                TaskKind::Bulk { len } => Phase::Payload(*len),
                TaskKind::Array { .. } => {
                    unreachable!("an open array always has a pending child above it")
                }
            };

            let value = match phase {
                Phase::Header => match self.read_header(top)? {
                    Step::Incomplete => return Ok(None),
                    Step::Continue => continue,
                    Step::Value(value) => value,
                },
                Phase::Payload(len) => match self.read_bulk(len)? {
                    Some(value) => value,
                    None => return Ok(None),
                },
            };

            if let Some(reply) = self.complete(value) {
                return Ok(Some(reply));
            }
        }
    }

    /// Read the header line of the task at `top`
    fn read_header(&mut self, top: usize) -> Result<Step> {
        let Some(line_end) = self.find_crlf() else {
            return Ok(Step::Incomplete);
        };

        let line = self.buffer.split_to(line_end).freeze();
        self.buffer.advance(2);
        self.scanned = 0;

        let Some((&sigil, body)) = line.split_first() else {
            return Err(LinkError::protocol("empty reply line"));
        };

        match sigil {
            b'+' => Ok(Step::Value(Reply::SimpleString(line.slice(1..)))),
            b'-' => Ok(Step::Value(Reply::Error(ErrorReply::new(
                String::from_utf8_lossy(body).into_owned(),
            )))),
            b':' => Ok(Step::Value(Reply::Integer(parse_integer(body)?))),
            b'$' => match parse_length(body)? {
                None => Ok(Step::Value(Reply::Nil)),
                Some(len) => {
                    if self.max_buffered > 0 && len.saturating_add(2) > self.max_buffered {
                        return Err(LinkError::limit(format!(
                            "bulk string of {} bytes exceeds max reply size {}",
                            len, self.max_buffered
                        )));
                    }
                    self.stack[top].kind = TaskKind::Bulk { len };
                    Ok(Step::Continue)
                }
            },
            b'*' => match parse_length(body)? {
                None => Ok(Step::Value(Reply::Nil)),
                Some(0) => Ok(Step::Value(Reply::Array(Vec::new()))),
                Some(len) => {
                    if self.stack.len() >= MAX_NESTING_DEPTH {
                        return Err(LinkError::limit(format!(
                            "reply nested deeper than {} levels",
                            MAX_NESTING_DEPTH
                        )));
                    }
                    // Declared lengths are untrusted: items grow only as children complete
                    self.stack[top].kind = TaskKind::Array {
                        len,
                        remaining: len,
                        items: Vec::new(),
                    };
                    self.stack.push(DecodeTask::child(top, 0));
                    Ok(Step::Continue)
                }
            },
            other => Err(LinkError::protocol(format!(
                "unexpected reply type byte 0x{:02x}",
                other
            ))),
        }
    }

    /// Take a bulk payload of `len` bytes once it is fully buffered
    fn read_bulk(&mut self, len: usize) -> Result<Option<Reply>> {
        if self.buffer.len() < len + 2 {
            return Ok(None);
        }
        if &self.buffer[len..len + 2] != b"\r\n" {
            return Err(LinkError::protocol("bulk string not terminated by CRLF"));
        }

        let data = self.buffer.split_to(len).freeze();
        self.buffer.advance(2);
        self.scanned = 0;
        Ok(Some(Reply::BulkString(data)))
    }

    /// Pop the finished top task and nest its value into its parent
    ///
    /// Returns the top-level reply once the root completes.
    fn complete(&mut self, mut value: Reply) -> Option<Reply> {
        while let Some(task) = self.stack.pop() {
            let Some(parent) = task.parent else {
                return Some(value);
            };

            let TaskKind::Array {
                len,
                remaining,
                items,
            } = &mut self.stack[parent].kind
            else {
                unreachable!("a decode task's parent is always an array");
            };

            debug_assert_eq!(items.len(), task.index);
            items.push(value);
            *remaining -= 1;

            if *remaining > 0 {
                let next = *len - *remaining;
                self.stack.push(DecodeTask::child(parent, next));
                return None;
            }

            value = Reply::Array(std::mem::take(items));
        }
        None
    }

    fn find_crlf(&mut self) -> Option<usize> {
        let start = self.scanned;
        match self.buffer[start..].windows(2).position(|w| w == b"\r\n") {
            Some(pos) => Some(start + pos),
            None => {
                // Keep the last byte: it may be the '\r' of a split CRLF
                self.scanned = self.buffer.len().saturating_sub(1);
                None
            }
        }
    }
}

impl Default for ReplyDecoder {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_REPLY_SIZE)
    }
}

fn parse_integer(data: &[u8]) -> Result<i64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            LinkError::protocol(format!(
                "invalid integer: {:?}",
                String::from_utf8_lossy(data)
            ))
        })
}

/// Parse a bulk/array length; `-1` means nil
fn parse_length(data: &[u8]) -> Result<Option<usize>> {
    match parse_integer(data)? {
        -1 => Ok(None),
        len if len < -1 => Err(LinkError::protocol(format!("invalid length {}", len))),
        len => usize::try_from(len)
            .map(Some)
            .map_err(|_| LinkError::limit(format!("length {} does not fit in memory", len))),
    }
}
