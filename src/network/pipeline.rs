//! Pipeline Coordinator
//!
//! Sends commands and collects their replies in submission order.
//!
//! The protocol carries no request ids, so the only way to pair a reply
//! with its command is position: the n-th reply drained belongs to the
//! n-th command enqueued. The coordinator never reorders or skips.
//!
//! ```text
//!  enqueue(A) enqueue(B) enqueue(C)      outstanding = 3
//!  drain_one() -> reply(A)               outstanding = 2
//!  drain_one() -> reply(B)               outstanding = 1
//!  drain_one() -> reply(C)               outstanding = 0
//!  drain_one() -> Err(NoPendingReply)    outstanding = 0
//! ```

use std::io::{Read, Write};

use bytes::BytesMut;

use crate::error::{Result, UsageError};
use crate::protocol::{Command, Reply, ReplyDecoder};

/// Request/reply coordinator over one duplex stream
#[derive(Debug)]
pub struct Pipeline<S> {
    /// Underlying byte stream
    stream: S,

    /// Reply decoder; owns the read buffer and decode stack
    decoder: ReplyDecoder,

    /// Reused encode buffer
    write_buf: BytesMut,

    /// Commands written whose replies have not been drained
    outstanding: usize,
}

impl<S: Read + Write> Pipeline<S> {
    /// Wrap a connected stream
    pub fn new(stream: S, max_reply_size: usize) -> Self {
        Self {
            stream,
            decoder: ReplyDecoder::new(max_reply_size),
            write_buf: BytesMut::with_capacity(256),
            outstanding: 0,
        }
    }

    /// Encode and write a command without waiting for its reply
    pub fn enqueue(&mut self, command: &Command) -> Result<()> {
        self.write_buf.clear();
        command.encode(&mut self.write_buf)?;

        self.stream.write_all(&self.write_buf)?;
        self.stream.flush()?;
        self.outstanding += 1;

        tracing::trace!(
            outstanding = self.outstanding,
            "Enqueued {} ({} args)",
            verb_name(command),
            command.len()
        );
        Ok(())
    }

    /// Block until the oldest outstanding reply has been decoded
    ///
    /// A fatal error leaves the stream position unknown, so every pending
    /// reply is written off and `outstanding` drops to 0. Later drains fail
    /// with `NoPendingReply` instead of reading from the middle of a reply.
    pub fn drain_one(&mut self) -> Result<Reply> {
        if self.outstanding == 0 {
            return Err(UsageError::NoPendingReply.into());
        }

        let reply = match self.decoder.read_reply(&mut self.stream) {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_fatal() {
                    tracing::debug!("Dropping {} pending replies after: {}", self.outstanding, e);
                    self.outstanding = 0;
                }
                return Err(e);
            }
        };
        self.outstanding -= 1;

        tracing::trace!(outstanding = self.outstanding, "Drained reply");
        Ok(reply)
    }

    /// `enqueue` followed by `drain_one`
    ///
    /// With earlier commands still outstanding this returns the oldest
    /// pending reply, not the reply to `command`.
    pub fn call(&mut self, command: &Command) -> Result<Reply> {
        self.enqueue(command)?;
        self.drain_one()
    }

    /// Drain every outstanding reply, in order
    pub fn drain_all(&mut self) -> Result<Vec<Reply>> {
        let mut replies = Vec::with_capacity(self.outstanding);
        while self.outstanding > 0 {
            replies.push(self.drain_one()?);
        }
        Ok(replies)
    }
}

impl<S> Pipeline<S> {
    /// Number of replies still to be drained
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn max_reply_size(&self) -> usize {
        self.decoder.max_buffered()
    }

    pub fn set_max_reply_size(&mut self, bytes: usize) {
        self.decoder.set_max_buffered(bytes);
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn verb_name(command: &Command) -> String {
    command
        .verb()
        .map(|verb| String::from_utf8_lossy(verb).into_owned())
        .unwrap_or_default()
}
