//! Protocol codec
//!
//! Request encoding for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Multibulk) Format
//! ```text
//! *<argc>\r\n
//! $<len(arg0)>\r\n<arg0>\r\n
//! $<len(arg1)>\r\n<arg1>\r\n
//! ...
//! ```
//!
//! Arguments are raw bytes: they may be empty, embed NUL or CRLF, and need
//! not be valid UTF-8. The length prefix is what delimits them.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use crate::error::{Result, UsageError};
use super::Command;

/// Encode an argument list as a multibulk request, appending to `out`
///
/// Fails with `UsageError::EmptyCommand` (leaving `out` untouched) when
/// `args` is empty.
pub fn encode_command<A: AsRef<[u8]>>(args: &[A], out: &mut BytesMut) -> Result<()> {
    if args.is_empty() {
        return Err(UsageError::EmptyCommand.into());
    }

    let payload: usize = args.iter().map(|arg| arg.as_ref().len()).sum();
    // Header line plus per-argument "$<len>\r\n...\r\n" framing
    out.reserve(16 + payload + args.len() * 16);

    out.put_u8(b'*');
    put_decimal(out, args.len());
    out.put_slice(b"\r\n");

    for arg in args {
        let arg = arg.as_ref();
        out.put_u8(b'$');
        put_decimal(out, arg.len());
        out.put_slice(b"\r\n");
        out.put_slice(arg);
        out.put_slice(b"\r\n");
    }

    Ok(())
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let mut buf = BytesMut::new();
    command.encode(&mut buf)?;
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

fn put_decimal(out: &mut BytesMut, mut value: usize) {
    // Digits are produced in reverse into a stack buffer
    let mut digits = [0u8; 20];
    let mut len = 0;
    loop {
        digits[len] = b'0' + (value % 10) as u8;
        value /= 10;
        len += 1;
        if value == 0 {
            break;
        }
    }
    digits[..len].reverse();
    out.put_slice(&digits[..len]);
}
