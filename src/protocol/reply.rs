//! Reply definitions
//!
//! Values decoded from the server's reply stream.

use std::fmt;

use bytes::Bytes;

/// A fully decoded reply
///
/// Arrays are only ever handed out complete; the decoder never exposes a
/// partially filled container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `$-1` or `*-1`
    Nil,

    /// `:<n>`
    Integer(i64),

    /// `+<text>` status line (e.g. `OK`, `PONG`)
    SimpleString(Bytes),

    /// `$<len>` binary-safe payload; may be empty
    BulkString(Bytes),

    /// `*<len>` ordered elements, possibly nested or containing errors
    Array(Vec<Reply>),

    /// `-<message>` error reply, top-level or nested
    Error(ErrorReply),
}

impl Reply {
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Payload of a simple or bulk string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::SimpleString(data) | Reply::BulkString(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Reply>> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorReply> {
        match self {
            Reply::Error(err) => Some(err),
            _ => None,
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Integer(value) => write!(f, "(integer) {}", value),
            Reply::SimpleString(data) => write!(f, "{}", String::from_utf8_lossy(data)),
            Reply::BulkString(data) => write!(f, "{:?}", String::from_utf8_lossy(data)),
            Reply::Error(err) => write!(f, "(error) {}", err),
            Reply::Array(items) if items.is_empty() => write!(f, "(empty array)"),
            Reply::Array(items) => {
                // Numbered like redis-cli; nested items are indented under their parent
                let width = items.len().to_string().len();
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        writeln!(f)?;
                        write!(f, "{:indent$}", "", indent = indent)?;
                    }
                    write!(f, "{:>width$}) ", idx + 1, width = width)?;
                    item.fmt_indented(f, indent + width + 2)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Error reply sent by the server
///
/// By convention the first word is an upper-case code (`ERR`, `WRONGTYPE`,
/// ...) followed by a human readable detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReply {
    message: String,
}

impl ErrorReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The full message as sent, without the leading `-`
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Leading upper-case error code, if the message carries one
    pub fn code(&self) -> Option<&str> {
        let word = self.message.split(' ').next()?;
        let is_code = !word.is_empty()
            && word
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        is_code.then_some(word)
    }

    /// Message with the error code stripped
    pub fn detail(&self) -> &str {
        match self.code() {
            Some(code) => self.message[code.len()..].trim_start(),
            None => &self.message,
        }
    }
}

impl fmt::Display for ErrorReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
