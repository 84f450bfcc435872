//! Command definitions
//!
//! A command is an ordered list of binary-safe arguments, verb first.

use bytes::{Bytes, BytesMut};

use crate::error::Result;
use super::codec::encode_command;

/// Conversion of a value into one command argument
///
/// Booleans become `"1"` / `"0"`, numbers their decimal text.
pub trait ToArg {
    fn to_arg(&self) -> Bytes;
}

impl ToArg for str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for [u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl<const N: usize> ToArg for [u8; N] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl ToArg for bool {
    fn to_arg(&self) -> Bytes {
        Bytes::from_static(if *self { b"1" } else { b"0" })
    }
}

macro_rules! impl_to_arg_display {
    ($($ty:ty),*) => {
        $(
            impl ToArg for $ty {
                fn to_arg(&self) -> Bytes {
                    Bytes::from(self.to_string())
                }
            }
        )*
    };
}

impl_to_arg_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> Bytes {
        (**self).to_arg()
    }
}

/// A command ready to be encoded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    args: Vec<Bytes>,
}

impl Command {
    /// Start a command with its verb
    pub fn new(verb: impl ToArg) -> Self {
        Self {
            args: vec![verb.to_arg()],
        }
    }

    /// Append an argument (builder style)
    pub fn arg(mut self, arg: impl ToArg) -> Self {
        self.args.push(arg.to_arg());
        self
    }

    /// Append an argument in place
    pub fn push_arg(&mut self, arg: impl ToArg) {
        self.args.push(arg.to_arg());
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// The verb, if any argument has been given
    pub fn verb(&self) -> Option<&[u8]> {
        self.args.first().map(|verb| verb.as_ref())
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Encode into `out` as a multibulk request
    pub fn encode(&self, out: &mut BytesMut) -> Result<()> {
        encode_command(&self.args, out)
    }
}

impl<A: ToArg> FromIterator<A> for Command {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().map(|arg| arg.to_arg()).collect(),
        }
    }
}

impl<A: ToArg> Extend<A> for Command {
    fn extend<I: IntoIterator<Item = A>>(&mut self, iter: I) {
        self.args.extend(iter.into_iter().map(|arg| arg.to_arg()));
    }
}
