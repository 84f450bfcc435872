//! Shared test helpers
//!
//! - `MockStream`: scripted in-memory duplex stream
//! - `spawn_server`: one-connection fake RESP server on a TCP port
//! - `spawn_multi_server`: the same, accepting several connections in turn
//! - `spawn_unix_server`: the same over a unix socket

#![allow(dead_code)]

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

// =============================================================================
// In-Memory Stream
// =============================================================================

/// Duplex stream that serves `input` in chunks of at most `chunk` bytes
/// and captures everything written
pub struct MockStream {
    input: Vec<u8>,
    pos: usize,
    chunk: usize,
    pub written: Vec<u8>,
    pub fail_writes: bool,
    pub reads: usize,
}

impl MockStream {
    pub fn new(input: &[u8]) -> Self {
        Self::chunked(input, usize::MAX)
    }

    pub fn chunked(input: &[u8], chunk: usize) -> Self {
        Self {
            input: input.to_vec(),
            pos: 0,
            chunk,
            written: Vec::new(),
            fail_writes: false,
            reads: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        let n = buf.len().min(self.chunk).min(self.remaining());
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Fake Server
// =============================================================================

/// Reply produced by a server handler for the n-th command
pub type Handler = Box<dyn FnMut(usize, Vec<Vec<u8>>) -> Option<Vec<u8>> + Send>;

/// Serve `expected` commands on one accepted connection, then close it.
/// A handler returning `None` closes the connection early.
pub fn spawn_server<F>(expected: usize, handler: F) -> u16
where
    F: FnMut(usize, Vec<Vec<u8>>) -> Option<Vec<u8>> + Send + 'static,
{
    spawn_multi_server(1, expected, handler)
}

/// Accept `connections` connections one after another, serving up to
/// `expected` commands on each. The handler index restarts per connection.
pub fn spawn_multi_server<F>(connections: usize, expected: usize, handler: F) -> u16
where
    F: FnMut(usize, Vec<Vec<u8>>) -> Option<Vec<u8>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();

    thread::spawn(move || {
        let mut handler: Handler = Box::new(handler);
        for _ in 0..connections {
            let (stream, _) = match listener.accept() {
                Ok(accepted) => accepted,
                Err(_) => return,
            };
            let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
            let reader = BufReader::new(stream.try_clone().expect("clone"));
            serve(reader, stream, expected, &mut handler);
        }
    });

    port
}

/// A port nothing listens on
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr").port()
}

#[cfg(unix)]
pub fn spawn_unix_server<F>(path: &std::path::Path, expected: usize, handler: F)
where
    F: FnMut(usize, Vec<Vec<u8>>) -> Option<Vec<u8>> + Send + 'static,
{
    use std::os::unix::net::UnixListener;

    let listener = UnixListener::bind(path).expect("bind unix");
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut handler: Handler = Box::new(handler);
        serve(reader, stream, expected, &mut handler);
    });
}

/// Server that answers every command with its own arguments as a bulk array
pub fn spawn_echo_server(expected: usize) -> u16 {
    spawn_server(expected, |_, args| Some(encode_bulk_array(&args)))
}

fn serve<R: BufRead, W: Write>(mut reader: R, mut writer: W, expected: usize, handler: &mut Handler) {
    for idx in 0..expected {
        let args = match read_command(&mut reader) {
            Ok(args) => args,
            Err(_) => return,
        };
        match handler(idx, args) {
            Some(bytes) => {
                if writer.write_all(&bytes).is_err() || writer.flush().is_err() {
                    return;
                }
            }
            None => return,
        }
    }
}

/// Parse one multibulk command the way a server would
pub fn read_command<R: BufRead>(reader: &mut R) -> io::Result<Vec<Vec<u8>>> {
    let line = read_line(reader)?;
    if line.first() != Some(&b'*') {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "expected array"));
    }
    let count = parse_usize(&line[1..])?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        let line = read_line(reader)?;
        if line.first() != Some(&b'$') {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "expected bulk"));
        }
        let len = parse_usize(&line[1..])?;
        let mut data = vec![0u8; len + 2];
        reader.read_exact(&mut data)?;
        if &data[len..] != b"\r\n" {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "missing crlf"));
        }
        data.truncate(len);
        args.push(data);
    }
    Ok(args)
}

fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let bytes = reader.read_until(b'\n', &mut buf)?;
    if bytes == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid line"));
    }
    buf.truncate(buf.len() - 2);
    Ok(buf)
}

fn parse_usize(data: &[u8]) -> io::Result<usize> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "bad number"))
}

// =============================================================================
// Reply Builders
// =============================================================================

pub fn encode_bulk(data: &[u8]) -> Vec<u8> {
    let mut out = format!("${}\r\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    out
}

pub fn encode_bulk_array(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", items.len()).into_bytes();
    for item in items {
        out.extend_from_slice(&encode_bulk(item));
    }
    out
}
