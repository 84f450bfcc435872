//! Transport
//!
//! Blocking byte streams to the server, over TCP or a unix domain socket.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::PathBuf;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};

use crate::error::{ErrorCode, LinkError, Result};

/// Where to dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp {
        host: String,
        port: u16,
        connect_timeout: Option<Duration>,
    },

    #[cfg(unix)]
    Unix { path: PathBuf },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port, .. } => write!(f, "{}:{}", host, port),
            #[cfg(unix)]
            Endpoint::Unix { path } => write!(f, "unix:{}", path.display()),
        }
    }
}

/// An open connection to the server
#[derive(Debug)]
pub enum Transport {
    Tcp(TcpStream),

    #[cfg(unix)]
    Unix(UnixStream),
}

impl Transport {
    /// Open a connection to `endpoint`
    pub fn dial(endpoint: &Endpoint) -> Result<Self> {
        match endpoint {
            Endpoint::Tcp {
                host,
                port,
                connect_timeout,
            } => dial_tcp(host, *port, *connect_timeout).map(Transport::Tcp),
            #[cfg(unix)]
            Endpoint::Unix { path } => Ok(Transport::Unix(UnixStream::connect(path)?)),
        }
    }

    /// Apply the same timeout to reads and writes (`None` = block forever)
    pub fn set_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Transport::Tcp(stream) => {
                stream.set_read_timeout(timeout)?;
                stream.set_write_timeout(timeout)
            }
            #[cfg(unix)]
            Transport::Unix(stream) => {
                stream.set_read_timeout(timeout)?;
                stream.set_write_timeout(timeout)
            }
        }
    }

    /// Enable TCP keepalive probing every `interval_secs` (0 disables it)
    ///
    /// Unix sockets have no keepalive; the call is a no-op for them.
    pub fn set_keepalive(&self, interval_secs: u32) -> io::Result<()> {
        match self {
            Transport::Tcp(stream) => {
                let socket = SockRef::from(stream);
                if interval_secs == 0 {
                    return socket.set_keepalive(false);
                }

                let idle = Duration::from_secs(u64::from(interval_secs));
                let params = TcpKeepalive::new().with_time(idle);
                #[cfg(any(target_os = "linux", target_os = "android"))]
                let params = params
                    .with_interval(Duration::from_secs(u64::from((interval_secs / 3).max(1))))
                    .with_retries(3);
                socket.set_tcp_keepalive(&params)
            }
            #[cfg(unix)]
            Transport::Unix(_) => {
                tracing::debug!("Keepalive does not apply to unix sockets, skipped");
                Ok(())
            }
        }
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Transport::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Transport::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Transport::Unix(stream) => stream.flush(),
        }
    }
}

fn dial_tcp(host: &str, port: u16, connect_timeout: Option<Duration>) -> Result<TcpStream> {
    let connect_timeout = connect_timeout.filter(|timeout| !timeout.is_zero());
    let mut last_err = None;

    for addr in (host, port).to_socket_addrs()? {
        let attempt = match connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                // Disable Nagle's algorithm for low latency
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) => e.into(),
        None => LinkError::Connection {
            code: ErrorCode::Other,
            message: format!("{}:{} resolved to no addresses", host, port),
        },
    })
}
