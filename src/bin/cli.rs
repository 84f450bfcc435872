//! resplink CLI Client
//!
//! Command-line interface for sending commands to a RESP server.
//!
//! ```text
//! resplink-cli SET greeting hello
//! resplink-cli --pipeline SET n 1 ';' INCR n ';' GET n
//! resplink-cli --socket /tmp/server.sock PING
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use resplink::{Client, Command, Config, ErrorCategory, LinkError};
use tracing_subscriber::{fmt, EnvFilter};

/// resplink CLI
#[derive(Parser, Debug)]
#[command(name = "resplink-cli")]
#[command(about = "Send commands to a RESP key-value server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// Unix socket path (overrides host/port)
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Connect timeout in milliseconds
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Read/write timeout in microseconds
    #[arg(short, long)]
    timeout_us: Option<u64>,

    /// TCP keepalive interval in seconds
    #[arg(short, long)]
    keepalive: Option<u32>,

    /// Maximum buffered reply size in bytes (0 = unbounded)
    #[arg(short, long)]
    max_reply_size: Option<usize>,

    /// Treat error replies as failures
    #[arg(long)]
    throw_errors: bool,

    /// Send several commands separated by ';' before reading any reply
    #[arg(long)]
    pipeline: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Command and arguments
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing/logging
    let fallback = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("resplink-cli v{}", resplink::VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            match e.category() {
                ErrorCategory::ApplicationReply => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}

fn run(args: &Args) -> Result<(), LinkError> {
    let mut client = Client::with_config(build_config(args));

    match &args.socket {
        #[cfg(unix)]
        Some(path) => client.connect_path(path)?,
        #[cfg(not(unix))]
        Some(_) => {
            return Err(LinkError::Config(
                "unix sockets are not supported on this platform".to_string(),
            ))
        }
        None => client.connect(&args.host, args.port)?,
    }

    let commands = split_commands(&args.command, args.pipeline);
    for command in &commands {
        client.enqueue(command)?;
    }

    tracing::debug!("Enqueued {} commands", commands.len());

    for _ in 0..commands.len() {
        let reply = client.drain_one()?;
        println!("{}", reply);
    }

    Ok(())
}

fn build_config(args: &Args) -> Config {
    let mut builder = Config::builder().throw_on_error_reply(args.throw_errors);
    if let Some(ms) = args.connect_timeout_ms {
        builder = builder.connect_timeout(Duration::from_millis(ms));
    }
    if let Some(us) = args.timeout_us {
        builder = builder.timeout_us(us);
    }
    if let Some(secs) = args.keepalive {
        builder = builder.keep_alive_secs(secs);
    }
    if let Some(bytes) = args.max_reply_size {
        builder = builder.max_reply_size(bytes);
    }
    builder.build()
}

/// Split the argument list on literal ";" when pipelining
fn split_commands(words: &[String], pipeline: bool) -> Vec<Command> {
    if !pipeline {
        return vec![words.iter().collect()];
    }
    words
        .split(|word| word == ";")
        .filter(|group| !group.is_empty())
        .map(|group| group.iter().collect())
        .collect()
}
