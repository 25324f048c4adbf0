//! Process management for driver executables.
//!
//! This module handles spawning and communicating with a driver subprocess.
//! Each run spawns a new process; the three pipes are owned exclusively by
//! that run for its whole lifetime.
//!
//! # Architecture
//!
//! ```text
//! libdriver                          driver
//! ┌──────────────┐                  ┌─────────────┐
//! │ DriverProcess│──stdin (request)▶│             │
//! │              │◀─stdout (JSON)───│             │
//! │              │◀─stderr (text)───│             │
//! └──────────────┘                  └─────────────┘
//! ```
//!
//! # Input Protocol
//!
//! If a request payload is given, it is serialized as a single JSON value
//! and written to the driver's stdin in bounded chunks; stdin is then
//! closed to signal end-of-input. Many drivers block until that close.
//!
//! # Output Protocol
//!
//! The driver writes newline-delimited JSON to stdout, one complete value
//! per line, flushed promptly. Stderr is free-form text, captured verbatim
//! and never line-parsed.

mod io;
mod spawn;

pub use io::{RequestWriter, StatusLineReader, StderrCollector};
pub use spawn::DriverProcess;

/// Maximum bytes written to the driver's stdin per readiness cycle.
///
/// Kept at the POSIX `PIPE_BUF` floor so a single write never blocks once
/// the pipe reports writable.
pub const STDIN_WRITE_LIMIT: usize = 512;

/// Read size for draining the driver's stderr.
pub const STDERR_CHUNK_SIZE: usize = 4096;
