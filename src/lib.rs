//! # libdriver
//!
//! Async runner for external "driver" executables speaking newline-delimited
//! JSON.
//!
//! A driver is a program that optionally reads a single JSON request from
//! stdin, writes zero or more newline-terminated JSON status objects to
//! stdout, logs free-form text to stderr, and exits zero on success. This
//! library launches a driver, multiplexes all three pipes from one task so
//! no pipe can deadlock on a full buffer, reports each decoded status line
//! to a progress observer, and returns the last one as the run's result,
//! enriched with exit-code and stderr information when the driver fails.
//!
//! ## Quick Start
//!
//! ```ignore
//! use libdriver::{DriverClient, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = DriverClient::new("./measure-driver")?;
//!     let result = client.run(Some(&json!({"metrics": ["time taken"]}))).await?;
//!     println!("status: {}", result["status"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Progress reporting
//!
//! ```ignore
//! use std::ops::ControlFlow;
//! use serde_json::Value;
//!
//! let result = client
//!     .run_with_observer(None, &|status: &Value| {
//!         println!("driver says: {status}");
//!         ControlFlow::Continue(())
//!     })
//!     .await?;
//! ```
//!
//! ## Streaming
//!
//! ```ignore
//! use futures::StreamExt;
//! use libdriver::StatusEvent;
//!
//! let mut stream = client.stream(None)?;
//! while let Some(event) = stream.next().await {
//!     if let StatusEvent::Status(update) = event? {
//!         println!("{update}");
//!     }
//! }
//! ```
//!
//! ## Failure reporting
//!
//! A driver exiting non-zero is surfaced as data, not as an error: the
//! returned object is guaranteed to carry a `status` field and, per the
//! configured [`StderrPolicy`], its `message` is extended with the text
//! the driver wrote to stderr. Errors are reserved for spawn failures,
//! pipe I/O failures, and protocol violations (a non-blank stdout line
//! that is not valid JSON).

mod client;
pub mod config;
mod error;
mod observer;
pub mod process;
pub mod protocol;
pub mod run;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::DriverClient;

// Re-export commonly used config types at crate root
pub use config::{DriverConfig, DriverConfigBuilder, StderrPolicy};

// Re-export observer types at crate root
pub use observer::{LogLevel, LoggingObserver, ProgressObserver};

// Re-export commonly used process types at crate root
pub use process::DriverProcess;

// Re-export streaming types at crate root
pub use run::{StatusEvent, StatusStream};
