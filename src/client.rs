//! High-level entry point for running drivers.
//!
//! This module provides [`DriverClient`], which ties together process
//! launch, the run loop, and result enrichment.
//!
//! # Example
//!
//! ```ignore
//! use libdriver::{DriverClient, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = DriverClient::new("./measure-driver")?;
//!     let request = json!({"metrics": ["time taken", "requests throughput"]});
//!     let result = client.run(Some(&request)).await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::config::DriverConfig;
use crate::observer::ProgressObserver;
use crate::process::DriverProcess;
use crate::run::{self, StatusStream};
use crate::Result;

/// A client for running a driver executable.
///
/// `DriverClient` holds an immutable invocation configuration and spawns
/// one fresh driver process per call. It is `Send + Sync`; callers that
/// want concurrent driver invocations run independent calls, each of
/// which owns its own child process and pipe set.
///
/// # Result contract
///
/// [`run`](Self::run) returns the last JSON object the driver wrote, or
/// the `{"status": "nodata"}` sentinel if it wrote nothing. A driver
/// exiting non-zero is *not* an error: the result is enriched with a
/// failure `status` and captured stderr per the configured
/// [`StderrPolicy`](crate::StderrPolicy). Errors are reserved for spawn
/// failures, pipe I/O failures, and protocol violations.
#[derive(Debug, Clone)]
pub struct DriverClient {
    config: Arc<DriverConfig>,
}

impl DriverClient {
    /// Create a client for the given driver executable with default
    /// configuration.
    pub fn new(driver: impl Into<PathBuf>) -> Result<Self> {
        let config = DriverConfig::builder(driver).build()?;
        Ok(Self::with_config(config))
    }

    /// Create a client with the given configuration.
    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The configuration this client runs with.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run the driver to completion and return the final result object.
    ///
    /// If `request` is given it is serialized as a single JSON value to
    /// the driver's stdin, which is then closed; with no request, stdin
    /// receives zero bytes and closes immediately.
    pub async fn run(&self, request: Option<&Value>) -> Result<Value> {
        self.run_inner(request, None).await
    }

    /// Run the driver, delivering each decoded status line to `observer`.
    ///
    /// The observer is invoked synchronously on the run's task, once per
    /// non-blank decoded line including the final one. If it returns
    /// `Break`, the driver is killed and the run fails with
    /// [`Error::Aborted`](crate::Error::Aborted).
    pub async fn run_with_observer(
        &self,
        request: Option<&Value>,
        observer: &dyn ProgressObserver,
    ) -> Result<Value> {
        self.run_inner(request, Some(observer)).await
    }

    /// Start the driver and return a stream of its status lines.
    ///
    /// The run proceeds on a background task; dropping the stream cancels
    /// it and kills the driver. See [`StatusStream`].
    pub fn stream(&self, request: Option<Value>) -> Result<StatusStream> {
        tracing::debug!(
            driver = %self.config.driver().display(),
            args = ?self.config.args(),
            "driver request"
        );
        let process = DriverProcess::spawn(&self.config)?;
        Ok(StatusStream::spawn(
            process,
            request,
            self.config.stderr_policy(),
        ))
    }

    async fn run_inner(
        &self,
        request: Option<&Value>,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<Value> {
        tracing::debug!(
            driver = %self.config.driver().display(),
            args = ?self.config.args(),
            has_request = request.is_some(),
            "driver request"
        );

        let process = DriverProcess::spawn(&self.config)?;
        let outcome = run::drive(process, request, observer).await?;
        let result = run::report::enrich(outcome, self.config.stderr_policy());

        tracing::debug!(response = %result, "driver response");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_send_sync_clone() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<DriverClient>();
    }

    #[test]
    fn new_rejects_empty_path() {
        assert!(DriverClient::new("").is_err());
    }

    #[test]
    fn config_is_shared() {
        let client = DriverClient::new("/bin/true").unwrap();
        let clone = client.clone();
        assert_eq!(client.config().driver(), clone.config().driver());
    }
}
