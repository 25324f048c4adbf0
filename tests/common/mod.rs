//! Test utilities for libdriver integration tests.
//!
//! Drivers are small `/bin/sh` scripts, which keeps every scenario a real
//! subprocess with real pipes.

use std::ops::ControlFlow;
use std::sync::Mutex;

use libdriver::{DriverClient, DriverConfig, ProgressObserver, StderrPolicy};
use serde_json::Value;

/// Build a client that runs the given shell script as its driver.
pub fn sh_client(script: &str) -> DriverClient {
    sh_client_with_policy(script, StderrPolicy::All)
}

/// Build a client with an explicit stderr policy.
pub fn sh_client_with_policy(script: &str, policy: StderrPolicy) -> DriverClient {
    let config = DriverConfig::builder("/bin/sh")
        .args(["-c", script])
        .stderr_policy(policy)
        .build()
        .expect("config should build");
    DriverClient::with_config(config)
}

/// Observer that records every status line it receives.
#[derive(Default)]
pub struct Recorder {
    statuses: Mutex<Vec<Value>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<Value> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.statuses.lock().unwrap().len()
    }
}

impl ProgressObserver for Recorder {
    fn on_status(&self, status: &Value) -> ControlFlow<()> {
        self.statuses.lock().unwrap().push(status.clone());
        ControlFlow::Continue(())
    }
}

/// Observer that records statuses and aborts after `limit` of them.
pub struct AbortAfter {
    recorder: Recorder,
    limit: usize,
}

impl AbortAfter {
    pub fn new(limit: usize) -> Self {
        Self {
            recorder: Recorder::new(),
            limit,
        }
    }

    pub fn count(&self) -> usize {
        self.recorder.count()
    }
}

impl ProgressObserver for AbortAfter {
    fn on_status(&self, status: &Value) -> ControlFlow<()> {
        self.recorder.on_status(status);
        if self.recorder.count() >= self.limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
