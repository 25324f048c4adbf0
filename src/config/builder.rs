//! Driver invocation configuration and builder.
//!
//! # Example
//!
//! ```ignore
//! use libdriver::config::{DriverConfig, StderrPolicy};
//!
//! let config = DriverConfig::builder("./adjust-driver")
//!     .arg("--verbose")
//!     .arg("app-1234")
//!     .stderr_policy(StderrPolicy::Minimal)
//!     .build()?;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::options::StderrPolicy;
use crate::{Error, Result};

/// Configuration for one driver invocation.
///
/// Use [`DriverConfig::builder()`] to create a new configuration. The
/// configuration is immutable once a run starts; a single config may be
/// reused across any number of independent runs.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub(crate) driver: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) stderr_policy: StderrPolicy,
    pub(crate) working_directory: Option<PathBuf>,
    pub(crate) env_vars: HashMap<String, String>,
    pub(crate) inherit_env: bool,
}

impl DriverConfig {
    /// Create a new builder for the given driver executable.
    pub fn builder(driver: impl Into<PathBuf>) -> DriverConfigBuilder {
        DriverConfigBuilder::new(driver)
    }

    /// Path to the driver executable.
    pub fn driver(&self) -> &Path {
        &self.driver
    }

    /// Arguments passed to the driver, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The stderr inclusion policy applied to failed runs.
    pub fn stderr_policy(&self) -> StderrPolicy {
        self.stderr_policy
    }

    /// The working directory for the driver, if overridden.
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }
}

/// Builder for [`DriverConfig`].
///
/// [`build()`](DriverConfigBuilder::build) validates the configuration; it
/// does not touch the filesystem, so a missing executable surfaces later as
/// a spawn error.
#[derive(Debug, Clone)]
pub struct DriverConfigBuilder {
    driver: PathBuf,
    args: Vec<String>,
    stderr_policy: StderrPolicy,
    working_directory: Option<PathBuf>,
    env_vars: HashMap<String, String>,
    inherit_env: bool,
}

impl DriverConfigBuilder {
    /// Create a builder for the given driver executable.
    pub fn new(driver: impl Into<PathBuf>) -> Self {
        Self {
            driver: driver.into(),
            args: Vec::new(),
            stderr_policy: StderrPolicy::default(),
            working_directory: None,
            env_vars: HashMap::new(),
            inherit_env: true,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the stderr inclusion policy (default: [`StderrPolicy::All`]).
    pub fn stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    /// Set the working directory for the driver process.
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Set an environment variable for the driver process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Whether the driver inherits this process's environment (default: true).
    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the driver path is empty.
    pub fn build(self) -> Result<DriverConfig> {
        if self.driver.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("driver path is empty".to_string()));
        }

        Ok(DriverConfig {
            driver: self.driver,
            args: self.args,
            stderr_policy: self.stderr_policy,
            working_directory: self.working_directory,
            env_vars: self.env_vars,
            inherit_env: self.inherit_env,
        })
    }
}
