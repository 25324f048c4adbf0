//! Configuration for driver invocations.
//!
//! This module provides:
//!
//! - [`DriverConfig`] and [`DriverConfigBuilder`] for describing an
//!   invocation (executable, arguments, environment)
//! - [`StderrPolicy`] for how much captured stderr a failed run reports
//!
//! # Example
//!
//! ```ignore
//! use libdriver::config::{DriverConfig, StderrPolicy};
//!
//! let config = DriverConfig::builder("./measure-driver")
//!     .arg("app-1234")
//!     .stderr_policy(StderrPolicy::from_env())
//!     .build()?;
//! ```

pub mod builder;
pub mod options;

pub use builder::{DriverConfig, DriverConfigBuilder};
pub use options::{StderrPolicy, ENV_STDERR_POLICY};
