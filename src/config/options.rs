//! Type-safe configuration options for driver runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable selecting the default stderr inclusion policy.
pub const ENV_STDERR_POLICY: &str = "DRIVER_VERBOSE_STDERR";

/// How much captured stderr to fold into a failed run's `message` field.
///
/// When the driver exits non-zero, text it wrote to stderr is appended to
/// the result's `message` (after a `"\nstderr:\n"` marker) according to
/// this policy. Stderr captured from a driver that exits zero is never
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StderrPolicy {
    /// Append everything the driver wrote to stderr.
    #[default]
    All,
    /// Append only the first two captured chunks.
    Minimal,
    /// Do not append any stderr text.
    Discard,
}

impl StderrPolicy {
    /// Read the policy from [`ENV_STDERR_POLICY`], defaulting to `All`.
    ///
    /// This is a convenience for callers that keep the original
    /// environment-driven configuration; the policy itself is always
    /// threaded explicitly through [`DriverConfig`](super::DriverConfig)
    /// so runs stay independently testable.
    pub fn from_env() -> Self {
        match std::env::var(ENV_STDERR_POLICY) {
            Ok(value) => Self::from(value.as_str()),
            Err(_) => Self::All,
        }
    }
}

impl fmt::Display for StderrPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StderrPolicy::All => write!(f, "all"),
            StderrPolicy::Minimal => write!(f, "minimal"),
            StderrPolicy::Discard => write!(f, "discard"),
        }
    }
}

impl From<&str> for StderrPolicy {
    /// Any value other than `"all"` or `"minimal"` discards stderr.
    fn from(s: &str) -> Self {
        match s {
            "all" => StderrPolicy::All,
            "minimal" => StderrPolicy::Minimal,
            _ => StderrPolicy::Discard,
        }
    }
}

impl From<String> for StderrPolicy {
    fn from(s: String) -> Self {
        StderrPolicy::from(s.as_str())
    }
}
