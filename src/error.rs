/// Errors that can occur when running a driver.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` time
/// - Spawn errors: failed to start the driver process
/// - IO errors: communication failures with the subprocess
/// - Protocol errors: the driver violated the line-delimited JSON contract
/// - Runtime errors: the run was stopped before completion
///
/// A driver exiting with non-zero status is *not* an error: it is reported
/// as a structured result value with a failure `status` (see
/// [`DriverClient::run`](crate::DriverClient::run)).
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected at build() time)
    // -------------------------------------------------------------------------
    /// Invalid configuration provided to builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Spawn errors
    // -------------------------------------------------------------------------
    /// Driver executable not found.
    #[error("driver executable not found: {searched}")]
    DriverNotFound { searched: String },

    /// Failed to spawn the driver subprocess.
    #[error("failed to spawn driver process: {0}")]
    ProcessSpawn(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// IO error communicating with the driver subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol errors
    // -------------------------------------------------------------------------
    /// A non-blank stdout line failed JSON decoding.
    ///
    /// This is fatal for the run: the driver is terminated before the error
    /// propagates, and any partial state is discarded.
    #[error("driver wrote invalid JSON: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// The progress observer requested an abort.
    ///
    /// The driver is terminated best-effort before this propagates.
    #[error("run aborted by progress observer")]
    Aborted,

    /// The run was cancelled by dropping its status stream.
    #[error("run cancelled")]
    Cancelled,
}

/// A specialized Result type for libdriver operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a JSON parse error with context.
    pub fn json_parse(source: serde_json::Error, raw: &str) -> Self {
        Self::JsonParse {
            message: format!(
                "at column {}: {}",
                source.column(),
                raw.chars().take(100).collect::<String>()
            ),
            source,
        }
    }

    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Check if this error means the driver violated the wire protocol.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::JsonParse { .. })
    }

    /// Check if this error occurred before the driver started running.
    pub fn is_spawn_failure(&self) -> bool {
        matches!(
            self,
            Error::DriverNotFound { .. } | Error::ProcessSpawn(_) | Error::InvalidConfig(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonParse {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn protocol_violation_detection() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        assert!(Error::json_parse(json_err, "nope").is_protocol_violation());
        assert!(!Error::Aborted.is_protocol_violation());
        assert!(!Error::Cancelled.is_protocol_violation());
    }

    #[test]
    fn spawn_failure_detection() {
        assert!(Error::DriverNotFound {
            searched: "/no/such/driver".into()
        }
        .is_spawn_failure());
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(Error::ProcessSpawn(io_err).is_spawn_failure());
        assert!(!Error::Aborted.is_spawn_failure());
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        assert!(!Error::Io(io_err).is_spawn_failure());
    }

    #[test]
    fn json_parse_truncates_long_lines() {
        let raw = "x".repeat(500);
        let json_err = serde_json::from_str::<serde_json::Value>(&raw).unwrap_err();
        let err = Error::json_parse(json_err, &raw);
        if let Error::JsonParse { message, .. } = err {
            assert!(message.len() < 200, "raw line should be truncated");
        } else {
            panic!("expected JsonParse");
        }
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn question_mark_operator_json() {
        fn fallible_json() -> Result<()> {
            let _: serde_json::Value = serde_json::from_str("not valid json")?;
            Ok(())
        }
        assert!(matches!(fallible_json(), Err(Error::JsonParse { .. })));
    }
}
