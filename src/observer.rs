//! Progress observer trait and implementations.

use std::ops::ControlFlow;

use serde_json::Value;

/// Observer for decoded driver status lines.
///
/// The run loop calls [`on_status`](Self::on_status) once per non-blank
/// decoded output line, including the final one, synchronously between
/// readiness waits. There is no separate "final" notification beyond the
/// run's return value.
///
/// # Implementation Notes
///
/// - Implementations must be lightweight; blocking here stalls stream
///   draining and lets the driver's pipe buffers fill up.
/// - Returning `ControlFlow::Break(())` requests a cooperative abort: the
///   run kills the driver best-effort and fails with
///   [`Error::Aborted`](crate::Error::Aborted).
///
/// # Example
///
/// ```ignore
/// use std::ops::ControlFlow;
/// use libdriver::ProgressObserver;
/// use serde_json::Value;
///
/// struct ProgressBar;
///
/// impl ProgressObserver for ProgressBar {
///     fn on_status(&self, status: &Value) -> ControlFlow<()> {
///         if let Some(pct) = status.get("progress").and_then(Value::as_u64) {
///             eprintln!("progress: {pct}%");
///         }
///         ControlFlow::Continue(())
///     }
/// }
/// ```
pub trait ProgressObserver: Send + Sync {
    /// Called once per decoded status line.
    fn on_status(&self, status: &Value) -> ControlFlow<()> {
        let _ = status;
        ControlFlow::Continue(())
    }
}

impl<F> ProgressObserver for F
where
    F: Fn(&Value) -> ControlFlow<()> + Send + Sync,
{
    fn on_status(&self, status: &Value) -> ControlFlow<()> {
        self(status)
    }
}

/// Simple observer that logs each status line using tracing.
///
/// # Example
///
/// ```ignore
/// use libdriver::{DriverClient, LoggingObserver};
///
/// let result = client
///     .run_with_observer(Some(&request), &LoggingObserver::new())
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    level: LogLevel,
}

/// Log level for LoggingObserver.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogLevel {
    /// Log at trace level.
    Trace,
    /// Log at debug level (default).
    #[default]
    Debug,
    /// Log at info level.
    Info,
}

impl LoggingObserver {
    /// Create a new logging observer with debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging observer with a specific level.
    pub fn with_level(level: LogLevel) -> Self {
        Self { level }
    }
}

impl ProgressObserver for LoggingObserver {
    fn on_status(&self, status: &Value) -> ControlFlow<()> {
        let phase = status
            .get(crate::protocol::STATUS_FIELD)
            .and_then(Value::as_str)
            .unwrap_or("-");
        match self.level {
            LogLevel::Trace => tracing::trace!(%phase, %status, "driver status"),
            LogLevel::Debug => tracing::debug!(%phase, %status, "driver status"),
            LogLevel::Info => tracing::info!(%phase, %status, "driver status"),
        }
        ControlFlow::Continue(())
    }
}
