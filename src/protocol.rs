//! Wire-protocol conventions for driver result objects.
//!
//! The driver writes newline-delimited JSON objects to stdout. This crate
//! never interprets their semantic content; the only structure it relies on
//! is the `status` / `message` pair used for failure reporting.
//!
//! The recognized `status` value space includes at least [`STATUS_NODATA`]
//! (driver produced no output), [`STATUS_FAILED`] (driver exited non-zero
//! without reporting a status of its own), and driver-defined success
//! statuses.

use serde_json::{json, Value};

/// Field holding the outcome classification of a run.
pub const STATUS_FIELD: &str = "status";

/// Field holding free-form human-readable detail, extended with captured
/// stderr on failure.
pub const MESSAGE_FIELD: &str = "message";

/// Status reported when the driver wrote no decodable output at all.
pub const STATUS_NODATA: &str = "nodata";

/// Status substituted when the driver exited non-zero without setting one.
pub const STATUS_FAILED: &str = "failed";

/// Separator inserted between an existing message and appended stderr text.
pub const STDERR_MARKER: &str = "\nstderr:\n";

/// The sentinel result a run starts from.
///
/// Kept as an explicit well-formed object rather than `Value::Null` so a
/// driver that produces zero output lines still yields a uniform result.
pub fn initial_response() -> Value {
    json!({ STATUS_FIELD: STATUS_NODATA })
}

/// Whether a decoded line carries reportable content.
///
/// Null, `false`, zero, and empty strings/arrays/objects are skipped: they
/// are neither delivered to the progress observer nor retained as the run's
/// last response.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
