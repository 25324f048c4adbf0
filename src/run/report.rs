//! Post-exit result enrichment.
//!
//! After the run loop drains both output streams and reaps the driver,
//! the exit status decides how the last decoded response is reported:
//! a zero exit returns it untouched, a non-zero exit folds captured
//! stderr into it per the configured [`StderrPolicy`].

use std::process::ExitStatus;

use serde_json::{Map, Value};

use crate::config::StderrPolicy;
use crate::protocol::{MESSAGE_FIELD, STATUS_FAILED, STATUS_FIELD, STATUS_NODATA, STDERR_MARKER};

/// Everything the run loop accumulated, ready for enrichment.
pub(crate) struct RunOutcome {
    pub(crate) last_response: Value,
    pub(crate) exit_status: ExitStatus,
    pub(crate) stderr_chunks: Vec<Vec<u8>>,
}

/// Turn a drained run into the final result object.
///
/// A successful exit returns the last response unchanged. On failure the
/// result is guaranteed to carry a `status` field (substituting
/// `"failed"` when the driver reported none) and, policy permitting, its
/// `message` is extended with the captured stderr text after a
/// `"\nstderr:\n"` marker.
pub(crate) fn enrich(outcome: RunOutcome, policy: StderrPolicy) -> Value {
    let RunOutcome {
        last_response,
        exit_status,
        stderr_chunks,
    } = outcome;

    if exit_status.success() {
        return last_response;
    }

    tracing::warn!(
        code = ?exit_status.code(),
        stderr_bytes = stderr_chunks.iter().map(Vec::len).sum::<usize>(),
        "driver exited with failure"
    );

    // A well-behaved driver reports failures as structured objects; if the
    // last line was some other JSON type there is nothing to enrich, so
    // start over from an empty object.
    let mut response = match last_response {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    // The sentinel counts as "no status reported": a driver that wrote
    // nothing and then failed must surface as failed, not nodata.
    let status_missing = match response.get(STATUS_FIELD) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty() || s == STATUS_NODATA,
        Some(_) => false,
    };
    if status_missing {
        response.insert(STATUS_FIELD.into(), Value::String(STATUS_FAILED.into()));
    }

    let appended = match policy {
        StderrPolicy::All => Some(join_chunks(&stderr_chunks)),
        StderrPolicy::Minimal => {
            let take = stderr_chunks.len().min(2);
            Some(join_chunks(&stderr_chunks[..take]))
        }
        StderrPolicy::Discard => None,
    };
    if let Some(text) = appended {
        let existing = response
            .get(MESSAGE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or("");
        let message = format!("{existing}{STDERR_MARKER}{text}");
        response.insert(MESSAGE_FIELD.into(), Value::String(message));
    }

    Value::Object(response)
}

/// Concatenate raw stderr chunks for reporting.
///
/// Chunks are joined with a newline, matching the chunk-at-a-time way
/// they were captured; bytes that are not valid UTF-8 are replaced.
pub(crate) fn join_chunks(chunks: &[Vec<u8>]) -> String {
    chunks
        .iter()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[cfg(unix)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(unix)]
    fn outcome(last: Value, code: i32, stderr: &[&str]) -> RunOutcome {
        RunOutcome {
            last_response: last,
            exit_status: exit_status(code),
            stderr_chunks: stderr.iter().map(|s| s.as_bytes().to_vec()).collect(),
        }
    }

    #[test]
    fn join_chunks_inserts_newlines() {
        assert_eq!(join_chunks(&[]), "");
        assert_eq!(join_chunks(&[b"boom".to_vec()]), "boom");
        assert_eq!(
            join_chunks(&[b"first".to_vec(), b"second".to_vec()]),
            "first\nsecond"
        );
    }

    #[test]
    fn join_chunks_replaces_invalid_utf8() {
        let joined = join_chunks(&[vec![0xff, 0xfe]]);
        assert!(!joined.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn success_returns_response_unchanged() {
        let last = json!({"status": "ok", "metrics": {"rps": 120.5}});
        let result = enrich(outcome(last.clone(), 0, &["noise on stderr"]), StderrPolicy::All);
        assert_eq!(result, last);
    }

    #[cfg(unix)]
    #[test]
    fn failure_with_no_output_reports_failed_and_stderr() {
        let result = enrich(
            outcome(crate::protocol::initial_response(), 1, &["boom"]),
            StderrPolicy::All,
        );
        assert_eq!(result, json!({"status": "failed", "message": "\nstderr:\nboom"}));
    }

    #[cfg(unix)]
    #[test]
    fn nodata_sentinel_counts_as_missing_status() {
        // The sentinel is replaced regardless of the stderr policy.
        let result = enrich(
            outcome(json!({"status": "nodata"}), 2, &[]),
            StderrPolicy::Discard,
        );
        assert_eq!(result, json!({"status": "failed"}));
    }

    #[cfg(unix)]
    #[test]
    fn failure_without_status_gets_failed() {
        let result = enrich(
            outcome(json!({"message": "went sideways"}), 3, &["detail"]),
            StderrPolicy::All,
        );
        assert_eq!(result["status"], "failed");
        assert_eq!(result["message"], "went sideways\nstderr:\ndetail");
    }

    #[cfg(unix)]
    #[test]
    fn empty_status_is_replaced() {
        let result = enrich(
            outcome(json!({"status": "", "message": "m"}), 1, &[]),
            StderrPolicy::All,
        );
        assert_eq!(result["status"], "failed");
        assert_eq!(result["message"], "m\nstderr:\n");
    }

    #[cfg(unix)]
    #[test]
    fn driver_reported_status_is_kept() {
        let result = enrich(
            outcome(json!({"status": "rejected", "message": "bad config"}), 1, &["log"]),
            StderrPolicy::All,
        );
        assert_eq!(result["status"], "rejected");
        assert_eq!(result["message"], "bad config\nstderr:\nlog");
    }

    #[cfg(unix)]
    #[test]
    fn minimal_policy_takes_first_two_chunks() {
        let result = enrich(
            outcome(json!({}), 1, &["one", "two", "three"]),
            StderrPolicy::Minimal,
        );
        assert_eq!(result["message"], "\nstderr:\none\ntwo");
    }

    #[cfg(unix)]
    #[test]
    fn discard_policy_leaves_message_untouched() {
        let result = enrich(
            outcome(json!({"message": "original"}), 1, &["hidden"]),
            StderrPolicy::Discard,
        );
        assert_eq!(result["status"], "failed");
        assert_eq!(result["message"], "original");
    }

    #[cfg(unix)]
    #[test]
    fn non_object_response_is_replaced_on_failure() {
        let result = enrich(outcome(json!([1, 2, 3]), 1, &["err"]), StderrPolicy::All);
        assert_eq!(result["status"], "failed");
        assert_eq!(result["message"], "\nstderr:\nerr");
    }
}
