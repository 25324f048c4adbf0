//! The run loop: readiness multiplexing across the driver's three pipes.
//!
//! One run owns one [`DriverProcess`] and its three pipe handles, and
//! drives them from a single task. The only suspension point is the
//! `select!` that races the three cancel-safe pipe operations:
//!
//! - stdout: one newline-terminated record at a time, decoded as JSON
//! - stderr: opaque chunks, accumulated verbatim
//! - stdin: bounded writes of the pending request payload
//!
//! A stream that reaches end-of-stream drops out of the race; the loop
//! only ends once *both* readable pipes are exhausted, because the OS may
//! hold buffered bytes after the driver dies. The child is then reaped
//! and the accumulated state handed to [`report::enrich`].
//!
//! Every exit path, including the fatal JSON-decode path and an
//! observer-requested abort, kills and reaps the child before the error
//! propagates.

pub(crate) mod report;
mod stream;

pub use stream::{StatusEvent, StatusStream};

use serde_json::Value;

use crate::observer::ProgressObserver;
use crate::process::{DriverProcess, RequestWriter, StatusLineReader, StderrCollector};
use crate::protocol;
use crate::{Error, Result};
use report::RunOutcome;

/// Drive one driver process to completion.
///
/// Sends the payload (if any) on stdin, consumes stdout line-by-line
/// through the observer, accumulates stderr, and returns the drained
/// state once the child has exited and both readable pipes hit EOF.
pub(crate) async fn drive(
    mut process: DriverProcess,
    payload: Option<&Value>,
    observer: Option<&dyn ProgressObserver>,
) -> Result<RunOutcome> {
    let stdin = process.take_stdin().expect("stdin was configured");
    let stdout = process.take_stdout().expect("stdout was configured");
    let stderr = process.take_stderr().expect("stderr was configured");

    let pending = match payload {
        Some(value) => serde_json::to_vec(value)?,
        None => Vec::new(),
    };
    let mut writer = RequestWriter::new(stdin, pending);
    if !writer.has_pending() {
        // No request: zero bytes are written and stdin closes right away,
        // so drivers waiting on end-of-input don't hang.
        writer.close().await?;
    }

    let mut reader = StatusLineReader::new(stdout);
    let mut collector = StderrCollector::new(stderr);
    let mut eof_stdout = false;
    let mut eof_stderr = false;
    let mut last_response = protocol::initial_response();

    while !(eof_stdout && eof_stderr) {
        tokio::select! {
            line = reader.next_line(), if !eof_stdout => match line {
                // Blank lines are discarded without decoding.
                Ok(Some(raw)) if !raw.trim().is_empty() => {
                    let text = raw.trim();
                    let value = match serde_json::from_str::<Value>(text) {
                        Ok(value) => value,
                        Err(e) => {
                            terminate(&mut process).await;
                            return Err(Error::json_parse(e, text));
                        }
                    };
                    tracing::debug!(line = %text, "driver stdout");
                    if protocol::truthy(&value) {
                        if let Some(obs) = observer {
                            if obs.on_status(&value).is_break() {
                                terminate(&mut process).await;
                                return Err(Error::Aborted);
                            }
                        }
                        last_response = value;
                    }
                }
                Ok(Some(_)) => {}
                Ok(None) => eof_stdout = true,
                Err(e) => {
                    terminate(&mut process).await;
                    return Err(e);
                }
            },

            more = collector.read_chunk(), if !eof_stderr => match more {
                Ok(true) => {}
                Ok(false) => eof_stderr = true,
                Err(e) => {
                    terminate(&mut process).await;
                    return Err(e);
                }
            },

            res = writer.write_chunk(), if writer.has_pending() => match res {
                Ok(()) => {
                    if !writer.has_pending() {
                        writer.close().await?;
                    }
                }
                Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    // The driver stopped reading its input; keep draining
                    // its output and report whatever it exits with.
                    writer.abandon();
                }
                Err(e) => {
                    terminate(&mut process).await;
                    return Err(e);
                }
            },
        }
    }

    let exit_status = process.wait().await?;
    Ok(RunOutcome {
        last_response,
        exit_status,
        stderr_chunks: collector.into_chunks(),
    })
}

/// Kill the driver and reap it. Used on every fatal mid-run exit path.
async fn terminate(process: &mut DriverProcess) {
    let _ = process.kill().await;
}
