//! Streaming consumption of a driver run.
//!
//! [`StatusStream`] runs the multiplexer on a background task and exposes
//! each decoded status line as it arrives, followed by the enriched final
//! result. Dropping the stream cancels the task, which kills the driver.

use std::ops::ControlFlow;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde_json::Value;
use tokio::sync::mpsc;

use super::report::enrich;
use crate::config::StderrPolicy;
use crate::observer::ProgressObserver;
use crate::process::DriverProcess;
use crate::{Error, Result};

/// An event from a streaming driver run.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// One decoded status line, in arrival order.
    Status(Value),
    /// The enriched final result; always the last event of a run that
    /// finished normally.
    Complete(Value),
}

/// A stream of [`StatusEvent`]s from a running driver.
///
/// Implements [`futures::Stream`] for use with async combinators.
///
/// # Cancellation
///
/// Dropping a `StatusStream` aborts the background run task; the driver
/// process is killed when the task's state unwinds.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
/// use libdriver::StatusEvent;
///
/// let mut stream = client.stream(Some(request))?;
/// while let Some(event) = stream.next().await {
///     match event? {
///         StatusEvent::Status(update) => println!("progress: {update}"),
///         StatusEvent::Complete(result) => println!("done: {result}"),
///     }
/// }
/// ```
pub struct StatusStream {
    rx: mpsc::UnboundedReceiver<Result<StatusEvent>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

/// Observer that forwards each status line into the stream's channel.
struct ChannelObserver {
    tx: mpsc::UnboundedSender<Result<StatusEvent>>,
}

impl ProgressObserver for ChannelObserver {
    fn on_status(&self, status: &Value) -> ControlFlow<()> {
        // A closed receiver means the stream was dropped; abort the run.
        match self.tx.send(Ok(StatusEvent::Status(status.clone()))) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    }
}

impl StatusStream {
    /// Run the given process on a background task, streaming its status
    /// lines.
    pub(crate) fn spawn(
        process: DriverProcess,
        payload: Option<Value>,
        policy: StderrPolicy,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let task_handle = tokio::spawn(async move {
            let observer = ChannelObserver { tx: tx.clone() };
            let outcome = super::drive(process, payload.as_ref(), Some(&observer)).await;
            let _ = match outcome {
                Ok(outcome) => tx.send(Ok(StatusEvent::Complete(enrich(outcome, policy)))),
                // Receiver already gone; the abort was ours, nothing to report.
                Err(Error::Aborted) if tx.is_closed() => Ok(()),
                Err(e) => tx.send(Err(e)),
            };
        });

        Self {
            rx,
            task_handle: Some(task_handle),
        }
    }

    /// Drain the stream and return the enriched final result.
    pub async fn collect(mut self) -> Result<Value> {
        use futures::StreamExt;

        while let Some(event) = self.next().await {
            if let StatusEvent::Complete(result) = event? {
                return Ok(result);
            }
        }
        Err(Error::Cancelled)
    }
}

impl Stream for StatusStream {
    type Item = Result<StatusEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for StatusStream {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
        // The driver process is owned by the task and killed on drop.
    }
}
