//! I/O primitives for the three driver pipes.
//!
//! Each pipe has its own consumption discipline: stdout is read one
//! newline-terminated record at a time, stdin is fed in bounded chunks,
//! and stderr is drained in opaque chunks. All three operations are
//! cancel-safe so the run loop can race them in a `tokio::select!`.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};

use super::{STDERR_CHUNK_SIZE, STDIN_WRITE_LIMIT};
use crate::{Error, Result};

/// Reads newline-delimited records from the driver's stdout.
///
/// Readiness on the pipe does not guarantee a full line, so this buffers
/// partial lines internally; `next_line` only resolves once a complete
/// record (or EOF) is available, and is safe to race against the other
/// pipes.
pub struct StatusLineReader {
    lines: Lines<BufReader<ChildStdout>>,
}

impl StatusLineReader {
    /// Create a new reader from a child process stdout.
    pub fn new(stdout: ChildStdout) -> Self {
        Self {
            lines: BufReader::new(stdout).lines(),
        }
    }

    /// Read the next line, without its terminator.
    ///
    /// Returns `Ok(None)` at end-of-stream. A final fragment that was not
    /// newline-terminated is returned as an ordinary line.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        self.lines.next_line().await.map_err(Error::io)
    }
}

/// Feeds the serialized request payload to the driver's stdin.
///
/// The pending buffer only shrinks. Writes are capped at
/// [`STDIN_WRITE_LIMIT`] bytes so each one completes atomically once the
/// pipe is writable. When the buffer is drained (or there was no payload
/// at all) the pipe must be closed via [`close`](Self::close) to signal
/// end-of-input; many drivers block until they see it.
pub struct RequestWriter {
    stdin: Option<ChildStdin>,
    pending: Vec<u8>,
    cursor: usize,
}

impl RequestWriter {
    /// Create a new writer over the given payload bytes.
    pub fn new(stdin: ChildStdin, pending: Vec<u8>) -> Self {
        Self {
            stdin: Some(stdin),
            pending,
            cursor: 0,
        }
    }

    /// Whether any payload bytes are still waiting to be written.
    pub fn has_pending(&self) -> bool {
        self.cursor < self.pending.len() && self.stdin.is_some()
    }

    /// Write one bounded chunk and advance the cursor.
    ///
    /// This performs at most one write. Cancel-safe: if the future is
    /// dropped before completion, no bytes were written and the cursor is
    /// unchanged.
    pub async fn write_chunk(&mut self) -> Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(());
        };
        let end = self.pending.len().min(self.cursor + STDIN_WRITE_LIMIT);
        let written = stdin
            .write(&self.pending[self.cursor..end])
            .await
            .map_err(Error::io)?;
        self.cursor += written;
        Ok(())
    }

    /// Flush and close stdin, signalling end-of-input to the driver.
    ///
    /// Idempotent; after this the writer reports no pending bytes.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.shutdown().await.map_err(Error::io)?;
        }
        Ok(())
    }

    /// Drop stdin and forget any unsent bytes.
    ///
    /// Used when the driver closes its end of the pipe before reading the
    /// whole payload.
    pub fn abandon(&mut self) {
        self.stdin = None;
        self.cursor = self.pending.len();
    }
}

/// Accumulates the driver's stderr as raw chunks.
///
/// Stderr is opaque text: no line framing is assumed, chunks are kept in
/// arrival order, and the accumulator only grows. Concatenation for
/// reporting happens after the run ends.
pub struct StderrCollector {
    stderr: ChildStderr,
    buf: Vec<u8>,
    chunks: Vec<Vec<u8>>,
}

impl StderrCollector {
    /// Create a new collector from a child process stderr.
    pub fn new(stderr: ChildStderr) -> Self {
        Self {
            stderr,
            buf: vec![0u8; STDERR_CHUNK_SIZE],
            chunks: Vec::new(),
        }
    }

    /// Read one chunk from stderr, appending it to the accumulator.
    ///
    /// Returns `Ok(false)` once end-of-stream is reached. Cancel-safe.
    pub async fn read_chunk(&mut self) -> Result<bool> {
        let n = self.stderr.read(&mut self.buf).await.map_err(Error::io)?;
        if n == 0 {
            return Ok(false);
        }
        self.chunks.push(self.buf[..n].to_vec());
        Ok(true)
    }

    /// The chunks collected so far, in arrival order.
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Consume the collector and return the accumulated chunks.
    pub fn into_chunks(self) -> Vec<Vec<u8>> {
        self.chunks
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use crate::process::DriverProcess;

    fn sh(script: &str) -> DriverProcess {
        let config = DriverConfig::builder("/bin/sh")
            .args(["-c", script])
            .build()
            .unwrap();
        DriverProcess::spawn(&config).unwrap()
    }

    #[tokio::test]
    async fn line_reader_returns_lines_then_eof() {
        let mut process = sh("printf 'one\\ntwo\\n'");
        let mut reader = StatusLineReader::new(process.take_stdout().unwrap());

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("one"));
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("two"));
        assert_eq!(reader.next_line().await.unwrap(), None);
        process.wait().await.unwrap();
    }

    #[tokio::test]
    async fn line_reader_yields_unterminated_tail() {
        let mut process = sh("printf 'tail-no-newline'");
        let mut reader = StatusLineReader::new(process.take_stdout().unwrap());

        assert_eq!(
            reader.next_line().await.unwrap().as_deref(),
            Some("tail-no-newline")
        );
        assert_eq!(reader.next_line().await.unwrap(), None);
        process.wait().await.unwrap();
    }

    #[tokio::test]
    async fn request_writer_chunks_and_closes() {
        let mut process = sh("wc -c");
        let payload = vec![b'x'; STDIN_WRITE_LIMIT * 3 + 17];
        let total = payload.len();
        let mut writer = RequestWriter::new(process.take_stdin().unwrap(), payload);
        let mut reader = StatusLineReader::new(process.take_stdout().unwrap());

        let mut writes = 0;
        while writer.has_pending() {
            writer.write_chunk().await.unwrap();
            writes += 1;
        }
        writer.close().await.unwrap();
        // A second close is a no-op
        writer.close().await.unwrap();

        assert!(writes >= 4, "payload should need multiple bounded writes");
        let counted = reader.next_line().await.unwrap().unwrap();
        assert_eq!(counted.trim(), total.to_string());
        process.wait().await.unwrap();
    }

    #[tokio::test]
    async fn stderr_collector_accumulates_chunks() {
        let mut process = sh("printf 'warning: low disk' 1>&2");
        let mut collector = StderrCollector::new(process.take_stderr().unwrap());

        while collector.read_chunk().await.unwrap() {}
        let chunks = collector.into_chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], b"warning: low disk");
        process.wait().await.unwrap();
    }
}
