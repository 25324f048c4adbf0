//! Process spawning and lifecycle management.

use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

use crate::config::DriverConfig;
use crate::{Error, Result};

/// A running driver process.
///
/// This struct owns the lifecycle of a single driver invocation: the child
/// process plus its three pipes. No other code may hold or reuse the pipe
/// handles; each is taken exactly once by the run loop.
///
/// # Cancellation
///
/// Dropping a `DriverProcess` will kill the subprocess if it's still running.
pub struct DriverProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl DriverProcess {
    /// Spawn a new driver process with all three streams piped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DriverNotFound`] if the executable does not exist,
    /// or [`Error::ProcessSpawn`] for any other launch failure. Spawn
    /// failures are fatal and leave no partial state behind.
    pub fn spawn(config: &DriverConfig) -> Result<Self> {
        let mut cmd = build_command(config);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::DriverNotFound {
                    searched: config.driver().display().to_string(),
                }
            } else {
                Error::ProcessSpawn(e)
            }
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        Ok(Self {
            child,
            stdin,
            stdout,
            stderr,
        })
    }

    /// Take the stdin handle. Can only be taken once.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.stdin.take()
    }

    /// Take the stdout handle. Can only be taken once.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Take the stderr handle. Can only be taken once.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Get the process ID of the running driver.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Check whether the process has exited, without blocking.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        self.child.try_wait().map_err(Error::io)
    }

    /// Wait for the process to exit and return its exit status.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        self.child.wait().await.map_err(Error::io)
    }

    /// Kill the process and wait for it to be reaped.
    pub async fn kill(&mut self) -> Result<()> {
        self.child.kill().await.map_err(Error::io)
    }

    /// Request the process be killed without waiting.
    pub fn start_kill(&mut self) -> Result<()> {
        self.child.start_kill().map_err(Error::io)
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        // Try to kill the process if it's still running
        let _ = self.start_kill();
    }
}

/// Build a tokio Command from the config.
fn build_command(config: &DriverConfig) -> Command {
    let mut cmd = Command::new(config.driver());

    if let Some(dir) = config.working_directory() {
        cmd.current_dir(dir);
    }

    if !config.inherit_env {
        cmd.env_clear();
    }

    for (key, value) in &config.env_vars {
        cmd.env(key, value);
    }

    cmd.args(config.args());
    cmd
}
