//! Running tool commands.
//!
//! [`CommandRunner`] is the seam between planning and execution: run one
//! command, let its output through, report how it exited. [`ProcessRunner`]
//! spawns real processes; tests substitute a recording fake.

use std::collections::VecDeque;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result, ToolCommand};

/// Number of stderr lines kept for error reports.
const TAIL_LINES: usize = 20;

/// How a tool invocation ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// The last lines the tool wrote to stderr.
    pub stderr_tail: Vec<String>,
}

impl ToolOutput {
    /// Output of a process that exited with status 0.
    pub fn success() -> Self {
        Self {
            code: Some(0),
            stderr_tail: Vec::new(),
        }
    }

    /// Whether the process exited with status 0.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// The stderr tail joined into one message, or a placeholder when empty.
    pub fn error_message(&self) -> String {
        if self.stderr_tail.is_empty() {
            "no error output".to_string()
        } else {
            self.stderr_tail.join("\n")
        }
    }
}

/// Runs a [`ToolCommand`] to completion.
///
/// Implementations return `Err` only when the command could not be run at
/// all (spawn failure, I/O failure, cancellation). A command that ran and
/// exited non-zero is reported through [`ToolOutput::code`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// Runs commands as child processes.
///
/// The child's stderr is forwarded to ours as it arrives so the encoder's own
/// progress output stays visible. Cancelling the token kills the child and
/// makes [`run`](CommandRunner::run) return [`Error::Interrupted`].
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    cancel: CancellationToken,
    forward_stderr: bool,
}

impl ProcessRunner {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            forward_stderr: true,
        }
    }

    /// Capture stderr without echoing it.
    #[cfg(test)]
    fn quiet(mut self) -> Self {
        self.forward_stderr = false;
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        if self.cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }

        let name = command.program_name();
        tracing::debug!("Running: {}", command);

        let mut child = Command::new(command.program())
            .args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("child stderr was not captured"))?;
        let pump = tokio::spawn(pump_stderr(stderr, self.forward_stderr));

        let status = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::warn!("Interrupted, stopping {}", name);
                child.kill().await?;
                pump.abort();
                return Err(Error::Interrupted);
            }
            status = child.wait() => status?,
        };

        let stderr_tail = pump.await.map_err(std::io::Error::other)??;

        // A terminal Ctrl+C reaches the child too; it may exit before our own
        // handler has run. Give the handler a turn before blaming the tool.
        if !status.success() {
            tokio::task::yield_now().await;
            if self.cancel.is_cancelled() {
                return Err(Error::Interrupted);
            }
        }

        tracing::debug!("{} exited with {}", name, status);

        Ok(ToolOutput {
            code: status.code(),
            stderr_tail,
        })
    }
}

/// Copy the child's stderr through and return its last lines.
async fn pump_stderr<R>(mut stderr: R, forward: bool) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut tail = StderrTail::new(TAIL_LINES);
    let mut out = tokio::io::stderr();
    let mut buf = [0u8; 4096];

    loop {
        let n = stderr.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if forward {
            out.write_all(&buf[..n]).await?;
            out.flush().await?;
        }
        tail.push(&buf[..n]);
    }

    Ok(tail.finish())
}

/// Keeps the last `capacity` non-empty lines of a byte stream.
///
/// ffmpeg redraws its progress line with `\r`, so both `\r` and `\n` end a
/// line.
#[derive(Debug)]
struct StderrTail {
    capacity: usize,
    lines: VecDeque<String>,
    partial: Vec<u8>,
}

impl StderrTail {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
            partial: Vec::new(),
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                self.end_line();
            } else {
                self.partial.push(byte);
            }
        }
    }

    fn end_line(&mut self) {
        let line = String::from_utf8_lossy(&self.partial).trim().to_string();
        self.partial.clear();
        if line.is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn finish(mut self) -> Vec<String> {
        self.end_line();
        self.lines.into()
    }
}
