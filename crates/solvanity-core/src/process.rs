//! Supervision of the external `solana-keygen` process

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use solvanity_pattern::Invocation;
use tokio::io::{AsyncBufReadExt, BufReader, Split};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, warn};

use crate::error::GrindError;

/// How to start an external tool: a program plus arguments placed before
/// the per-request ones (useful for wrappers such as `nice` or `docker run`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }
}

/// Which pipe a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of tool output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub stream: OutputStream,
    pub text: String,
}

/// What the supervisor observed, in arrival order
#[derive(Debug)]
pub enum ProcessEvent {
    Line(LogLine),
    Completed(ExitStatus),
    Failed(String),
}

enum Read {
    Stdout(std::io::Result<Option<Vec<u8>>>),
    Stderr(std::io::Result<Option<Vec<u8>>>),
    Closed,
}

/// Lines are split on raw bytes so invalid UTF-8 only mangles its own line
fn decode_line(mut raw: Vec<u8>) -> String {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    match String::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// A running grinder owned by exactly one request.
///
/// Dropping it kills the child (`kill_on_drop`).
pub struct GrindProcess {
    child: Child,
    program: PathBuf,
    stdout: Split<BufReader<ChildStdout>>,
    stderr: Split<BufReader<ChildStderr>>,
    stdout_done: bool,
    stderr_done: bool,
    finished: bool,
    transcript: String,
}

impl GrindProcess {
    /// Start the tool inside `work_dir` with both output pipes captured
    pub fn spawn(
        tool: &ToolCommand,
        invocation: &Invocation,
        work_dir: &Path,
    ) -> Result<Self, GrindError> {
        let mut cmd = tool.command();
        cmd.args(invocation.args())
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let spawn_error = |source| GrindError::ProcessSpawn {
            program: tool.program.clone(),
            source,
        };

        let mut child = cmd.spawn().map_err(spawn_error)?;

        let stdout = child.stdout.take().ok_or_else(|| {
            spawn_error(std::io::Error::new(std::io::ErrorKind::Other, "stdout not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            spawn_error(std::io::Error::new(std::io::ErrorKind::Other, "stderr not captured"))
        })?;

        debug!(
            "Spawned {} (pid {})",
            tool.program.display(),
            child.id().unwrap_or(0)
        );

        Ok(Self {
            child,
            program: tool.program.clone(),
            stdout: BufReader::new(stdout).split(b'\n'),
            stderr: BufReader::new(stderr).split(b'\n'),
            stdout_done: false,
            stderr_done: false,
            finished: false,
            transcript: String::new(),
        })
    }

    /// Next line or the terminal event; `None` once the terminal event was returned.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        if self.finished {
            return None;
        }

        loop {
            let read = tokio::select! {
                line = self.stdout.next_segment(), if !self.stdout_done => Read::Stdout(line),
                line = self.stderr.next_segment(), if !self.stderr_done => Read::Stderr(line),
                else => Read::Closed,
            };

            match read {
                Read::Stdout(Ok(Some(raw))) => {
                    let text = decode_line(raw);
                    self.transcript.push_str(&text);
                    self.transcript.push('\n');
                    return Some(ProcessEvent::Line(LogLine {
                        stream: OutputStream::Stdout,
                        text,
                    }));
                }
                Read::Stderr(Ok(Some(raw))) => {
                    let text = decode_line(raw);
                    return Some(ProcessEvent::Line(LogLine {
                        stream: OutputStream::Stderr,
                        text,
                    }));
                }
                Read::Stdout(Ok(None)) => self.stdout_done = true,
                Read::Stderr(Ok(None)) => self.stderr_done = true,
                Read::Stdout(Err(e)) => {
                    warn!("Reading stdout of {} failed: {}", self.program.display(), e);
                    self.stdout_done = true;
                }
                Read::Stderr(Err(e)) => {
                    warn!("Reading stderr of {} failed: {}", self.program.display(), e);
                    self.stderr_done = true;
                }
                Read::Closed => {
                    let event = self.reap().await;
                    self.finished = true;
                    return Some(event);
                }
            }
        }
    }

    async fn reap(&mut self) -> ProcessEvent {
        match self.child.wait().await {
            Ok(status) if status.success() => ProcessEvent::Completed(status),
            Ok(status) => ProcessEvent::Failed(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )),
            Err(e) => ProcessEvent::Failed(format!(
                "Failed to wait for {}: {}",
                self.program.display(),
                e
            )),
        }
    }

    /// Terminate and reap the child
    pub async fn kill(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill {}: {}", self.program.display(), e);
        }
    }

    /// Everything the tool has written to stdout so far
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

/// Run `<tool> --version` and return its trimmed stdout
pub async fn tool_version(tool: &ToolCommand) -> Result<String, GrindError> {
    let output = tool
        .command()
        .arg("--version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| GrindError::ProcessSpawn {
            program: tool.program.clone(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        warn!("{} --version wrote to stderr: {}", tool.program.display(), stderr.trim());
    }

    if !output.status.success() {
        return Err(GrindError::ProcessNonZeroExit(format!(
            "{} exited with {}",
            tool.program.display(),
            output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
