//! Per-request run statistics

use std::time::{Duration, Instant};

use solvanity_pattern::format_duration;

use crate::process::OutputStream;

/// Counters for one grind run
#[derive(Debug)]
pub struct RunStats {
    start_time: Instant,
    stdout_lines: u64,
    stderr_lines: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            stdout_lines: 0,
            stderr_lines: 0,
        }
    }

    pub fn record_line(&mut self, stream: OutputStream) {
        match stream {
            OutputStream::Stdout => self.stdout_lines += 1,
            OutputStream::Stderr => self.stderr_lines += 1,
        }
    }

    /// Lines relayed to the caller
    pub fn lines_relayed(&self) -> u64 {
        self.stdout_lines + self.stderr_lines
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn format(&self) -> String {
        format!(
            "[{} lines ({} stderr)][{}]",
            self.lines_relayed(),
            self.stderr_lines,
            format_duration(self.elapsed().as_secs_f64())
        )
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
