// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Renders command results in normal, quiet (CI), and JSON modes.

use crate::exec::CommandResult;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Only command output, for scripts and CI
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a warning (suppressed in json mode).
    pub fn warning(&self, message: &str) {
        if self.mode != OutputMode::Json {
            eprintln!("Warning: {message}");
        }
    }

    /// Print a command result: stdout as-is, stderr as an error banner.
    pub fn result(&self, result: &CommandResult) {
        let stdout = io::stdout();
        let stderr = io::stderr();
        if let Err(e) = self.write_result(result, &mut stdout.lock(), &mut stderr.lock()) {
            // Usually a closed pipe on the reading side.
            tracing::debug!("failed to write command result: {}", e);
        }
    }

    fn write_result(
        &self,
        result: &CommandResult,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        match self.mode {
            OutputMode::Normal => {
                if !result.stdout.is_empty() {
                    writeln!(out, "{}", result.stdout)?;
                }
                if !result.stderr.is_empty() {
                    match result.failure {
                        Some(kind) => writeln!(err, "Error ({kind}): {}", result.stderr)?,
                        None => writeln!(err, "{}", result.stderr)?,
                    }
                }
                if result.failure.is_none() && !result.succeeded() {
                    match result.exit_code {
                        Some(code) => writeln!(err, "Exited with status {code}")?,
                        None => writeln!(err, "Terminated by signal")?,
                    }
                } else if result.succeeded() && self.start_time.is_some() {
                    writeln!(out, "Done ({:.1}s)", self.elapsed_secs())?;
                }
            }
            OutputMode::Quiet => {
                if !result.stdout.is_empty() {
                    writeln!(out, "{}", result.stdout)?;
                }
                if !result.stderr.is_empty() {
                    writeln!(err, "{}", result.stderr)?;
                }
            }
            OutputMode::Json => {
                let event = JsonResult {
                    event: if result.succeeded() { "success" } else { "failure" },
                    result,
                    duration_secs: self.duration_secs(),
                };
                writeln!(out, "{}", serde_json::to_string(&event)?)?;
            }
        }
        Ok(())
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    event: &'a str,
    #[serde(flatten)]
    result: &'a CommandResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::FailureKind;

    fn render(mode: OutputMode, result: &CommandResult) -> (String, String) {
        let output = Output::new(mode);
        let mut out = Vec::new();
        let mut err = Vec::new();
        output.write_result(result, &mut out, &mut err).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn normal_mode_separates_streams() {
        let result = CommandResult::completed(Some(0), "hello\n", "");
        let (out, err) = render(OutputMode::Normal, &result);
        assert_eq!(out, "hello\n");
        assert!(err.is_empty());
    }

    #[test]
    fn normal_mode_shows_failure_banner() {
        let result = CommandResult::failed(FailureKind::Timeout, "command timed out after 1s");
        let (out, err) = render(OutputMode::Normal, &result);
        assert!(out.is_empty());
        assert_eq!(err, "Error (timeout): command timed out after 1s\n");
    }

    #[test]
    fn normal_mode_reports_nonzero_exit() {
        let result = CommandResult::completed(Some(2), "partial", "boom");
        let (out, err) = render(OutputMode::Normal, &result);
        assert_eq!(out, "partial\n");
        assert!(err.contains("boom"));
        assert!(err.contains("Exited with status 2"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_reported() {
        let result = CommandResult::completed(Some(0), "hello", "");
        let output = Output::new(OutputMode::Quiet);
        let err = output
            .write_result(&result, &mut ClosedPipe, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn json_mode_emits_one_line() {
        let result = CommandResult::failed(FailureKind::NotFound, "kubectl: command not found");
        let (out, err) = render(OutputMode::Json, &result);
        assert!(err.is_empty());
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["event"], "failure");
        assert_eq!(value["failure"], "not_found");
        assert_eq!(value["stdout"], "");
        assert!(value.get("duration_secs").is_none());
    }
}
