//! External tool invocation
//!
//! Every heavy lifting step (lens correction, lossless rotation, alignment,
//! metadata edits, spatial encoding) is delegated to a separate program.
//! [`ExternalTool`] runs one with a fixed argument vector and turns the
//! outcome into data; a non-zero exit is never an `Err` at this level.

pub mod aligner;
pub mod encoder;
pub mod exiftool;
pub mod ffmpeg;
pub mod jpegtran;

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// Classified result of running an external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Exit status 0
    Success { stdout: String },
    /// Non-zero exit, killed by a signal, or failed to spawn for a reason
    /// other than a missing executable
    Failure {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The executable couldn't be found
    NotFound,
}

impl ToolOutcome {
    /// Convert into a per-file result for callers that treat failure as an error
    pub fn into_result(self, tool: &str) -> Result<String> {
        match self {
            ToolOutcome::Success { stdout } => Ok(stdout),
            ToolOutcome::Failure {
                code,
                stdout,
                stderr,
            } => {
                let status = code
                    .map(|c| format!("exit code {}", c))
                    .unwrap_or_else(|| "no exit code".to_string());
                let message = if stderr.trim().is_empty() {
                    stdout.trim().to_string()
                } else {
                    stderr.trim().to_string()
                };
                Err(Error::ToolFailed {
                    tool: tool.to_string(),
                    status,
                    message,
                })
            }
            ToolOutcome::NotFound => Err(Error::ToolNotFound {
                tool: tool.to_string(),
            }),
        }
    }
}

/// A named external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    program: OsString,
}

impl ExternalTool {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program name for messages
    pub fn name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Run the program to completion and classify the outcome
    ///
    /// Blocks until the child exits; there is no timeout.
    pub fn invoke<I, S>(&self, args: I) -> ToolOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        debug!(
            tool = %self.name(),
            args = ?args,
            "Running external tool"
        );

        let output = match Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(tool = %self.name(), "External tool not found");
                return ToolOutcome::NotFound;
            }
            Err(e) => {
                return ToolOutcome::Failure {
                    code: None,
                    stdout: String::new(),
                    stderr: format!("Failed to execute {}: {}", self.name(), e),
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!(tool = %self.name(), %stdout, %stderr, "External tool output");

        if output.status.success() {
            ToolOutcome::Success { stdout }
        } else {
            ToolOutcome::Failure {
                code: output.status.code(),
                stdout,
                stderr,
            }
        }
    }

    /// Run and convert the outcome with [`ToolOutcome::into_result`]
    pub fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.invoke(args).into_result(&self.name())
    }
}
