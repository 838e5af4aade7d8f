// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External command execution.
//
// Privileged OS commands (service stop/start, spool purge, host restart) and
// helper programs (`lp`, `pdftoppm`) are run through `CommandExecutor`, which
// reports an exit status and stderr instead of failing. Callers decide what a
// non-zero status means.

use std::fmt;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{PrintBridgeError, Result};

/// A program invocation: executable plus literal arguments (no shell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit status; -1 when the process could not be started or was
    /// killed by a signal.
    pub exit_code: i32,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Convert a non-zero exit into `PrintBridgeError::CommandFailure`.
    pub fn check(self, command: &CommandSpec) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(PrintBridgeError::CommandFailure {
                command: command.to_string(),
                exit_code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs external commands synchronously.
pub trait CommandExecutor: Send + Sync {
    /// Run `command` to completion and report its exit status.
    fn run(&self, command: &CommandSpec) -> CommandOutput;
}

/// Executor backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn run(&self, command: &CommandSpec) -> CommandOutput {
        debug!(command = %command, "running external command");

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) => {
                let result = CommandOutput {
                    exit_code: output.status.code().unwrap_or(-1),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                debug!(command = %command, exit_code = result.exit_code, "external command finished");
                result
            }
            Err(e) => {
                warn!(command = %command, error = %e, "failed to start external command");
                CommandOutput {
                    exit_code: -1,
                    stderr: format!("failed to start {}: {e}", command.program),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = CommandSpec::new("powershell.exe")
            .arg("-Command")
            .arg("Stop-Service -Name Spooler");
        assert_eq!(
            spec.to_string(),
            "powershell.exe -Command \"Stop-Service -Name Spooler\""
        );
    }

    #[test]
    fn non_zero_exit_becomes_command_failure() {
        let spec = CommandSpec::new("systemctl").args(["stop", "cups"]);
        let output = CommandOutput {
            exit_code: 5,
            stderr: "Access denied\n".into(),
        };
        match output.check(&spec).unwrap_err() {
            PrintBridgeError::CommandFailure {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "systemctl stop cups");
                assert_eq!(exit_code, 5);
                assert_eq!(stderr, "Access denied");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_reports_failure_instead_of_panicking() {
        let spec = CommandSpec::new("printbridge-definitely-not-a-real-program");
        let output = SystemExecutor.run(&spec);
        assert_eq!(output.exit_code, -1);
        assert!(output.stderr.contains("failed to start"));
    }

    #[cfg(unix)]
    #[test]
    fn captures_exit_status_and_stderr() {
        let spec = CommandSpec::new("sh").args(["-c", "echo oops >&2; exit 3"]);
        let output = SystemExecutor.run(&spec);
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stderr.trim(), "oops");
    }
}
