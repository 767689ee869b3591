//! External process execution
//!
//! Everything heroku-tools does to git or the Heroku toolbelt goes through the
//! [CommandRunner] trait, which takes a complete shell command string and runs
//! it synchronously.
//!
//! - [shell::ShellRunner]: spawns the command through `sh -c`
//! - [mock::MockRunner]: scripted outputs for testing
//!
//! There is no timeout and no retry. A command that never exits blocks the
//! caller indefinitely.

pub mod mock;
pub mod shell;

pub use mock::MockRunner;
pub use shell::ShellRunner;

use crate::error::{HerokuToolsError, Result};

/// Exit status and captured output of one process execution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A zero-status output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed output with the given status and stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs shell command strings.
///
/// Implementors only provide [CommandRunner::execute]; [CommandRunner::run]
/// turns a non-zero exit status into [HerokuToolsError::Command].
pub trait CommandRunner: Send + Sync {
    /// Execute `command` and capture its output.
    ///
    /// Fails only when the process cannot be started at all. A non-zero exit
    /// status is reported through [CommandOutput::status].
    fn execute(&self, command: &str) -> Result<CommandOutput>;

    /// Execute `command` and return its stdout.
    ///
    /// # Returns
    /// * `Ok(String)` - Raw stdout when the exit status is zero, regardless of stderr
    /// * `Err(HerokuToolsError::Command)` - Carrying the command and captured stderr otherwise
    fn run(&self, command: &str) -> Result<String> {
        let output = self.execute(command)?;
        if !output.success() {
            tracing::warn!(command, status = output.status, "command failed");
            return Err(HerokuToolsError::command(
                command,
                output.status,
                output.stderr,
            ));
        }
        Ok(output.stdout)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        (**self).execute(command)
    }
}
