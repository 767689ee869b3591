use std::process::Command;

use crate::error::Result;
use crate::runner::{CommandOutput, CommandRunner};

/// Runs commands through a POSIX shell.
///
/// The whole command string is handed to `sh -c`, so quoting inside the
/// string is interpreted exactly as a shell would.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        ShellRunner {
            shell: "sh".to_string(),
        }
    }

    /// Use a different shell binary (it must accept `-c <command>`)
    pub fn with_shell(shell: impl Into<String>) -> Self {
        ShellRunner {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellRunner {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        tracing::debug!(command, "running command");

        let output = Command::new(&self.shell).arg("-c").arg(command).output()?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
