use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::runner::{CommandOutput, CommandRunner};

/// Mock runner for testing without spawning processes
///
/// Outputs are scripted per full command string. Commands without a script
/// succeed with empty output. Every command is recorded in issue order.
pub struct MockRunner {
    outputs: HashMap<String, CommandOutput>,
    history: Mutex<Vec<String>>,
}

impl MockRunner {
    /// Create a new mock runner with no scripted outputs
    pub fn new() -> Self {
        MockRunner {
            outputs: HashMap::new(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Script the output of a command
    pub fn with_output(mut self, command: impl Into<String>, output: CommandOutput) -> Self {
        self.outputs.insert(command.into(), output);
        self
    }

    /// Script a successful command returning `stdout`
    pub fn with_stdout(self, command: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.with_output(command, CommandOutput::ok(stdout))
    }

    /// Every command executed so far, oldest first
    pub fn commands(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        if let Ok(mut history) = self.history.lock() {
            history.push(command.to_string());
        }
        Ok(self.outputs.get(command).cloned().unwrap_or_default())
    }
}
