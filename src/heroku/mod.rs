//! Heroku facade
//!
//! Two independent halves:
//!
//! - [HerokuCli]: Heroku toolbelt commands scoped to an app, run through a
//!   [CommandRunner]
//! - [HerokuApi]: single authenticated GET calls against the Platform API,
//!   plus the [Release] view over the JSON it returns

pub mod api;
pub mod mock;
pub mod release;

pub use api::{ApiTransport, Endpoint, HerokuApi, HttpTransport, HEROKU_API_URL};
pub use mock::MockTransport;
pub use release::{Release, INVALID_COMMIT};

use crate::error::Result;
use crate::runner::CommandRunner;

/// Heroku toolbelt commands
pub struct HerokuCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> HerokuCli<R> {
    pub fn new(runner: R) -> Self {
        HerokuCli { runner }
    }

    /// Full command line for a toolbelt subcommand against `app`.
    pub fn command(&self, app: &str, subcommand: &str) -> String {
        format!("heroku {} --app {}", subcommand, app)
    }

    /// Run a toolbelt subcommand and return its output.
    pub fn run_cmd(&self, app: &str, subcommand: &str) -> Result<String> {
        self.runner.run(&self.command(app, subcommand))
    }

    /// Run a one-off command on an app dyno (`heroku run`).
    pub fn run_command(&self, app: &str, command: &str) -> Result<String> {
        self.run_cmd(app, &format!("run {}", command))
    }

    /// Switch maintenance mode on or off.
    pub fn toggle_maintenance(&self, app: &str, maintenance_on: bool) -> Result<String> {
        let on_off = if maintenance_on { "on" } else { "off" };
        tracing::info!(app, maintenance = on_off, "toggling maintenance mode");
        self.run_cmd(app, &format!("maintenance:{}", on_off))
    }

    /// Promote the app to the next stage of its pipeline.
    pub fn promote_app(&self, app: &str) -> Result<String> {
        self.run_cmd(app, "pipeline:promote")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HerokuToolsError;
    use crate::runner::{CommandOutput, MockRunner};

    #[test]
    fn test_run_command() {
        let runner = MockRunner::new().with_stdout(
            "heroku run python manage.py migrate --app my-app",
            "Running migrations\n",
        );
        let heroku = HerokuCli::new(&runner);

        let out = heroku
            .run_command("my-app", "python manage.py migrate")
            .unwrap();
        assert_eq!(out, "Running migrations\n");
    }

    #[test]
    fn test_toggle_maintenance() {
        let runner = MockRunner::new();
        let heroku = HerokuCli::new(&runner);

        heroku.toggle_maintenance("my-app", true).unwrap();
        heroku.toggle_maintenance("my-app", false).unwrap();

        assert_eq!(
            runner.commands(),
            vec![
                "heroku maintenance:on --app my-app".to_string(),
                "heroku maintenance:off --app my-app".to_string(),
            ]
        );
    }

    #[test]
    fn test_promote_app() {
        let runner = MockRunner::new();
        let heroku = HerokuCli::new(&runner);

        heroku.promote_app("my-app-staging").unwrap();

        assert_eq!(
            runner.commands(),
            vec!["heroku pipeline:promote --app my-app-staging".to_string()]
        );
    }

    #[test]
    fn test_failed_toolbelt_command() {
        let runner = MockRunner::new().with_output(
            "heroku pipeline:promote --app lonely",
            CommandOutput::failed(1, "app is not part of any pipeline"),
        );
        let heroku = HerokuCli::new(&runner);

        match heroku.promote_app("lonely") {
            Err(HerokuToolsError::Command {
                command, stderr, ..
            }) => {
                assert_eq!(command, "heroku pipeline:promote --app lonely");
                assert!(stderr.contains("not part of any pipeline"));
            }
            other => panic!("expected command error, got {:?}", other),
        }
    }
}
