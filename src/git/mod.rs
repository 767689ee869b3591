//! Git facade
//!
//! Wraps the git CLI through a [CommandRunner]. Every command is prefixed with
//! explicit `--git-dir` and `--work-tree` flags taken from [Config], so the
//! tool targets the configured repository no matter where it is run from.
//!
//! ```rust
//! # use heroku_tools::config::Config;
//! # use heroku_tools::git::Git;
//! # use heroku_tools::runner::MockRunner;
//! let config = Config::for_work_dir("/srv/site");
//! let runner = MockRunner::new();
//! let git = Git::new(&config, &runner);
//! assert_eq!(
//!     git.command("status"),
//!     "git --git-dir=/srv/site/.git --work-tree=/srv/site status"
//! );
//! ```

pub mod parse;

pub use parse::{parse_commit_log, parse_file_list, short_hash};

use crate::config::Config;
use crate::error::{HerokuToolsError, Result};
use crate::runner::CommandRunner;

/// Branch on the remote that receives pushes unless told otherwise
pub const DEFAULT_REMOTE_BRANCH: &str = "master";

/// One line of `git log --oneline`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLogEntry {
    /// Abbreviated (7 character) hash
    pub hash: String,
    /// First line of the commit message
    pub message: String,
}

impl CommitLogEntry {
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        CommitLogEntry {
            hash: hash.into(),
            message: message.into(),
        }
    }
}

/// Git remote address of a Heroku application
pub fn remote_url(app_name: &str) -> String {
    format!("git@heroku.com:{}.git", app_name)
}

/// Git commands against the configured repository
pub struct Git<'a, R: CommandRunner> {
    config: &'a Config,
    runner: R,
}

impl<'a, R: CommandRunner> Git<'a, R> {
    pub fn new(config: &'a Config, runner: R) -> Self {
        Git { config, runner }
    }

    /// Full command line for a git subcommand (without the `git ` prefix).
    pub fn command(&self, subcommand: &str) -> String {
        format!(
            "git --git-dir={} --work-tree={} {}",
            self.config.git_dir().display(),
            self.config.git_work_dir.display(),
            subcommand
        )
    }

    /// Run a git subcommand and return its stdout.
    ///
    /// # Arguments
    /// * `subcommand` - e.g. "status", "log --oneline"
    pub fn run_git_cmd(&self, subcommand: &str) -> Result<String> {
        self.runner.run(&self.command(subcommand))
    }

    /// Heroku git remote for an app; no I/O.
    pub fn remote_url(&self, app_name: &str) -> String {
        remote_url(app_name)
    }

    /// Editor to use for interactive messages.
    ///
    /// `core.editor` from git config wins over the configured editor. An unset
    /// git key (status 1, nothing on stderr) falls through to the config.
    ///
    /// # Returns
    /// * `Ok(String)` - The editor command
    /// * `Err(HerokuToolsError::NoEditorConfigured)` - If neither source has one
    pub fn editor(&self) -> Result<String> {
        let command = self.command("config --get core.editor");
        let output = self.runner.execute(&command)?;

        let from_git = if output.success() {
            Some(output.stdout.trim().to_string())
        } else if output.status == 1 && output.stderr.trim().is_empty() {
            None
        } else {
            return Err(HerokuToolsError::command(
                command,
                output.status,
                output.stderr,
            ));
        };

        from_git
            .filter(|editor| !editor.is_empty())
            .or_else(|| {
                self.config
                    .editor
                    .as_deref()
                    .map(str::trim)
                    .filter(|editor| !editor.is_empty())
                    .map(str::to_string)
            })
            .ok_or(HerokuToolsError::NoEditorConfigured)
    }

    /// Push `local_branch` to `remote_branch` on `remote`.
    pub fn push(
        &self,
        remote: &str,
        local_branch: &str,
        remote_branch: &str,
        force: bool,
    ) -> Result<()> {
        let mut subcommand = format!("push {} {}:{}", remote, local_branch, remote_branch);
        if force {
            subcommand.push_str(" -f");
        }
        tracing::info!(remote, local_branch, remote_branch, force, "pushing branch");
        self.run_git_cmd(&subcommand)?;
        Ok(())
    }

    /// Name of the checked-out branch.
    pub fn current_branch(&self) -> Result<String> {
        Ok(self
            .run_git_cmd("rev-parse --abbrev-ref HEAD")?
            .trim()
            .to_string())
    }

    /// Abbreviated hash of the latest commit on `branch`.
    pub fn branch_head(&self, branch: &str) -> Result<String> {
        let raw = self.run_git_cmd(&format!("rev-parse {}", branch))?;
        Ok(short_hash(&raw))
    }

    /// Non-merge commits in `from..to`, newest first.
    pub fn commits(&self, commit_from: &str, commit_to: &str) -> Result<Vec<CommitLogEntry>> {
        let raw = self.run_git_cmd(&format!(
            "log --oneline --no-merges {}..{}",
            commit_from, commit_to
        ))?;
        Ok(parse_commit_log(&raw))
    }

    /// Sorted names of files changed in `from..to`. No changes is an empty list.
    pub fn files(&self, commit_from: &str, commit_to: &str) -> Result<Vec<String>> {
        let raw = self.run_git_cmd(&format!(
            "diff --name-only {}..{}",
            commit_from, commit_to
        ))?;
        Ok(parse_file_list(&raw))
    }

    /// Create an annotated tag on `commit`.
    ///
    /// The message is wrapped in single quotes as-is. A message that itself
    /// contains a single quote breaks the shell command.
    pub fn apply_tag(&self, commit: &str, tag: &str, message: &str) -> Result<()> {
        self.run_git_cmd(&format!("tag -a {} -m '{}' {}", tag, message, commit))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, MockRunner};

    const PREFIX: &str = "git --git-dir=/srv/site/.git --work-tree=/srv/site ";

    fn config() -> Config {
        Config::for_work_dir("/srv/site")
    }

    fn cmd(subcommand: &str) -> String {
        format!("{}{}", PREFIX, subcommand)
    }

    #[test]
    fn test_remote_url() {
        assert_eq!(remote_url("my-app"), "git@heroku.com:my-app.git");
    }

    #[test]
    fn test_push_without_force() {
        let config = config();
        let runner = MockRunner::new();
        let git = Git::new(&config, &runner);

        git.push("heroku", "develop", DEFAULT_REMOTE_BRANCH, false)
            .unwrap();

        assert_eq!(runner.commands(), vec![cmd("push heroku develop:master")]);
    }

    #[test]
    fn test_push_with_force() {
        let config = config();
        let runner = MockRunner::new();
        let git = Git::new(&config, &runner);

        git.push("git@heroku.com:my-app.git", "main", "main", true)
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec![cmd("push git@heroku.com:my-app.git main:main -f")]
        );
    }

    #[test]
    fn test_current_branch_is_trimmed() {
        let config = config();
        let runner =
            MockRunner::new().with_stdout(cmd("rev-parse --abbrev-ref HEAD"), "feature/x\n");
        let git = Git::new(&config, &runner);

        assert_eq!(git.current_branch().unwrap(), "feature/x");
    }

    #[test]
    fn test_branch_head_is_abbreviated() {
        let config = config();
        let runner = MockRunner::new().with_stdout(
            cmd("rev-parse main"),
            "75c70c5e0b7f6b1a2c3d4e5f60718293a4b5c6d7\n",
        );
        let git = Git::new(&config, &runner);

        assert_eq!(git.branch_head("main").unwrap(), "75c70c5");
    }

    #[test]
    fn test_commits_range() {
        let config = config();
        let runner = MockRunner::new().with_stdout(
            cmd("log --oneline --no-merges abc1234..def5678"),
            "def5678 Second\nbcd2345 First\n",
        );
        let git = Git::new(&config, &runner);

        let commits = git.commits("abc1234", "def5678").unwrap();
        assert_eq!(
            commits,
            vec![
                CommitLogEntry::new("def5678", "Second"),
                CommitLogEntry::new("bcd2345", "First"),
            ]
        );
    }

    #[test]
    fn test_files_empty_diff() {
        let config = config();
        let runner = MockRunner::new();
        let git = Git::new(&config, &runner);

        assert!(git.files("abc1234", "abc1234").unwrap().is_empty());
        assert_eq!(
            runner.commands(),
            vec![cmd("diff --name-only abc1234..abc1234")]
        );
    }

    #[test]
    fn test_apply_tag_command() {
        let config = config();
        let runner = MockRunner::new();
        let git = Git::new(&config, &runner);

        git.apply_tag("75c70c5", "deploy-my-app", "Deployed to my-app")
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec![cmd("tag -a deploy-my-app -m 'Deployed to my-app' 75c70c5")]
        );
    }

    #[test]
    fn test_failed_git_command_propagates() {
        let config = config();
        let runner = MockRunner::new().with_output(
            cmd("rev-parse nope"),
            CommandOutput::failed(128, "fatal: ambiguous argument 'nope'"),
        );
        let git = Git::new(&config, &runner);

        let err = git.branch_head("nope").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(&cmd("rev-parse nope")));
        assert!(msg.contains("ambiguous argument"));
    }

    #[test]
    fn test_editor_prefers_git_config() {
        let config = Config {
            editor: Some("nano".to_string()),
            ..config()
        };
        let runner = MockRunner::new().with_stdout(cmd("config --get core.editor"), "vim\n");
        let git = Git::new(&config, &runner);

        assert_eq!(git.editor().unwrap(), "vim");
    }

    #[test]
    fn test_editor_falls_back_to_config() {
        let config = Config {
            editor: Some("nano".to_string()),
            ..config()
        };
        let runner = MockRunner::new()
            .with_output(cmd("config --get core.editor"), CommandOutput::failed(1, ""));
        let git = Git::new(&config, &runner);

        assert_eq!(git.editor().unwrap(), "nano");
    }

    #[test]
    fn test_editor_empty_git_value_falls_back() {
        let config = Config {
            editor: Some("emacs".to_string()),
            ..config()
        };
        let runner = MockRunner::new();
        let git = Git::new(&config, &runner);

        assert_eq!(git.editor().unwrap(), "emacs");
    }

    #[test]
    fn test_editor_missing_everywhere() {
        let config = config();
        let runner = MockRunner::new()
            .with_output(cmd("config --get core.editor"), CommandOutput::failed(1, ""));
        let git = Git::new(&config, &runner);

        assert!(matches!(
            git.editor(),
            Err(HerokuToolsError::NoEditorConfigured)
        ));
    }

    #[test]
    fn test_editor_real_git_failure_is_an_error() {
        let config = Config {
            editor: Some("nano".to_string()),
            ..config()
        };
        let runner = MockRunner::new().with_output(
            cmd("config --get core.editor"),
            CommandOutput::failed(128, "fatal: not a git repository"),
        );
        let git = Git::new(&config, &runner);

        assert!(matches!(
            git.editor(),
            Err(HerokuToolsError::Command { status: 128, .. })
        ));
    }
}
