use std::fmt;

/// Non-fatal conditions noticed while preparing a deploy.
/// These are reported to the user but never stop the workflow on their own.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployWarning {
    /// The target commit is already what the app runs
    NoNewCommits { app: String, commit: String },
    /// Tag message contains a single quote and will break the `git tag` command
    UnescapedQuote { message: String },
    /// The push will overwrite the remote branch
    ForcePush { app: String, remote_branch: String },
}

impl fmt::Display for DeployWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployWarning::NoNewCommits { app, commit } => {
                write!(f, "No new commits to deploy to '{}' (deployed: {})", app, commit)
            }
            DeployWarning::UnescapedQuote { message } => {
                write!(
                    f,
                    "Tag message contains a single quote and is passed to git unescaped: {}",
                    message
                )
            }
            DeployWarning::ForcePush { app, remote_branch } => {
                write!(
                    f,
                    "Force pushing will overwrite '{}' on the remote of '{}'",
                    remote_branch, app
                )
            }
        }
    }
}
