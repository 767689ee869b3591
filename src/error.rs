use thiserror::Error;

/// Unified error type for heroku-tools operations
#[derive(Error, Debug)]
pub enum HerokuToolsError {
    #[error("Error running command '{command}': {stderr}")]
    Command {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Error calling Heroku API: {0}")]
    Api(String),

    #[error("No editor configured in git config, $EDITOR or $VISUAL")]
    NoEditorConfigured,

    #[error("No deployments found in API response for '{app}'")]
    NoDeploymentFound { app: String },

    #[error("Malformed release: {0}")]
    MalformedRelease(String),

    #[error("{source} (maintenance mode is still on; run `heroku maintenance:off --app {app}`)")]
    MaintenanceLeftOn {
        app: String,
        source: Box<HerokuToolsError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in heroku-tools
pub type Result<T> = std::result::Result<T, HerokuToolsError>;

impl HerokuToolsError {
    /// Create a command error from a failed process
    pub fn command(command: impl Into<String>, status: i32, stderr: impl Into<String>) -> Self {
        HerokuToolsError::Command {
            command: command.into(),
            status,
            stderr: stderr.into(),
        }
    }

    /// Create an API error with context
    pub fn api(msg: impl Into<String>) -> Self {
        HerokuToolsError::Api(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        HerokuToolsError::Config(msg.into())
    }

    /// Create a malformed release error naming the offending field
    pub fn malformed_release(msg: impl Into<String>) -> Self {
        HerokuToolsError::MalformedRelease(msg.into())
    }
}

impl HerokuToolsError {
    /// Wrap a failure that happened while `app` was in maintenance mode
    pub fn maintenance_left_on(app: impl Into<String>, source: HerokuToolsError) -> Self {
        HerokuToolsError::MaintenanceLeftOn {
            app: app.into(),
            source: Box::new(source),
        }
    }
}

impl From<reqwest::Error> for HerokuToolsError {
    fn from(err: reqwest::Error) -> Self {
        HerokuToolsError::Api(err.to_string())
    }
}
