use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HerokuToolsError, Result};

/// File name searched for in the current directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "heroku-tools.toml";

/// Represents the complete configuration for heroku-tools.
///
/// Loaded once at startup and handed to each facade by reference.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Working tree of the repository that gets deployed
    #[serde(default = "default_work_dir")]
    pub git_work_dir: PathBuf,

    /// Heroku Platform API token, used as the basic auth password
    #[serde(default)]
    pub heroku_api_token: Option<String>,

    /// Editor used when git has no `core.editor`
    #[serde(default)]
    pub editor: Option<String>,

    #[serde(default)]
    pub deploy: DeployConfig,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_tag_format() -> String {
    "deploy-{app}-{timestamp}".to_string()
}

fn default_tag_message() -> String {
    "Deployed to {app}".to_string()
}

fn default_remote_branch() -> String {
    "master".to_string()
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations/".to_string()]
}

/// Settings for the deploy workflow.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeployConfig {
    /// Tag name pattern; `{app}` and `{timestamp}` are substituted
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    /// Tag message pattern; `{app}` is substituted
    #[serde(default = "default_tag_message")]
    pub tag_message: String,

    /// Branch on the Heroku remote that receives the push
    #[serde(default = "default_remote_branch")]
    pub remote_branch: String,

    /// Command run through `heroku run` when migrations changed
    #[serde(default)]
    pub migrate_command: Option<String>,

    /// Path fragments that mark a changed file as a migration
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            tag_format: default_tag_format(),
            tag_message: default_tag_message(),
            remote_branch: default_remote_branch(),
            migrate_command: None,
            migration_paths: default_migration_paths(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            git_work_dir: default_work_dir(),
            heroku_api_token: None,
            editor: None,
            deploy: DeployConfig::default(),
        }
    }
}

impl Config {
    /// Builds a configuration for the given working tree with everything else defaulted.
    pub fn for_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Config {
            git_work_dir: work_dir.into(),
            ..Config::default()
        }
    }

    /// The `.git` metadata directory inside the working tree.
    pub fn git_dir(&self) -> PathBuf {
        self.git_work_dir.join(".git")
    }

    /// Returns the API token or a configuration error if none is set.
    pub fn api_token(&self) -> Result<&str> {
        match self.heroku_api_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(HerokuToolsError::config(
                "heroku_api_token is not configured (set it in heroku-tools.toml or $HEROKU_API_TOKEN)",
            )),
        }
    }

    /// Applies environment overrides on top of file values.
    ///
    /// `HEROKU_TOOLS_WORK_DIR` and `HEROKU_API_TOKEN` replace the file values;
    /// the editor only falls back to `$VISUAL` then `$EDITOR` when unset.
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = non_empty_var("HEROKU_TOOLS_WORK_DIR") {
            self.git_work_dir = PathBuf::from(dir);
        }
        if let Some(token) = non_empty_var("HEROKU_API_TOKEN") {
            self.heroku_api_token = Some(token);
        }
        if self.editor.as_deref().map_or(true, |e| e.trim().is_empty()) {
            self.editor = non_empty_var("VISUAL").or_else(|| non_empty_var("EDITOR"));
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `heroku-tools.toml` in current directory
/// 3. `heroku-tools.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// Environment overrides are applied to whichever source was used.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let source = if let Some(path) = config_path {
        Some(PathBuf::from(path))
    } else if local.exists() {
        Some(local)
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    };

    let mut config = match source {
        Some(path) => parse_config_file(&path)?,
        None => Config::default(),
    };
    config.apply_env_overrides();

    tracing::debug!(work_dir = %config.git_work_dir.display(), "configuration loaded");
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(|e| {
        HerokuToolsError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&contents)
        .map_err(|e| HerokuToolsError::config(format!("cannot parse {}: {}", path.display(), e)))
}
