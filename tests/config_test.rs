// tests/config_test.rs
use heroku_tools::config::{load_config, Config};
use heroku_tools::HerokuToolsError;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const ENV_VARS: &[&str] = &["HEROKU_TOOLS_WORK_DIR", "HEROKU_API_TOKEN", "VISUAL", "EDITOR"];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_env();
    let temp_file = config_file(
        r#"
git_work_dir = "/srv/website"
heroku_api_token = "file-token"
editor = "vim"

[deploy]
tag_format = "{app}-{timestamp}"
migrate_command = "python manage.py migrate"
migration_paths = ["migrations/", "schema/"]
"#,
    );

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.git_work_dir, PathBuf::from("/srv/website"));
    assert_eq!(config.git_dir(), PathBuf::from("/srv/website/.git"));
    assert_eq!(config.api_token().unwrap(), "file-token");
    assert_eq!(config.editor.as_deref(), Some("vim"));
    assert_eq!(config.deploy.tag_format, "{app}-{timestamp}");
    assert_eq!(config.deploy.migration_paths.len(), 2);
    assert_eq!(config.deploy.remote_branch, "master");
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let temp_file = config_file(
        r#"
git_work_dir = "/srv/website"
heroku_api_token = "file-token"
"#,
    );
    env::set_var("HEROKU_API_TOKEN", "env-token");
    env::set_var("HEROKU_TOOLS_WORK_DIR", "/tmp/checkout");

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    clear_env();

    assert_eq!(config.api_token().unwrap(), "env-token");
    assert_eq!(config.git_work_dir, PathBuf::from("/tmp/checkout"));
}

#[test]
#[serial]
fn test_editor_falls_back_to_visual_then_editor() {
    clear_env();
    env::set_var("EDITOR", "nano");

    let mut config = Config::default();
    config.apply_env_overrides();
    assert_eq!(config.editor.as_deref(), Some("nano"));

    env::set_var("VISUAL", "code --wait");
    let mut config = Config::default();
    config.apply_env_overrides();
    assert_eq!(config.editor.as_deref(), Some("code --wait"));

    clear_env();
}

#[test]
#[serial]
fn test_file_editor_beats_environment() {
    clear_env();
    env::set_var("EDITOR", "nano");

    let mut config = Config {
        editor: Some("vim".to_string()),
        ..Config::default()
    };
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.editor.as_deref(), Some("vim"));
}

#[test]
#[serial]
fn test_missing_file_is_config_error() {
    clear_env();
    let result = load_config(Some("/nonexistent/heroku-tools.toml"));
    assert!(matches!(result, Err(HerokuToolsError::Config(_))));
}

#[test]
#[serial]
fn test_invalid_toml_is_config_error() {
    clear_env();
    let temp_file = config_file("git_work_dir = [not toml");
    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    assert!(matches!(result, Err(HerokuToolsError::Config(_))));
}
