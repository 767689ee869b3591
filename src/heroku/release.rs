use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt;

use crate::error::{HerokuToolsError, Result};
use crate::heroku::{ApiTransport, Endpoint, HerokuApi};

/// Commit value for releases whose description names no commit
pub const INVALID_COMMIT: &str = "invalid";

/// Range requested when looking for the latest deployment
pub const LATEST_RELEASES_RANGE: &str = "version;max=10,order=desc";

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A release as described by the Heroku release API.
///
/// Read-only view over the raw JSON object; every attribute is computed on
/// access. See <https://devcenter.heroku.com/articles/platform-api-reference#release>.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    raw: Value,
}

impl Release {
    pub fn from_json(raw: Value) -> Self {
        Release { raw }
    }

    /// Version number assigned by Heroku
    pub fn version(&self) -> Result<u64> {
        self.raw
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| HerokuToolsError::malformed_release("missing 'version'"))
    }

    /// Free-text description; empty when absent
    pub fn description(&self) -> &str {
        self.raw
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Hash of the commit deployed in this release.
    ///
    /// "Promote my-app v123 75c70c5" and "Deploy 75c70c5" both yield
    /// "75c70c5". Any other description, or one missing the expected token,
    /// yields [INVALID_COMMIT].
    pub fn commit(&self) -> &str {
        let description = self.description();
        let position = if description.starts_with("Promote") {
            3
        } else if description.starts_with("Deploy") {
            1
        } else {
            return INVALID_COMMIT;
        };
        description
            .split(' ')
            .nth(position)
            .filter(|token| !token.is_empty())
            .unwrap_or(INVALID_COMMIT)
    }

    /// The deployed commit, refusing releases whose description names none.
    pub fn deployed_commit(&self) -> Result<&str> {
        match self.commit() {
            INVALID_COMMIT => Err(HerokuToolsError::malformed_release(format!(
                "cannot find a commit in '{}'",
                self.description()
            ))),
            commit => Ok(commit),
        }
    }

    /// Whether the description's first word marks a code deployment
    pub fn is_deployment(&self) -> bool {
        matches!(
            self.description().split(' ').next(),
            Some("Promote") | Some("Deploy")
        )
    }

    /// Name of the application
    pub fn application(&self) -> Result<&str> {
        self.raw
            .pointer("/app/name")
            .and_then(Value::as_str)
            .ok_or_else(|| HerokuToolsError::malformed_release("missing 'app.name'"))
    }

    /// Email of the person responsible for the release
    pub fn deployed_by(&self) -> Result<&str> {
        self.raw
            .pointer("/user/email")
            .and_then(Value::as_str)
            .ok_or_else(|| HerokuToolsError::malformed_release("missing 'user.email'"))
    }

    /// When the deployment happened (`updated_at`)
    pub fn deployed_at(&self) -> Result<DateTime<Utc>> {
        let raw = self
            .raw
            .get("updated_at")
            .and_then(Value::as_str)
            .ok_or_else(|| HerokuToolsError::malformed_release("missing 'updated_at'"))?;
        parse_timestamp(raw).ok_or_else(|| {
            HerokuToolsError::malformed_release(format!("unparseable 'updated_at': {}", raw))
        })
    }

    /// Fetch the config vars of this release's application.
    pub fn config_vars<T: ApiTransport>(&self, api: &HerokuApi<T>) -> Result<Value> {
        api.call_api(Endpoint::ConfigVars, self.application()?, None)
    }

    /// Most recent code deployment of `app`.
    ///
    /// Looks at the latest ten releases, newest first, and returns the first
    /// one whose description starts with the word "Promote" or "Deploy".
    /// Other releases (rollbacks, config changes, add-ons) are skipped.
    ///
    /// # Returns
    /// * `Ok(Release)` - The latest deployment
    /// * `Err(HerokuToolsError::NoDeploymentFound)` - If none of the fetched releases is one
    /// * `Err(HerokuToolsError::Api)` - If the call fails or does not return a list
    pub fn latest_deployment<T: ApiTransport>(api: &HerokuApi<T>, app: &str) -> Result<Release> {
        let body = api.call_api(Endpoint::Releases, app, Some(LATEST_RELEASES_RANGE))?;
        let releases = match body {
            Value::Array(releases) => releases,
            other => {
                return Err(HerokuToolsError::api(format!(
                    "expected a list of releases, got: {}",
                    other
                )))
            }
        };

        for raw in releases {
            let release = Release::from_json(raw);
            if release.is_deployment() {
                tracing::debug!(app, commit = release.commit(), "found latest deployment");
                return Ok(release);
            }
            tracing::warn!(app, description = release.description(), "Ignoring release");
        }

        Err(HerokuToolsError::NoDeploymentFound {
            app: app.to_string(),
        })
    }
}

/// Parse an API timestamp. RFC 3339 first, then naive forms taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self
            .version()
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "?".to_string());
        let deployed_at = self
            .deployed_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|_| "unknown time".to_string());
        write!(
            f,
            "Release {} [{}] of {}, deployed by {} at {}",
            version,
            self.commit(),
            self.application().unwrap_or("unknown app"),
            self.deployed_by().unwrap_or("unknown"),
            deployed_at
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn release(description: &str) -> Release {
        Release::from_json(json!({
            "version": 123,
            "description": description,
            "app": {"name": "my-app"},
            "user": {"email": "dev@example.com"},
            "updated_at": "2015-06-02T14:30:05Z"
        }))
    }

    #[test]
    fn test_commit_from_promote() {
        assert_eq!(release("Promote my-app v123 75c70c5").commit(), "75c70c5");
    }

    #[test]
    fn test_commit_from_deploy() {
        assert_eq!(release("Deploy 75c70c5").commit(), "75c70c5");
    }

    #[test]
    fn test_commit_from_rollback_is_invalid() {
        assert_eq!(release("Rollback to v100").commit(), INVALID_COMMIT);
    }

    #[test]
    fn test_commit_with_missing_token_is_invalid() {
        assert_eq!(release("Deploy").commit(), INVALID_COMMIT);
        assert_eq!(release("Promote my-app").commit(), INVALID_COMMIT);
    }

    #[test]
    fn test_commit_without_description() {
        let release = Release::from_json(json!({"version": 1}));
        assert_eq!(release.description(), "");
        assert_eq!(release.commit(), INVALID_COMMIT);
    }

    #[test]
    fn test_deployed_commit_rejects_sentinel() {
        assert_eq!(release("Deploy 75c70c5").deployed_commit().unwrap(), "75c70c5");
        assert!(matches!(
            release("Deploy").deployed_commit(),
            Err(HerokuToolsError::MalformedRelease(_))
        ));
    }

    #[test]
    fn test_is_deployment_needs_exact_first_word() {
        assert!(release("Deploy abc1234").is_deployment());
        assert!(release("Promote a v1 abc1234").is_deployment());
        assert!(!release("Deployed abc1234").is_deployment());
        assert!(!release("Set DEBUG config vars").is_deployment());
    }

    #[test]
    fn test_accessors() {
        let release = release("Deploy 75c70c5");
        assert_eq!(release.version().unwrap(), 123);
        assert_eq!(release.application().unwrap(), "my-app");
        assert_eq!(release.deployed_by().unwrap(), "dev@example.com");

        let at = release.deployed_at().unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2015, 6, 2));
        assert_eq!((at.hour(), at.minute(), at.second()), (14, 30, 5));
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let release = Release::from_json(json!({"description": "Deploy abc1234"}));
        assert!(matches!(
            release.application(),
            Err(HerokuToolsError::MalformedRelease(_))
        ));
        assert!(release.version().is_err());
        assert!(release.deployed_by().is_err());
        assert!(release.deployed_at().is_err());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2015-06-02T14:30:05Z").is_some());
        assert!(parse_timestamp("2015-06-02T14:30:05+01:00").is_some());
        assert!(parse_timestamp("2015-06-02T14:30:05").is_some());
        assert!(parse_timestamp("2015-06-02 14:30:05.123").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_offset_timestamp_normalised_to_utc() {
        let at = parse_timestamp("2015-06-02T14:30:05+01:00").unwrap();
        assert_eq!(at.hour(), 13);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            release("Deploy 75c70c5").to_string(),
            "Release 123 [75c70c5] of my-app, deployed by dev@example.com at 2015-06-02 14:30:05 UTC"
        );
    }

    #[test]
    fn test_display_tolerates_missing_fields() {
        let release = Release::from_json(json!({"description": "Rollback to v3"}));
        assert_eq!(
            release.to_string(),
            "Release ? [invalid] of unknown app, deployed by unknown at unknown time"
        );
    }
}
