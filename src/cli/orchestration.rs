//! Deploy workflow orchestration
//!
//! Split in two so the binary can show the plan and ask for confirmation in
//! between:
//!
//! 1. [plan_deploy] reads the latest deployment and the git history
//! 2. [execute_deploy] toggles maintenance, pushes, migrates and tags

use chrono::{DateTime, Utc};

use crate::config::DeployConfig;
use crate::error::{HerokuToolsError, Result};
use crate::git::{self, CommitLogEntry, Git};
use crate::heroku::{ApiTransport, HerokuApi, HerokuCli, Release};
use crate::runner::CommandRunner;
use crate::warnings::DeployWarning;

/// Format of the `{timestamp}` tag placeholder
pub const TAG_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Arguments for the deploy workflow
///
/// Mirrors the CLI flags so the workflow can be called without clap.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployWorkflowArgs {
    /// Heroku application to deploy to
    pub app: String,

    /// Local branch to deploy; the checked-out branch when `None`
    pub branch: Option<String>,

    /// Remote branch to push to; `deploy.remote_branch` when `None`
    pub remote_branch: Option<String>,

    /// Overwrite the remote branch
    pub force_push: bool,
}

impl DeployWorkflowArgs {
    pub fn new(app: impl Into<String>) -> Self {
        DeployWorkflowArgs {
            app: app.into(),
            branch: None,
            remote_branch: None,
            force_push: false,
        }
    }

    fn remote_branch<'a>(&'a self, deploy: &'a DeployConfig) -> &'a str {
        self.remote_branch
            .as_deref()
            .unwrap_or(deploy.remote_branch.as_str())
    }
}

/// Everything known about a deploy before anything is changed
#[derive(Debug, Clone, PartialEq)]
pub struct DeployPlan {
    pub app: String,
    /// The release currently running
    pub release: Release,
    /// Abbreviated hash of the commit currently running
    pub deployed_commit: String,
    /// Local branch being deployed
    pub branch: String,
    /// Abbreviated hash of the branch head
    pub target_commit: String,
    /// Commits between deployed and target, newest first
    pub commits: Vec<CommitLogEntry>,
    /// Files changed between deployed and target, sorted
    pub files: Vec<String>,
    /// Changed files that are migrations; empty unless a migrate command is configured
    pub migrations: Vec<String>,
}

impl DeployPlan {
    pub fn has_new_commits(&self) -> bool {
        !self.commits.is_empty()
    }

    pub fn needs_migration(&self) -> bool {
        !self.migrations.is_empty()
    }
}

/// Result of a completed deploy
#[derive(Debug, Clone, PartialEq)]
pub struct DeployResult {
    pub app: String,
    /// The commit that was pushed and tagged
    pub commit: String,
    /// Tag applied to the deployed commit
    pub tag: String,
    /// Whether the migrate command ran
    pub migrated: bool,
}

/// Work out what a deploy of `args.app` would change.
///
/// # Returns
/// * `Ok(DeployPlan)` - Deployed and target commits with the history between them
/// * `Err(HerokuToolsError::MalformedRelease)` - If the latest deployment names no commit
/// * `Err` - Any git or API failure
pub fn plan_deploy<R, T>(
    git: &Git<'_, R>,
    api: &HerokuApi<T>,
    deploy: &DeployConfig,
    args: &DeployWorkflowArgs,
) -> Result<DeployPlan>
where
    R: CommandRunner,
    T: ApiTransport,
{
    let release = Release::latest_deployment(api, &args.app)?;
    let deployed_commit = release.deployed_commit()?.to_string();

    let branch = match &args.branch {
        Some(branch) => branch.clone(),
        None => git.current_branch()?,
    };
    let target_commit = git.branch_head(&branch)?;

    let commits = git.commits(&deployed_commit, &target_commit)?;
    let files = git.files(&deployed_commit, &target_commit)?;
    let migrations = if deploy.migrate_command.is_some() {
        find_migrations(&files, &deploy.migration_paths)
    } else {
        Vec::new()
    };

    tracing::info!(
        app = %args.app,
        from = %deployed_commit,
        to = %target_commit,
        commits = commits.len(),
        files = files.len(),
        "deploy planned"
    );

    Ok(DeployPlan {
        app: args.app.clone(),
        release,
        deployed_commit,
        branch,
        target_commit,
        commits,
        files,
        migrations,
    })
}

/// Carry out a planned deploy.
///
/// Order: maintenance on (when migrating), push, migrate and maintenance
/// off (when migrating), tag. The first failure stops the workflow; a failure
/// while maintenance is on is wrapped in [HerokuToolsError::MaintenanceLeftOn].
pub fn execute_deploy<G, H>(
    git: &Git<'_, G>,
    heroku: &HerokuCli<H>,
    deploy: &DeployConfig,
    plan: &DeployPlan,
    args: &DeployWorkflowArgs,
    tag_message: &str,
    now: DateTime<Utc>,
) -> Result<DeployResult>
where
    G: CommandRunner,
    H: CommandRunner,
{
    let migrate_command = deploy
        .migrate_command
        .as_deref()
        .filter(|_| plan.needs_migration());

    let maintenance = migrate_command.is_some();
    let left_on = |err: HerokuToolsError| {
        if maintenance {
            HerokuToolsError::maintenance_left_on(&plan.app, err)
        } else {
            err
        }
    };

    if maintenance {
        heroku.toggle_maintenance(&plan.app, true)?;
    }

    git.push(
        &git::remote_url(&plan.app),
        &plan.branch,
        args.remote_branch(deploy),
        args.force_push,
    )
    .map_err(left_on)?;

    if let Some(command) = migrate_command {
        heroku.run_command(&plan.app, command).map_err(left_on)?;
        heroku.toggle_maintenance(&plan.app, false).map_err(left_on)?;
    }

    let tag = tag_name(&deploy.tag_format, &plan.app, now);
    git.apply_tag(&plan.target_commit, &tag, tag_message)?;

    Ok(DeployResult {
        app: plan.app.clone(),
        commit: plan.target_commit.clone(),
        tag,
        migrated: migrate_command.is_some(),
    })
}

/// Changed files whose path contains any of `patterns`.
pub fn find_migrations(files: &[String], patterns: &[String]) -> Vec<String> {
    files
        .iter()
        .filter(|file| patterns.iter().any(|pattern| file.contains(pattern.as_str())))
        .cloned()
        .collect()
}

/// Expand `{app}` and `{timestamp}` in a tag name pattern.
pub fn tag_name(format: &str, app: &str, now: DateTime<Utc>) -> String {
    format
        .replace("{app}", app)
        .replace("{timestamp}", &now.format(TAG_TIMESTAMP_FORMAT).to_string())
}

/// Expand `{app}` in a tag message pattern.
pub fn tag_message(format: &str, app: &str) -> String {
    format.replace("{app}", app)
}

/// Starting text offered in the editor for a tag message
pub fn tag_message_template(plan: &DeployPlan, message: &str) -> String {
    let mut text = format!(
        "{}\n\n# Deploying {} ({}) to {}.\n# Lines starting with '#' are ignored.\n#\n",
        message, plan.branch, plan.target_commit, plan.app
    );
    for commit in &plan.commits {
        text.push_str(&format!("# {} {}\n", commit.hash, commit.message));
    }
    text
}

/// Warnings to show before asking for confirmation
pub fn deploy_warnings(
    plan: &DeployPlan,
    args: &DeployWorkflowArgs,
    deploy: &DeployConfig,
    tag_message: &str,
) -> Vec<DeployWarning> {
    let mut warnings = Vec::new();

    if !plan.has_new_commits() {
        warnings.push(DeployWarning::NoNewCommits {
            app: plan.app.clone(),
            commit: plan.deployed_commit.clone(),
        });
    }
    if args.force_push {
        warnings.push(DeployWarning::ForcePush {
            app: plan.app.clone(),
            remote_branch: args.remote_branch(deploy).to_string(),
        });
    }
    if tag_message.contains('\'') {
        warnings.push(DeployWarning::UnescapedQuote {
            message: tag_message.to_string(),
        });
    }

    warnings
}
