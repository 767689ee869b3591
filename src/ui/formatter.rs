use console::style;
use serde_json::Value;

use crate::cli::orchestration::DeployPlan;
use crate::git::CommitLogEntry;
use crate::heroku::Release;
use crate::warnings::DeployWarning;

/// Most commits listed before the rest are summarised
pub const MAX_LISTED_COMMITS: usize = 20;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a deploy warning on stderr.
pub fn display_warning(warning: &DeployWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

pub fn display_release(release: &Release) {
    println!("{}", style(release).bold());
}

/// One commit as shown in listings: "  abc1234 message"
pub fn format_commit_line(commit: &CommitLogEntry) -> String {
    format!("  {} {}", commit.hash, commit.message)
}

/// Display commits between two revisions, newest first.
pub fn display_commits(commits: &[CommitLogEntry], from: &str, to: &str) {
    println!(
        "\n{}",
        style(format!("Commits {}..{} ({}):", from, to, commits.len())).bold()
    );
    if commits.is_empty() {
        println!("  (none)");
        return;
    }

    for commit in commits.iter().take(MAX_LISTED_COMMITS) {
        println!("{}", format_commit_line(commit));
    }
    if commits.len() > MAX_LISTED_COMMITS {
        println!(
            "  ... and {} more commits",
            commits.len() - MAX_LISTED_COMMITS
        );
    }
}

/// Display changed files, highlighting migrations.
pub fn display_files(files: &[String], migrations: &[String]) {
    println!("\n{}", style(format!("Files changed ({}):", files.len())).bold());
    for file in files {
        if migrations.contains(file) {
            println!("  {} {}", style(file).cyan(), style("(migration)").dim());
        } else {
            println!("  {}", file);
        }
    }
}

/// Config vars as sorted `KEY=value` lines.
///
/// Non-string values are rendered as JSON. Anything other than an object
/// yields no lines.
pub fn format_config_vars(vars: &Value) -> Vec<String> {
    let Some(map) = vars.as_object() else {
        return Vec::new();
    };
    let mut lines: Vec<String> = map
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(text) => format!("{}={}", key, text),
            None => format!("{}={}", key, value),
        })
        .collect();
    lines.sort();
    lines
}

pub fn display_config_vars(vars: &Value) {
    for line in format_config_vars(vars) {
        println!("{}", line);
    }
}

/// Display everything a deploy is about to do.
pub fn display_deploy_plan(plan: &DeployPlan) {
    println!("\n{}", style(format!("Deploying to {}", plan.app)).bold());
    println!("  Running:  {}", style(&plan.release).dim());
    println!(
        "  Deployed: {}",
        style(&plan.deployed_commit).red()
    );
    println!(
        "  Target:   {} ({})",
        style(&plan.target_commit).green(),
        plan.branch
    );

    display_commits(&plan.commits, &plan.deployed_commit, &plan.target_commit);
    display_files(&plan.files, &plan.migrations);

    if plan.needs_migration() {
        println!(
            "\n{} {} migration file(s) changed; maintenance mode will be used",
            style("→").yellow(),
            plan.migrations.len()
        );
    }
}
