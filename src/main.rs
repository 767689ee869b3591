use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use heroku_tools::cli::orchestration::{
    self, deploy_warnings, execute_deploy, plan_deploy, DeployWorkflowArgs,
};
use heroku_tools::config::{self, Config};
use heroku_tools::git::{self, Git};
use heroku_tools::heroku::{HerokuApi, HerokuCli, Release};
use heroku_tools::logging;
use heroku_tools::runner::ShellRunner;
use heroku_tools::ui;

/// File inside the git dir used to edit tag messages
const TAG_EDITMSG: &str = "HEROKU_TAG_EDITMSG";

#[derive(Parser)]
#[command(
    name = "heroku-tools",
    version,
    about = "Deploy git branches to Heroku and inspect releases"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log output (-v info, -vv debug)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the latest deployment of an app
    Release { app: String },

    /// List commits and files between the deployed commit and a branch
    Changes {
        app: String,
        #[arg(short, long, help = "Branch to compare (default: current branch)")]
        branch: Option<String>,
    },

    /// Print the config vars of an app
    ConfigVars { app: String },

    /// Turn maintenance mode on or off
    Maintenance { app: String, state: Toggle },

    /// Promote an app to the next pipeline stage
    Promote { app: String },

    /// Run a one-off command on an app
    Run {
        app: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Print the Heroku git remote of an app
    Remote { app: String },

    /// Push a branch to an app, migrating and tagging as configured
    Deploy {
        app: String,
        #[arg(short, long, help = "Branch to deploy (default: current branch)")]
        branch: Option<String>,
        #[arg(long, help = "Remote branch to push to (default: deploy.remote_branch)")]
        remote_branch: Option<String>,
        #[arg(long, help = "Force push to the Heroku remote")]
        force_push: bool,
        #[arg(short, long, help = "Skip confirmation prompts")]
        yes: bool,
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
        #[arg(short, long, help = "Edit the tag message in your editor")]
        edit: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init_logging(args.verbose) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    let runner = ShellRunner::new();

    match args.command {
        Command::Release { app } => {
            let api = HerokuApi::from_config(&config)?;
            let release = Release::latest_deployment(&api, &app)?;
            ui::display_release(&release);
        }
        Command::Changes { app, branch } => {
            let api = HerokuApi::from_config(&config)?;
            let git = Git::new(&config, &runner);
            let release = Release::latest_deployment(&api, &app)?;
            let branch = match branch {
                Some(branch) => branch,
                None => git.current_branch()?,
            };
            let deployed = release.deployed_commit()?;
            let head = git.branch_head(&branch)?;
            let commits = git.commits(deployed, &head)?;
            let files = git.files(deployed, &head)?;

            ui::display_release(&release);
            ui::display_commits(&commits, deployed, &head);
            ui::display_files(&files, &[]);
        }
        Command::ConfigVars { app } => {
            let api = HerokuApi::from_config(&config)?;
            let release = Release::latest_deployment(&api, &app)?;
            ui::display_config_vars(&release.config_vars(&api)?);
        }
        Command::Maintenance { app, state } => {
            let heroku = HerokuCli::new(&runner);
            print!(
                "{}",
                heroku.toggle_maintenance(&app, matches!(state, Toggle::On))?
            );
        }
        Command::Promote { app } => {
            let heroku = HerokuCli::new(&runner);
            print!("{}", heroku.promote_app(&app)?);
        }
        Command::Run { app, command } => {
            let heroku = HerokuCli::new(&runner);
            print!("{}", heroku.run_command(&app, &command.join(" "))?);
        }
        Command::Remote { app } => {
            println!("{}", git::remote_url(&app));
        }
        Command::Deploy {
            app,
            branch,
            remote_branch,
            force_push,
            yes,
            dry_run,
            edit,
        } => {
            let workflow = DeployWorkflowArgs {
                app,
                branch,
                remote_branch,
                force_push,
            };
            deploy(&config, &runner, &workflow, yes, dry_run, edit)?;
        }
    }

    Ok(())
}

fn deploy(
    config: &Config,
    runner: &ShellRunner,
    workflow: &DeployWorkflowArgs,
    yes: bool,
    dry_run: bool,
    edit: bool,
) -> Result<()> {
    let git = Git::new(config, runner);
    let heroku = HerokuCli::new(runner);
    let api = HerokuApi::from_config(config)?;

    ui::display_status(&format!(
        "Fetching latest deployment of {}...",
        workflow.app
    ));
    let plan = plan_deploy(&git, &api, &config.deploy, workflow)?;
    ui::display_deploy_plan(&plan);

    let default_message = orchestration::tag_message(&config.deploy.tag_message, &workflow.app);
    let message = if edit && !dry_run {
        let editor = git.editor()?;
        let template = orchestration::tag_message_template(&plan, &default_message);
        ui::edit_message(&editor, &config.git_dir().join(TAG_EDITMSG), &template)?
    } else {
        default_message
    };

    for warning in deploy_warnings(&plan, workflow, &config.deploy, &message) {
        ui::display_warning(&warning);
    }

    if dry_run {
        ui::display_status("Dry run:");
        if plan.needs_migration() {
            ui::display_success(&format!("  Would turn on maintenance for {}", plan.app));
        }
        ui::display_success(&format!(
            "  Would push {} to {}",
            plan.branch,
            git::remote_url(&plan.app)
        ));
        if let Some(command) = config
            .deploy
            .migrate_command
            .as_deref()
            .filter(|_| plan.needs_migration())
        {
            ui::display_success(&format!("  Would run '{}' and end maintenance", command));
        }
        ui::display_success(&format!("  Would tag {}", plan.target_commit));
        return Ok(());
    }

    if !yes && !ui::confirm_action(&format!("Deploy {} to {}?", plan.branch, plan.app))? {
        println!("Deploy cancelled by user.");
        return Ok(());
    }

    let result = execute_deploy(
        &git,
        &heroku,
        &config.deploy,
        &plan,
        workflow,
        &message,
        Utc::now(),
    )?;

    if result.migrated {
        ui::display_success("Migrations applied");
    }
    ui::display_success(&format!(
        "Deployed {} to {} and tagged it {}",
        result.commit, result.app, result.tag
    ));
    Ok(())
}
