//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `secportal signup|login|logout|whoami|users` - Accounts and sessions
//! - `secportal projects list|show|create|update|delete` - Manage projects
//! - `secportal scan <project>...` - Run mock scans
//! - `secportal scans` - Scan history
//! - `secportal vulns list|status` - Triage findings
//! - `secportal report|dashboard|admin` - Aggregated views
//! - `secportal config show|init` - Settings file

mod account;
mod config;
mod projects;
mod report;
mod scan;
mod vulns;

pub use account::{LoginCommand, SignupCommand};
pub use config::ConfigCommand;
pub use projects::ProjectsCommand;
pub use report::{AdminCommand, ReportCommand};
pub use scan::{ScanCommand, ScansCommand};
pub use vulns::VulnsCommand;

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::service::PortalService;
use crate::storage::FileStore;
use crate::types::User;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// secportal - security testing portal.
///
/// Sign up, register projects, run mock vulnerability scans and review
/// the findings from the command line.
#[derive(Parser, Debug)]
#[command(name = "secportal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Security testing portal: projects, mock scans and reports", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the portal store
    #[arg(long, global = true, value_name = "DIR", env = "SECPORTAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and log in as it
    Signup(SignupCommand),

    /// Log in with email and password
    Login(LoginCommand),

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List all users
    Users,

    /// Manage projects
    #[command(alias = "p")]
    Projects(ProjectsCommand),

    /// Scan one or more projects
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// View scan history
    Scans(ScansCommand),

    /// List and triage vulnerabilities
    #[command(alias = "v")]
    Vulns(VulnsCommand),

    /// Vulnerability report with filters and export
    #[command(alias = "r")]
    Report(ReportCommand),

    /// Portfolio overview
    Dashboard,

    /// Administrator overview
    Admin(AdminCommand),

    /// Show or create the settings file
    Config(ConfigCommand),
}

/// Everything a command needs to run.
pub struct Context {
    pub service: Arc<PortalService>,
    pub settings: AppSettings,
    /// Settings file given with `--config`, if any.
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    /// Load settings and open the file store the flags point at.
    pub fn open(cli: &Cli) -> CliResult<Self> {
        let mut settings = match &cli.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        if let Some(dir) = &cli.data_dir {
            settings.data_dir = Some(dir.clone());
        }

        let store_dir = settings.store_dir()?;
        debug!(store = %store_dir.display(), "opening portal store");
        let store = FileStore::open(store_dir)?;

        Ok(Self {
            service: Arc::new(PortalService::new(store, &settings)),
            settings,
            config_path: cli.config.clone(),
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// The session user, or an error telling the caller to log in.
    pub fn require_user(&self) -> CliResult<User> {
        self.service.current_user()?.ok_or(CliError::Unauthenticated)
    }
}

impl Commands {
    /// Execute the selected command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        match self {
            Self::Signup(cmd) => cmd.execute(ctx),
            Self::Login(cmd) => cmd.execute(ctx),
            Self::Logout => account::logout(ctx),
            Self::Whoami => account::whoami(ctx),
            Self::Users => account::users(ctx),
            Self::Projects(cmd) => cmd.execute(ctx),
            Self::Scan(cmd) => cmd.execute(ctx).await,
            Self::Scans(cmd) => cmd.execute(ctx),
            Self::Vulns(cmd) => cmd.execute(ctx),
            Self::Report(cmd) => cmd.execute(ctx),
            Self::Dashboard => report::dashboard(ctx),
            Self::Admin(cmd) => cmd.execute(ctx),
            Self::Config(cmd) => cmd.execute(ctx),
        }
    }
}

/// Use `given` if present, otherwise prompt on stdin.
pub(crate) fn password_or_prompt(given: Option<&str>) -> CliResult<String> {
    if let Some(password) = given {
        return Ok(password.to_string());
    }

    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();

    if password.is_empty() {
        return Err(CliError::Other("password cannot be empty".to_string()));
    }
    Ok(password)
}
