//! Config subcommand implementation.
//!
//! Handles `secportal config show|init`.

use super::Context;
use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect or create the settings file.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        match &self.action {
            ConfigAction::Show => {
                if !ctx.quiet {
                    output::print_info(&format!("settings file: {}", settings_path(ctx)?.display()));
                }
                println!("{}", output::render_json(&ctx.settings)?);
                Ok(())
            }
            ConfigAction::Init { force } => {
                let path = settings_path(ctx)?;
                if path.exists() && !force {
                    return Err(CliError::Other(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }

                let defaults = AppSettings::default();
                match &ctx.config_path {
                    Some(custom) => defaults.save_to(custom)?,
                    None => defaults.save()?,
                }

                if !ctx.quiet {
                    output::print_success(&format!("Wrote {}", path.display()));
                }
                Ok(())
            }
        }
    }
}

fn settings_path(ctx: &Context) -> CliResult<PathBuf> {
    match &ctx.config_path {
        Some(path) => Ok(path.clone()),
        None => Ok(Paths::resolve()?.settings_file()),
    }
}
