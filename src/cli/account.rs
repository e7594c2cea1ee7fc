//! Account subcommands.
//!
//! Handles `signup`, `login`, `logout`, `whoami` and `users`.

use super::{password_or_prompt, Context};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::types::Role;
use clap::Parser;

/// Create an account and log in as it.
#[derive(Parser, Debug)]
pub struct SignupCommand {
    /// Email used to log in
    pub email: String,

    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Role in the portal
    #[arg(short, long, value_enum, default_value = "developer")]
    pub role: Role,

    /// Password (prompted for when omitted)
    #[arg(long, env = "SECPORTAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl SignupCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let password = password_or_prompt(self.password.as_deref())?;
        let user = ctx
            .service
            .signup(&self.email, &self.name, self.role, &password)?;

        if !ctx.quiet {
            output::print_success(&format!(
                "Signed up as {} <{}> ({})",
                user.name, user.email, user.role
            ));
        }
        Ok(())
    }
}

/// Log in with email and password.
#[derive(Parser, Debug)]
pub struct LoginCommand {
    /// Account email (case-sensitive)
    pub email: String,

    /// Password (prompted for when omitted)
    #[arg(long, env = "SECPORTAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoginCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let password = password_or_prompt(self.password.as_deref())?;
        let user = ctx
            .service
            .login(&self.email, &password)?
            .ok_or(CliError::InvalidCredentials)?;

        if !ctx.quiet {
            output::print_success(&format!("Logged in as {} ({})", user.name, user.role));
        }
        Ok(())
    }
}

pub fn logout(ctx: &Context) -> CliResult<()> {
    ctx.service.logout()?;
    if !ctx.quiet {
        output::print_success("Logged out");
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> CliResult<()> {
    let session = ctx
        .service
        .session()?
        .ok_or(CliError::Unauthenticated)?;
    let user = &session.user;

    println!("{} <{}>", user.name, user.email);
    if !ctx.quiet {
        println!("  id:      {}", user.id);
        println!("  role:    {}", user.role);
        println!("  since:   {}", session.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

pub fn users(ctx: &Context) -> CliResult<()> {
    let users = ctx.service.users()?;
    let current = ctx.service.current_user()?;
    output::print_users(&users, current.as_ref());

    if ctx.verbose {
        for role in Role::ALL {
            let count = users.iter().filter(|u| u.role == role).count();
            output::print_info(&format!("{}: {}", role, count));
        }
    }
    Ok(())
}
