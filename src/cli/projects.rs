//! Projects subcommand implementation.
//!
//! Handles the `secportal projects` command for managing projects.

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::types::{NewProject, ProjectId, ProjectPatch, UserId};
use clap::{Parser, Subcommand};

/// Manage projects.
#[derive(Parser, Debug)]
pub struct ProjectsCommand {
    #[command(subcommand)]
    pub action: ProjectsAction,
}

/// Project management actions.
#[derive(Subcommand, Debug)]
pub enum ProjectsAction {
    /// List all projects
    List,

    /// Show details of a project
    Show {
        /// Project id
        id: ProjectId,
    },

    /// Register a new project
    Create {
        /// Project name
        name: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Repository URL
        #[arg(short, long, default_value = "")]
        repo: String,

        /// Technologies used (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tech: Vec<String>,

        /// Owner (defaults to the logged-in user's name)
        #[arg(short, long)]
        owner: Option<String>,

        /// Tester user ids to assign (comma-separated)
        #[arg(long, value_delimiter = ',')]
        testers: Vec<UserId>,
    },

    /// Change fields of a project
    Update {
        /// Project id
        id: ProjectId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        repo: Option<String>,

        #[arg(short, long, value_delimiter = ',')]
        tech: Option<Vec<String>>,

        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Delete a project
    Delete {
        /// Project id
        id: ProjectId,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

impl ProjectsCommand {
    /// Execute the projects command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        match &self.action {
            ProjectsAction::List => {
                output::print_projects(&ctx.service.projects()?);
                Ok(())
            }
            ProjectsAction::Show { id } => self.show(ctx, id),
            ProjectsAction::Create {
                name,
                description,
                repo,
                tech,
                owner,
                testers,
            } => {
                let owner = match owner {
                    Some(owner) => owner.clone(),
                    None => ctx.require_user()?.name,
                };
                let project = ctx.service.create_project(
                    NewProject::named(name.as_str())
                        .with_description(description.as_str())
                        .with_repository(repo.as_str())
                        .with_tech_stack(tech.iter().map(|t| t.trim().to_string()))
                        .with_owner(owner)
                        .with_testers(testers.clone()),
                )?;

                if ctx.quiet {
                    println!("{}", project.id);
                } else {
                    output::print_success(&format!(
                        "Project '{}' created as {}",
                        project.name, project.id
                    ));
                }
                Ok(())
            }
            ProjectsAction::Update {
                id,
                name,
                description,
                repo,
                tech,
                owner,
            } => {
                let patch = ProjectPatch {
                    name: name.clone(),
                    description: description.clone(),
                    repository_link: repo.clone(),
                    tech_stack: tech.clone(),
                    owner: owner.clone(),
                    ..Default::default()
                };
                let project = ctx
                    .service
                    .update_project(id, patch)?
                    .ok_or_else(|| CliError::NotFound(format!("project '{}'", id)))?;

                if !ctx.quiet {
                    output::print_success(&format!("Project '{}' updated", project.name));
                }
                Ok(())
            }
            ProjectsAction::Delete { id, yes } => self.delete(ctx, id, *yes),
        }
    }

    fn show(&self, ctx: &Context, id: &ProjectId) -> CliResult<()> {
        let project = ctx
            .service
            .project(id)?
            .ok_or_else(|| CliError::NotFound(format!("project '{}'", id)))?;

        println!("\nProject: {}", project.name);
        println!("{}", "=".repeat(40));
        println!("ID:           {}", project.id);
        println!("Description:  {}", project.description);
        println!("Repository:   {}", project.repository_link);
        println!("Tech Stack:   {}", project.tech_stack.join(", "));
        println!("Owner:        {}", project.owner);
        println!("Created:      {}", project.created_at.format("%Y-%m-%d %H:%M"));
        println!(
            "Last Scanned: {}",
            project
                .last_scanned
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string())
        );
        println!();

        Ok(())
    }

    fn delete(&self, ctx: &Context, id: &ProjectId, yes: bool) -> CliResult<()> {
        if !yes {
            println!("Delete project '{}'? [y/N] ", id);
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        }

        ctx.service.delete_project(id)?;

        if !ctx.quiet {
            output::print_success(&format!("Project '{}' deleted", id));
        }
        Ok(())
    }
}
