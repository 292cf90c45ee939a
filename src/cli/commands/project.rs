use clap::Subcommand;

use crate::db::Database;
use crate::services::project_service::ProjectService;
use crate::services::user_service::UserService;

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Create a project with the default screens; the lead becomes admin
    Create {
        key: String,
        name: String,
        #[arg(long)]
        lead: String,
    },

    /// Grant a user a role (admin, member, viewer) on a project
    Role {
        key: String,
        username: String,
        role: String,
    },
}

pub async fn run(command: ProjectCommand) -> anyhow::Result<()> {
    let pool = Database::pool().await?;
    let projects = ProjectService::new(pool.clone());
    let users = UserService::new(pool);

    match command {
        ProjectCommand::Create { key, name, lead } => {
            let lead = users.by_name(&lead).await?;
            let project = projects.create(&key, &name, &lead).await?;
            println!("created project {} ({})", project.key, project.id);
        }
        ProjectCommand::Role { key, username, role } => {
            let project = projects.by_key(&key).await?;
            let user = users.by_name(&username).await?;
            projects.grant_role(&project, &user, &role).await?;
            println!("granted {} role '{}' on {}", user.name, role, project.key);
        }
    }
    Ok(())
}
