use clap::Subcommand;

use crate::db::Database;
use crate::services::user_service::UserService;

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        name: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        password: String,
    },
}

pub async fn run(command: UserCommand) -> anyhow::Result<()> {
    match command {
        UserCommand::Create {
            name,
            display_name,
            email,
            password,
        } => {
            let pool = Database::pool().await?;
            let users = UserService::new(pool);
            let display_name = display_name.unwrap_or_else(|| name.clone());
            let user = users.create(&name, &display_name, &email, &password).await?;
            println!("created user {} ({})", user.name, user.id);
        }
    }
    Ok(())
}
