pub mod commands;

use clap::{Parser, Subcommand};

/// Administration CLI for the tracker database: schema setup, users and
/// projects. Talks to the database directly; the HTTP API is not required
/// to be running.
#[derive(Debug, Parser)]
#[command(name = "trackctl", version, about = "Tracker administration commands")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or migrate the database schema and seed catalog data
    Init,

    /// User management
    User {
        #[command(subcommand)]
        command: commands::user::UserCommand,
    },

    /// Project management
    Project {
        #[command(subcommand)]
        command: commands::project::ProjectCommand,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init => commands::init::run().await,
        Command::User { command } => commands::user::run(command).await,
        Command::Project { command } => commands::project::run(command).await,
    }
}
