use anyhow::Context;
use clap::{Parser, Subcommand};
use eventhub_db::storage::mongodb::MongoDBStorage;

use crate::commands::{CreateUserParams, PurgeEventsParams};

mod commands;

#[derive(Parser)]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    #[clap(
        short = 'D',
        long,
        env = "EVENTHUB_DB_URL",
        default_value = "mongodb://localhost:27017/eventhub"
    )]
    db_url: String,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Create a user with a hashed password.
    #[command(name = "create-user")]
    CreateUser(CreateUserParams),

    /// Print every user, one per line.
    #[command(name = "list-users")]
    ListUsers,

    /// Delete every event.
    #[command(name = "purge-events")]
    PurgeEvents(PurgeEventsParams),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let stg = MongoDBStorage::new(&args.db_url)
        .await
        .context("Failed to connect to MongoDB")?;

    let mut out = std::io::stdout().lock();
    match args.command {
        Command::CreateUser(params) => commands::create_user(&stg, params, &mut out)
            .await
            .context("Failed to create user"),
        Command::ListUsers => commands::list_users(&stg, &mut out)
            .await
            .context("Failed to list users"),
        Command::PurgeEvents(params) => commands::purge_events(&stg, params, &mut out)
            .await
            .context("Failed to purge events"),
    }
}
