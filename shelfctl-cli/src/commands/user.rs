//! User provisioning

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use shelfctl_core::ShelfConfig;
use shelfctl_server::services::users::create_user;
use shelfctl_server::PgStore;

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user and print their API key
    Add(AddArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Email address of the new user
    pub email: String,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

pub async fn run_user(args: UserArgs) -> Result<()> {
    match args.command {
        UserCommands::Add(args) => run_add(args).await,
    }
}

async fn run_add(args: AddArgs) -> Result<()> {
    let config = ShelfConfig::load_or_default().context("Failed to load config")?;
    let database_url = args
        .database_url
        .or(config.server.database_url)
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or config")?;

    let store = PgStore::connect(&database_url, 1)
        .await
        .context("Failed to connect to database")?;
    let user = create_user(&store, &args.email)
        .await
        .with_context(|| format!("Failed to create user {}", args.email))?;

    println!("Created user {} ({})", user.email, user.id);
    println!("API key: {}", user.api_key);
    println!("\nSave it to ~/.shelfctl/config.toml under [client] api_key, or export SHELFCTL_API_KEY.");
    Ok(())
}
