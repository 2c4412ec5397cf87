use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelfctl_core::ShelfConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Print the effective config (file plus defaults, variables expanded)
    Show,
    /// Write a config file with default values
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init(args) => run_init(&ShelfConfig::config_path(), args),
    }
}

fn run_path() -> Result<()> {
    println!("{}", ShelfConfig::config_path().display());
    Ok(())
}

fn run_show() -> Result<()> {
    let config = masked(ShelfConfig::load_or_default()?);
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Copy of the config with every secret replaced, for display
fn masked(mut config: ShelfConfig) -> ShelfConfig {
    for secret in [
        &mut config.client.api_key,
        &mut config.server.database_url,
        &mut config.integrations.pocket_consumer_key,
    ] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    config
}

fn run_init(config_path: &Path, args: InitArgs) -> Result<()> {
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    ShelfConfig::default()
        .save_to(config_path)
        .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

    println!("Created config at: {:?}", config_path);
    println!("\nNext steps:");
    println!("  1. Set server.database_url (or DATABASE_URL in ~/.shelfctl/.env)");
    println!("  2. Run: shelfctl user add you@example.com");
    println!("  3. Put the printed key in client.api_key");

    Ok(())
}
