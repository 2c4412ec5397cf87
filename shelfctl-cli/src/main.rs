//! shelfctl CLI - read-it-later library server and tools
//!
//! - `serve`: run the GraphQL server (Postgres, or in-memory with `--ephemeral`)
//! - `save`: save a page through the client
//! - `user add`: provision a user and print their API key
//! - `config`: inspect and initialize `~/.shelfctl/config.toml`

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "shelfctl",
    author,
    version,
    about = "Read-it-later library: save pages, label and highlight them, sync to Readwise and Notion"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the GraphQL server
    Serve(commands::serve::ServeArgs),
    /// Save a page to your library
    Save(commands::save::SaveArgs),
    /// Manage users and API keys
    User(commands::user::UserArgs),
    /// Manage shelfctl configuration (path, show, init)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Load `.env` from ~/.shelfctl, then the working directory.
/// Variables already set in the environment win.
fn load_env_files() {
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".shelfctl/.env"));
    }
    let _ = dotenvy::dotenv();
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_files();
    let cli = Cli::parse();

    let tracing_config = tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    };
    tracing_setup::init(&tracing_config).ok();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await,
        Commands::Save(args) => commands::save::run_save(args).await,
        Commands::User(args) => commands::user::run_user(args).await,
        Commands::Config(args) => config::run_config(args),
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    result
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
