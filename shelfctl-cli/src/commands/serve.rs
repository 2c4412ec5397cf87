//! HTTP server command
//!
//! Flags and environment override `[server]` in the config file.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use shelfctl_core::ShelfConfig;
use shelfctl_server::services::users::create_user;
use shelfctl_server::{
    run_server, AppState, IntegrationRegistry, MemoryStore, PgStore, ServerConfig, Store,
};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:3030)
    #[arg(long, short = 'b', env = "SHELFCTL_BIND")]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Keep everything in memory and create a throwaway user
    #[arg(long)]
    pub ephemeral: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = ShelfConfig::load_or_default().context("Failed to load config")?;

    let bind_addr = match args.bind {
        Some(addr) => addr,
        None => config
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid server.bind '{}'", config.server.bind))?,
    };

    let store: Arc<dyn Store> = if args.ephemeral {
        let store = MemoryStore::new();
        let user = create_user(&store, "reader@shelf.local")
            .await
            .context("Failed to create ephemeral user")?;
        tracing::warn!("Ephemeral mode: data is lost on shutdown");
        println!("API key for {}: {}", user.email, user.api_key);
        Arc::new(store)
    } else {
        let database_url = args
            .database_url
            .or(config.server.database_url.clone())
            .context(
                "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, \
                 ~/.shelfctl/.env, or server.database_url in config (or use --ephemeral)",
            )?;
        let store = PgStore::connect(&database_url, config.server.max_connections)
            .await
            .context("Failed to connect to database")?;
        Arc::new(store)
    };

    let integrations = IntegrationRegistry::from_config(&config.integrations)
        .context("Failed to set up integration clients")?;

    let server_config = ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
    };

    tracing::info!("Starting shelfctl server on {}", bind_addr);

    // Blocks until shutdown
    run_server(AppState::new(store, integrations), server_config)
        .await
        .context("Server error")?;

    Ok(())
}
