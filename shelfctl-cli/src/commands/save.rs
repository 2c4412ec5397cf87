//! Save a page through the GraphQL API

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use shelfctl_client::{SavePageRequest, ShelfClient};
use shelfctl_core::ShelfConfig;

#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// URL of the page to save
    pub url: String,

    /// Title (default: the page's <title>, then the URL)
    #[arg(long)]
    pub title: Option<String>,

    /// File with the page content, or '-' for stdin
    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,

    /// Server root (overrides client.endpoint)
    #[arg(long, env = "SHELFCTL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API key (overrides client.api_key)
    #[arg(long, env = "SHELFCTL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

fn read_content(path: Option<&PathBuf>) -> Result<String> {
    match path {
        None => Ok(String::new()),
        Some(path) if path.as_os_str() == "-" => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read content from stdin")?;
            Ok(content)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
    }
}

pub async fn run_save(args: SaveArgs) -> Result<()> {
    let config = ShelfConfig::load_or_default().context("Failed to load config")?;

    let endpoint = args.endpoint.unwrap_or(config.client.endpoint);
    let api_key = args.api_key.or(config.client.api_key).context(
        "No API key. Set via --api-key, SHELFCTL_API_KEY, or client.api_key in config \
         (create one with `shelfctl user add`)",
    )?;

    let client = ShelfClient::builder()
        .base_url(&endpoint)
        .api_key(api_key)
        .timeout(Duration::from_secs(config.client.timeout_secs))
        .build()
        .context("Failed to build client")?;

    let mut request = SavePageRequest::new(&args.url, read_content(args.content_file.as_ref())?);
    if let Some(title) = args.title {
        request = request.title(title);
    }

    let saved = client
        .save_page(request)
        .await
        .with_context(|| format!("Failed to save {}", args.url))?;

    println!("Saved {} ({})", saved.url, saved.library_item_id);
    Ok(())
}
