use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ShelfError};

/// `${NAME}` references expanded from the environment
static VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("invalid variable regex"));

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "SHELFCTL_CONFIG";

/// Centralized configuration for shelfctl
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub cors_permissive: bool,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3030".to_string(),
            cors_permissive: false,
            database_url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    /// Server root; the GraphQL path is appended by the client
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3030".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Base URLs and credentials for the third-party sync providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub readwise_base_url: String,
    pub notion_base_url: String,
    pub notion_version: String,
    pub pocket_base_url: String,
    pub pocket_consumer_key: Option<String>,
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            readwise_base_url: "https://readwise.io".to_string(),
            notion_base_url: "https://api.notion.com".to_string(),
            notion_version: "2022-06-28".to_string(),
            pocket_base_url: "https://getpocket.com".to_string(),
            pocket_consumer_key: None,
        }
    }
}

impl ShelfConfig {
    /// Load config from the default path.
    ///
    /// Fails hard with actionable error if config doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Err(ShelfError::ConfigMissing { path });
        }
        Self::load_from(&path)
    }

    /// Load config from the default path, falling back to defaults when absent.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            let mut config = Self::default();
            config.expand_variables(|name| env::var(name).ok());
            return Ok(config);
        }
        Self::load_from(&path)
    }

    /// Load and expand a config file at an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content).map_err(|e| ShelfError::config_parse(path, e))?;
        config.expand_variables(|name| env::var(name).ok());
        Ok(config)
    }

    /// Parse TOML without variable expansion
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path: $SHELFCTL_CONFIG or ~/.shelfctl/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shelfctl/config.toml")
    }

    /// Expand ${var} references in secrets and connection strings
    pub fn expand_variables<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = self.server.database_url.take() {
            self.server.database_url = Some(expand_string(&url, &lookup));
        }
        if let Some(key) = self.client.api_key.take() {
            self.client.api_key = Some(expand_string(&key, &lookup));
        }
        if let Some(key) = self.integrations.pocket_consumer_key.take() {
            self.integrations.pocket_consumer_key = Some(expand_string(&key, &lookup));
        }
        self.client.endpoint = expand_string(&self.client.endpoint, &lookup);

        // An empty expansion means the variable was unset
        if self.server.database_url.as_deref() == Some("") {
            self.server.database_url = None;
        }
        if self.client.api_key.as_deref() == Some("") {
            self.client.api_key = None;
        }
        if self.integrations.pocket_consumer_key.as_deref() == Some("") {
            self.integrations.pocket_consumer_key = None;
        }
    }

    /// Render the config as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save config to a path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

/// Expand ${var} references in a string. Unknown variables expand to "".
fn expand_string<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    VAR_RE
        .replace_all(s, |caps: &Captures| lookup(&caps[1]).unwrap_or_default())
        .into_owned()
}
