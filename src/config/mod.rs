use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string. When unset the database lives in `server.data_dir`.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

/// Identities used when a request carries no `X-User-Id` header.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// Acting user for cart operations and seller for new products
    #[serde(default = "default_placeholder_user_id")]
    pub placeholder_user_id: String,
    /// Seller reported as "Pending" in the admin seller list
    #[serde(default = "default_pending_seller_id")]
    pub pending_seller_id: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            placeholder_user_id: default_placeholder_user_id(),
            pending_seller_id: default_pending_seller_id(),
        }
    }
}

fn default_placeholder_user_id() -> String {
    "60c72b2f-9b1e-8a00-1c8a-0d7800000000".to_string()
}

fn default_pending_seller_id() -> String {
    "60c72b2f-9b1e-8a00-1c8a-0d7900000000".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Require an admin `X-User-Id` on /api/admin routes
    #[serde(default)]
    pub require_admin_role: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }

    /// Apply environment overrides. The lookup is injected so tests don't
    /// have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SMARKET_DATABASE_URL").or_else(|| lookup("DATABASE_URL")) {
            self.database.url = Some(url);
        }
        if let Some(host) = lookup("SMARKET_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SMARKET_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid SMARKET_PORT value: {}", port))?;
        }
        Ok(())
    }

    /// Connection string for the storage backend
    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) => url.clone(),
            None => format!(
                "sqlite:{}?mode=rwc",
                self.server.data_dir.join("smarket.db").display()
            ),
        }
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            marketplace: MarketplaceConfig::default(),
            admin: AdminConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
