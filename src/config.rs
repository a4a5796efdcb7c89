use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Locations of the recipe and spice databases
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Configuration for the HTTP listener
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid server address: {}", e)))
    }
}

/// Configuration for the two SQLite stores
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Path of the recipes/ingredients database
    #[serde(default = "default_recipes_db")]
    pub recipes_db: String,
    /// Path of the spices database
    #[serde(default = "default_spices_db")]
    pub spices_db: String,
    /// Keep both stores in memory (nothing survives a restart)
    #[serde(default)]
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            recipes_db: default_recipes_db(),
            spices_db: default_spices_db(),
            in_memory: false,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_recipes_db() -> String {
    "recipes.db".to_string()
}

fn default_spices_db() -> String {
    "spices.db".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with SPICEBOX__ prefix
    /// 2. spicebox.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: SPICEBOX__STORAGE__RECIPES_DB
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("spicebox").required(false))
        // Use double underscore for nested: SPICEBOX__SERVER__PORT
        .add_source(
            Environment::with_prefix("SPICEBOX")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
