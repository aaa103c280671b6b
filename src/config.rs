use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline for every database call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Config {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// A zero deadline would fail every store call.
    fn validate(self) -> Result<Self, Box<dyn std::error::Error>> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".into());
        }
        Ok(self)
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    6000
}

const fn default_request_timeout_secs() -> u64 {
    10
}

fn default_collection() -> String {
    "notes".to_string()
}

fn load_from_vars<F>(var: F) -> Result<Config, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let database = DatabaseConfig {
        uri: var("MONGO_URI").ok_or("MONGO_URI environment variable is required")?,
        name: var("MONGO_DATABASE").ok_or("MONGO_DATABASE environment variable is required")?,
        collection: var("MONGO_COLLECTION").unwrap_or_else(default_collection),
    };

    let port = match var("PORT") {
        Some(port) => port
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse PORT: {e}"))?,
        None => default_port(),
    };

    let request_timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
        Some(secs) => secs
            .parse::<u64>()
            .map_err(|e| format!("Failed to parse REQUEST_TIMEOUT_SECS: {e}"))?,
        None => default_request_timeout_secs(),
    };

    Config {
        host: var("HOST").unwrap_or_else(default_host),
        port,
        request_timeout_secs,
        database,
    }
    .validate()
}

fn load_from_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    parse_yaml(&contents)
}

fn parse_yaml(contents: &str) -> Result<Config, Box<dyn std::error::Error>> {
    serde_yaml::from_str::<Config>(contents)?.validate()
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path = env::var("NOTES_API_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        tracing::info!("Loading config from '{}'", config_path);
        return load_from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return load_from_file("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    match load_from_vars(|key| env::var(key).ok()) {
        Ok(config) => {
            tracing::info!("Successfully loaded configuration from environment variables");
            Ok(config)
        }
        Err(e) => Err(format!(
            "Config file not found and environment variables are incomplete. \
             Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
             Error: {e}"
        )
        .into()),
    }
}
