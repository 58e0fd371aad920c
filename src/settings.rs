//! Runtime settings.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. `config.toml` / `config.local.toml` in the working directory, or an explicit file
//! 3. environment variables prefixed `TRIVIA_`, nested with `__`
//!    (`TRIVIA_SERVER__PORT=8080`, `TRIVIA_DATABASE__URL=sqlite:/data/trivia.db`)

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("database.url", "sqlite:trivia.db")?
        .set_default("database.max_connections", 5)?
        .set_default("database.run_migrations", true)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("TRIVIA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if settings.server.port == 0 {
        return Err(SettingsError::Invalid("server.port cannot be 0".to_owned()));
    }
    if settings.database.url.trim().is_empty() {
        return Err(SettingsError::Invalid(
            "database.url cannot be empty".to_owned(),
        ));
    }
    if settings.database.max_connections == 0 {
        return Err(SettingsError::Invalid(
            "database.max_connections cannot be 0".to_owned(),
        ));
    }
    Ok(())
}
