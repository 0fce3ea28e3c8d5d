// In crates/app-config/src/lib.rs

use config::{Config, Environment, File, FileFormat};
use core_types::Symbol;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{RunConfig, Settings, TelegramCredentials};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    load_settings_from("config")
}

/// Same as [`load_settings`], reading the TOML files from `dir`.
pub fn load_settings_from(dir: &str) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::with_name(&format!("{}/base", dir)))
        // 2. Load the environment-specific configuration file.
        .add_source(File::with_name(&format!("{}/{}", dir, environment)).required(false))
        // 3. Load settings from environment variables (e.g., `APP_TELEGRAM__BOT_TOKEN=...`).
        // The prefix is `APP_`, the section separator is `__`.
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Parses settings from a TOML document, without touching files or the environment.
pub fn settings_from_toml(content: &str) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::from_str(content, FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Splits a comma-separated watch-list into symbols.
///
/// Entries are trimmed and upper-cased; empty entries are dropped.
pub fn parse_symbol_list(raw: &str) -> Vec<Symbol> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(Symbol::new)
        .collect()
}
