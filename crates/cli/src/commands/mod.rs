pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod models;
pub mod personas;
pub mod serve;

use palaver_config::{API_TOKEN_ENV, AppConfig};
use tracing::warn;

/// Load configuration, failing with a readable message.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Load configuration for read-only listings, falling back to defaults.
pub(crate) fn load_config_or_default() -> AppConfig {
    AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Config not loaded; showing built-in defaults");
        AppConfig::default()
    })
}

/// Fail fast with setup instructions when no API token is available.
pub(crate) fn ensure_credentials(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API token configured!");
    eprintln!();
    eprintln!("  Set the environment variable (or put it in a .env file):");
    eprintln!("    export {API_TOKEN_ENV}='your-token'");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!("    api_key = \"your-token\"");
    eprintln!();
    Err(format!("{API_TOKEN_ENV} is not set. See above for setup instructions.").into())
}
