//! `palaver config` — Print a default configuration file.

use palaver_config::AppConfig;

pub fn run() {
    let path = AppConfig::config_dir().join("config.toml");
    println!("# Save as {}", path.display());
    println!("# The API token is read from EURON_API_TOKEN; api_key here is optional.");
    println!();
    print!("{}", AppConfig::default_toml());
}
