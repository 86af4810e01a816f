//! `palaver doctor` — Diagnose configuration and model connectivity.

use palaver_config::{API_TOKEN_ENV, AppConfig, ConfigError};
use palaver_core::Provider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Palaver Doctor");
    println!("=================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ℹ️  No config file; using defaults (`palaver config` prints one)");
    }

    if let Some(config) = check_config(AppConfig::load(), &mut issues) {
        println!("     Endpoint: {}", config.api_url);
        println!("     Model:    {}", config.default_model);

        match palaver_providers::build_from_config(&config) {
            Ok(provider) => {
                println!("  ✅ API token configured");
                check_endpoint(provider.as_ref(), &mut issues).await;
            }
            Err(_) => {
                println!("  ❌ No API token — set {API_TOKEN_ENV}");
                issues += 1;
            }
        }
    }

    println!();
    summary(issues)?;
    Ok(())
}

fn check_config(loaded: Result<AppConfig, ConfigError>, issues: &mut usize) -> Option<AppConfig> {
    match loaded {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            Some(config)
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            *issues += 1;
            None
        }
    }
}

async fn check_endpoint(provider: &dyn Provider, issues: &mut usize) {
    match provider.health_check().await {
        Ok(true) => println!("  ✅ Model endpoint reachable"),
        Ok(false) => {
            println!("  ⚠️  Model endpoint responded but reported unhealthy");
            *issues += 1;
        }
        Err(e) => {
            println!("  ❌ Model endpoint check failed: {}", e.user_message());
            *issues += 1;
        }
    }
}

/// Print the closing line; any issue makes the command fail.
fn summary(issues: usize) -> Result<(), String> {
    if issues == 0 {
        println!("  🎉 All checks passed!");
        Ok(())
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
        Err(format!("doctor found {issues} issue(s)"))
    }
}
