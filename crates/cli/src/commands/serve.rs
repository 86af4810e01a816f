//! `palaver serve` — Start the HTTP server and dashboard.

use super::{ensure_credentials, load_config};

pub async fn run(
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if let Some(host) = host_override {
        config.gateway.host = host;
    }

    ensure_credentials(&config)?;

    println!("🗣️  Palaver");
    println!("   Dashboard: http://{}:{}/", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.default_model);
    println!("   Persona:   {}", config.default_persona);
    println!("   Memory:    {} messages", config.memory_turns);

    palaver_gateway::start(config).await?;

    Ok(())
}
