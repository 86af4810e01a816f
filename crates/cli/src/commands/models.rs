//! `palaver models` — List selectable models and whether the endpoint serves them.

use palaver_core::{ChatModel, Provider};
use tracing::debug;

use super::load_config_or_default;

pub async fn run() {
    let config = load_config_or_default();

    // Without a token only the catalog can be shown.
    let served = match palaver_providers::build_from_config(&config) {
        Ok(provider) => served_models(provider.as_ref()).await,
        Err(_) => None,
    };

    println!("🤖 Models");
    println!("=========");
    println!();
    for model in ChatModel::ALL {
        let marker = if model == config.default_model { " (default)" } else { "" };
        println!(
            "  {:<38} {:<24} {}{marker}",
            model.id(),
            model.display_name(),
            availability(model, served.as_deref())
        );
    }
    if served.is_none() {
        println!();
        println!("  Endpoint not queried; set the API token to check availability.");
    }
}

/// Model ids the endpoint reports, or `None` when it could not be asked.
async fn served_models(provider: &dyn Provider) -> Option<Vec<String>> {
    match provider.list_models().await {
        Ok(models) if !models.is_empty() => Some(models),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Model listing failed");
            None
        }
    }
}

fn availability(model: ChatModel, served: Option<&[String]>) -> &'static str {
    match served {
        None => "",
        Some(ids) if ids.iter().any(|id| id == model.id()) => "✅ served",
        Some(_) => "⚠️  not listed by endpoint",
    }
}
