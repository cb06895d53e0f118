use std::time::Duration;

use reqwest::Method;
use serde_json::{json, Map, Value as JsonValue};
use tracing::{info, warn};

use crate::provider_ollama::OllamaClient;
use crate::types::ActionResponse;

const LOAD_TIMEOUT: Duration = Duration::from_secs(120);
const UNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(60);

fn default_keep_alive() -> JsonValue {
    JsonValue::String("5m".to_string())
}

fn param_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loads a model by issuing an empty generate with a positive keep-alive.
pub async fn load_model(
    client: &OllamaClient,
    name: &str,
    options: Option<Map<String, JsonValue>>,
    keep_alive: Option<JsonValue>,
) -> ActionResponse {
    let options = options.unwrap_or_default();
    let payload = json!({
        "model": name,
        "prompt": "",
        "keep_alive": keep_alive.unwrap_or_else(default_keep_alive),
        "options": options,
    });

    match client.send(Method::POST, "generate", Some(&payload), LOAD_TIMEOUT).await {
        Ok(_) => {
            let params = if options.is_empty() {
                String::new()
            } else {
                let list: Vec<String> = options
                    .iter()
                    .map(|(k, v)| format!("{k}={}", param_text(v)))
                    .collect();
                format!(" (params: {})", list.join(", "))
            };
            info!(model = %name, "model loaded");
            ActionResponse::ok(format!("Model {name} loaded into memory{params}"))
        }
        Err(e) => {
            warn!(model = %name, error = %e, "load failed");
            ActionResponse::failed(e.to_string())
        }
    }
}

pub async fn unload_model(client: &OllamaClient, name: &str) -> ActionResponse {
    let payload = json!({ "model": name, "keep_alive": 0 });
    match client.send(Method::POST, "generate", Some(&payload), UNLOAD_TIMEOUT).await {
        Ok(_) => {
            info!(model = %name, "model unloaded");
            ActionResponse::ok(format!("Model {name} unloaded from memory"))
        }
        Err(e) => {
            warn!(model = %name, error = %e, "unload failed");
            ActionResponse::failed(e.to_string())
        }
    }
}

pub async fn delete_model(client: &OllamaClient, name: &str) -> ActionResponse {
    let payload = json!({ "name": name });
    match client.send(Method::DELETE, "delete", Some(&payload), DELETE_TIMEOUT).await {
        Ok(_) => {
            info!(model = %name, "model deleted");
            ActionResponse::ok(format!("Model {name} deleted successfully"))
        }
        Err(e) => {
            warn!(model = %name, error = %e, "delete failed");
            ActionResponse::failed(e.to_string())
        }
    }
}
