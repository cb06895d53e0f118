use std::time::Duration;

use reqwest::Method;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::provider_ollama::{OllamaClient, UpstreamError};
use crate::types::{DaemonStatus, StatusReport};

const LIST_TIMEOUT: Duration = Duration::from_secs(10);
const SHOW_TIMEOUT: Duration = Duration::from_secs(20);

fn models_of(body: &JsonValue) -> Vec<JsonValue> {
    body.get("models")
        .and_then(|m| m.as_array())
        .cloned()
        .unwrap_or_default()
}

fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn report(
    status: DaemonStatus,
    available_models: Vec<JsonValue>,
    loaded_models: Vec<JsonValue>,
    error: Option<String>,
) -> StatusReport {
    StatusReport {
        status,
        available_models,
        loaded_models,
        error,
        checked_at: now_stamp(),
    }
}

/// Available and loaded models in one report. Never fails: upstream
/// trouble is folded into the status label.
pub async fn get_status(client: &OllamaClient) -> StatusReport {
    let available = match client.get_json("tags", LIST_TIMEOUT).await {
        Ok(body) => models_of(&body),
        Err(UpstreamError::Http { status, .. }) => {
            warn!(status, "daemon rejected model list");
            return report(DaemonStatus::Error, vec![], vec![], Some(format!("HTTP {status}")));
        }
        Err(e) => return degraded(e),
    };

    let loaded = match client.get_json("ps", LIST_TIMEOUT).await {
        Ok(body) => models_of(&body),
        // A daemon that lists models but not running ones is still online.
        Err(UpstreamError::Http { status, .. }) => {
            debug!(status, "loaded model list unavailable");
            vec![]
        }
        Err(e) => return degraded(e),
    };

    report(DaemonStatus::Online, available, loaded, None)
}

fn degraded(err: UpstreamError) -> StatusReport {
    let status = if err.is_timeout() { DaemonStatus::Timeout } else { DaemonStatus::Offline };
    warn!(?status, error = %err, "daemon unreachable");
    report(status, vec![], vec![], Some(err.to_string()))
}

/// Model detail from `/api/show`, with `runtime_info` attached when the
/// model is currently loaded.
pub async fn get_model_info(client: &OllamaClient, name: &str) -> JsonValue {
    let mut info = match client
        .request_json(Method::POST, "show", Some(&json!({ "name": name })), SHOW_TIMEOUT)
        .await
    {
        Ok(info) => info,
        Err(UpstreamError::Http { status, .. }) => return json!({ "error": format!("HTTP {status}") }),
        Err(e) => return json!({ "error": e.to_string() }),
    };

    let loaded = match client.get_json("ps", LIST_TIMEOUT).await {
        Ok(body) => models_of(&body),
        Err(UpstreamError::Http { .. }) => vec![],
        Err(e) => return json!({ "error": e.to_string() }),
    };

    let running = loaded
        .iter()
        .find(|m| m.get("name").and_then(|n| n.as_str()) == Some(name));
    if let (Some(running), Some(obj)) = (running, info.as_object_mut()) {
        obj.insert(
            "runtime_info".to_string(),
            json!({
                "context_length": running.get("context_length"),
                "size_vram": running.get("size_vram"),
                "expires_at": running.get("expires_at"),
            }),
        );
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_online() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({"models": [{"name": "llama3"}, {"name": "phi3"}]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/ps");
                then.status(200).json_body(json!({"models": [{"name": "llama3"}]}));
            })
            .await;

        let report = get_status(&OllamaClient::new(server.base_url())).await;
        assert_eq!(report.status, DaemonStatus::Online);
        assert_eq!(report.available_models.len(), 2);
        assert_eq!(report.loaded_models.len(), 1);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_tags_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(500).body("boom");
            })
            .await;
        let ps = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/ps");
                then.status(200).json_body(json!({"models": []}));
            })
            .await;

        let report = get_status(&OllamaClient::new(server.base_url())).await;
        assert_eq!(report.status, DaemonStatus::Error);
        assert!(report.available_models.is_empty());
        assert!(report.loaded_models.is_empty());
        assert_eq!(report.error.as_deref(), Some("HTTP 500"));
        ps.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_ps_failure_is_silent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({"models": [{"name": "llama3"}]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/ps");
                then.status(503);
            })
            .await;

        let report = get_status(&OllamaClient::new(server.base_url())).await;
        assert_eq!(report.status, DaemonStatus::Online);
        assert_eq!(report.available_models.len(), 1);
        assert!(report.loaded_models.is_empty());
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_offline() {
        let report = get_status(&OllamaClient::new("http://127.0.0.1:9".to_string())).await;
        assert_eq!(report.status, DaemonStatus::Offline);
        assert!(report.error.is_some());
    }

    #[tokio::test]
    async fn test_model_info_attaches_runtime() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/show").json_body(json!({"name": "llama3"}));
                then.status(200).json_body(json!({"modelfile": "FROM llama3", "details": {"family": "llama"}}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/ps");
                then.status(200).json_body(json!({"models": [
                    {"name": "llama3", "context_length": 8192, "size_vram": 4096, "expires_at": "2026-01-01T00:00:00Z"}
                ]}));
            })
            .await;

        let info = get_model_info(&OllamaClient::new(server.base_url()), "llama3").await;
        assert_eq!(info["details"]["family"], "llama");
        assert_eq!(info["runtime_info"]["context_length"], 8192);
        assert_eq!(info["runtime_info"]["size_vram"], 4096);
    }

    #[tokio::test]
    async fn test_model_info_not_loaded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/show");
                then.status(200).json_body(json!({"modelfile": "FROM phi3"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/ps");
                then.status(200).json_body(json!({"models": []}));
            })
            .await;

        let info = get_model_info(&OllamaClient::new(server.base_url()), "phi3").await;
        assert!(info.get("runtime_info").is_none());
    }

    #[tokio::test]
    async fn test_model_info_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/show");
                then.status(404).body("not found");
            })
            .await;

        let info = get_model_info(&OllamaClient::new(server.base_url()), "ghost").await;
        assert_eq!(info, json!({"error": "HTTP 404"}));
    }
}
