use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::ApiError;

/// Body accepted by every mutation endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModelRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Option<Map<String, JsonValue>>,
    #[serde(default)]
    pub keep_alive: Option<JsonValue>,
}

impl ModelRequest {
    pub fn require_name(&self) -> Result<&str, ApiError> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ApiError::ClientInput("Model name is required".to_string())),
        }
    }
}

/// `{success, message}` or `{success, error}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, message: None, error: Some(error.into()) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonStatus {
    Online,
    /// The model list call answered with a non-2xx status.
    Error,
    Timeout,
    Offline,
}

#[derive(Clone, Debug, Serialize)]
pub struct StatusReport {
    pub status: DaemonStatus,
    pub available_models: Vec<JsonValue>,
    pub loaded_models: Vec<JsonValue>,
    pub error: Option<String>,
    pub checked_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ActiveDownloads {
    pub success: bool,
    pub downloads: HashMap<String, modelops::ProgressRecord>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ProgressResponse {
    Found {
        success: bool,
        progress: modelops::ProgressRecord,
        completed: bool,
    },
    Missing {
        success: bool,
        error: String,
    },
}
