use std::{io, time::Duration};

use futures_util::TryStreamExt;
use modelops::{DownloadTracker, ProgressRecord, PullLine};
use reqwest::Method;
use serde_json::json;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::JoinHandle,
};
use tokio_util::io::StreamReader;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::provider_ollama::{OllamaClient, UpstreamError};
use crate::types::ActionResponse;

const PULL_TIMEOUT: Duration = Duration::from_secs(1200);

/// Drives model pulls and keeps the download tracker current.
///
/// Two pulls of the same model are not deduplicated: the later one
/// overwrites the tracker entry and both streams run to the end.
#[derive(Clone)]
pub struct Puller {
    ollama: OllamaClient,
    downloads: DownloadTracker,
}

impl Puller {
    pub fn new(ollama: OllamaClient, downloads: DownloadTracker) -> Self {
        Self { ollama, downloads }
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    /// Records the pull as starting and runs it on a detached task.
    ///
    /// The starting record is visible to pollers before this returns. The
    /// task keeps running if the handle is dropped.
    pub async fn start(&self, model: &str) -> Result<JoinHandle<ActionResponse>, ApiError> {
        if model.is_empty() {
            return Err(ApiError::ClientInput("Model name is required".to_string()));
        }

        self.downloads.set(model, ProgressRecord::starting()).await;

        let span = info_span!("pull", model = %model, pull_id = %Uuid::new_v4());
        let ollama = self.ollama.clone();
        let downloads = self.downloads.clone();
        let model = model.to_string();
        Ok(tokio::spawn(
            async move { run_pull(&ollama, &downloads, &model).await }.instrument(span),
        ))
    }

    /// Starts a pull and waits for its outcome.
    pub async fn pull(&self, model: &str) -> Result<ActionResponse, ApiError> {
        let task = self.start(model).await?;
        task.await
            .map_err(|e| ApiError::Internal(format!("pull task failed: {e}")))
    }
}

async fn run_pull(ollama: &OllamaClient, downloads: &DownloadTracker, model: &str) -> ActionResponse {
    info!("pull started");
    let result = stream_pull(ollama, downloads, model).await;
    finish_pull(downloads, model, result).await
}

/// Writes the terminal record and schedules the entry's removal.
async fn finish_pull(
    downloads: &DownloadTracker,
    model: &str,
    result: Result<(), UpstreamError>,
) -> ActionResponse {
    let outcome = match result {
        Ok(()) => {
            downloads.set(model, ProgressRecord::completed()).await;
            info!("pull completed");
            ActionResponse::ok(format!("Model {model} pulled successfully"))
        }
        Err(e) => {
            let msg = e.to_string();
            warn!(error = %msg, "pull failed");
            downloads.set(model, ProgressRecord::failed(msg.clone())).await;
            ActionResponse::failed(msg)
        }
    };

    // Exactly one cleanup per pull, whatever the outcome.
    downloads.schedule_cleanup(model);
    outcome
}

async fn stream_pull(
    ollama: &OllamaClient,
    downloads: &DownloadTracker,
    model: &str,
) -> Result<(), UpstreamError> {
    let resp = ollama
        .send(Method::POST, "pull", Some(&json!({ "name": model })), PULL_TIMEOUT)
        .await?;

    let body = resp.bytes_stream().map_err(io::Error::other);
    apply_progress(StreamReader::new(Box::pin(body)), downloads, model).await
}

/// Applies newline-delimited progress objects to the tracker in order.
///
/// Returns at the first `success` line or at end of input; both mean the
/// pull finished. Lines that are not progress objects are skipped.
pub async fn apply_progress<R>(reader: R, downloads: &DownloadTracker, model: &str) -> Result<(), UpstreamError>
where
    R: AsyncBufRead + Unpin,
{
    let mut segments = reader.split(b'\n');

    while let Some(raw) = segments.next_segment().await.map_err(read_error)? {
        let raw = raw.trim_ascii();
        if raw.is_empty() {
            continue;
        }

        let Some(line) = PullLine::decode(raw) else {
            debug!(len = raw.len(), "skipping undecodable progress line");
            continue;
        };

        if line.is_success() {
            return Ok(());
        }
        downloads.set(model, ProgressRecord::from_line(&line)).await;
    }

    Ok(())
}

fn read_error(e: io::Error) -> UpstreamError {
    let msg = e.to_string();
    match e.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
        Some(Ok(err)) => UpstreamError::from(*err),
        _ => UpstreamError::Transport(msg),
    }
}
