use std::sync::Arc;

use modelops::DownloadTracker;

use crate::{config::AppConfig, provider_ollama::OllamaClient};

pub type SharedState = Arc<AppState>;

#[derive(Clone)]
pub struct AppState {
    pub ollama: OllamaClient,
    pub downloads: DownloadTracker,
}

impl AppState {
    pub fn new(ollama: OllamaClient, downloads: DownloadTracker) -> Self {
        Self { ollama, downloads }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            OllamaClient::new(cfg.ollama_base_url.clone()),
            DownloadTracker::new(cfg.pull_cleanup),
        )
    }

    pub fn puller(&self) -> crate::pull_job::Puller {
        crate::pull_job::Puller::new(self.ollama.clone(), self.downloads.clone())
    }
}
