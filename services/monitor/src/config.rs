use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub ollama_base_url: String,
    pub bind_addr: String,
    pub pull_cleanup: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ollama_base_url = lookup("OLLAMA_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .context("Missing required env var: OLLAMA_BASE_URL")?;
        let ollama_base_url = ollama_base_url.trim().trim_end_matches('/').to_string();

        let bind_addr = lookup("MONITOR_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string());

        let pull_cleanup = match lookup("PULL_CLEANUP_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("PULL_CLEANUP_SECS must be a number of seconds, got {raw:?}"))?;
                Duration::from_secs(secs)
            }
            None => modelops::DEFAULT_CLEANUP_AFTER,
        };

        if !ollama_base_url.starts_with("http://") && !ollama_base_url.starts_with("https://") {
            bail!("OLLAMA_BASE_URL must start with http:// or https://");
        }

        Ok(Self {
            ollama_base_url,
            bind_addr,
            pull_cleanup,
        })
    }
}
