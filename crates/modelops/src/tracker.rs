use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::RwLock, task::JoinHandle};
use tracing::debug;

use crate::ProgressRecord;

pub const DEFAULT_CLEANUP_AFTER: Duration = Duration::from_secs(300);

/// In-memory progress of recent pulls, keyed by model name.
///
/// Cloning is cheap and every clone shares the same map. An entry means a
/// pull for that model finished (or started) within the cleanup window;
/// a missing entry does not distinguish "never pulled" from "expired".
#[derive(Clone, Debug)]
pub struct DownloadTracker {
    entries: Arc<RwLock<HashMap<String, ProgressRecord>>>,
    cleanup_after: Duration,
}

impl Default for DownloadTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLEANUP_AFTER)
    }
}

impl DownloadTracker {
    pub fn new(cleanup_after: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            cleanup_after,
        }
    }

    /// Replaces whatever is stored for `model`.
    pub async fn set(&self, model: &str, record: ProgressRecord) {
        self.entries.write().await.insert(model.to_string(), record);
    }

    pub async fn get(&self, model: &str) -> Option<ProgressRecord> {
        self.entries.read().await.get(model).cloned()
    }

    pub async fn delete(&self, model: &str) -> Option<ProgressRecord> {
        self.entries.write().await.remove(model)
    }

    pub async fn snapshot(&self) -> HashMap<String, ProgressRecord> {
        self.entries.read().await.clone()
    }

    /// Deletes the entry for `model` once the cleanup delay has elapsed.
    ///
    /// The task is detached from the caller; aborting the returned handle
    /// cancels the deletion.
    pub fn schedule_cleanup(&self, model: &str) -> JoinHandle<()> {
        let tracker = self.clone();
        let model = model.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(tracker.cleanup_after).await;
            if tracker.delete(&model).await.is_some() {
                debug!(model = %model, "download tracking expired");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_overwrites_wholesale() {
        let tracker = DownloadTracker::default();
        tracker.set("llama3", ProgressRecord::starting()).await;
        tracker.set("llama3", ProgressRecord::failed("offline")).await;

        let rec = tracker.get("llama3").await.unwrap();
        assert_eq!(rec, ProgressRecord::failed("offline"));
        assert_eq!(tracker.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let tracker = DownloadTracker::default();
        assert!(tracker.delete("nope").await.is_none());
        assert!(tracker.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let tracker = DownloadTracker::default();
        let other = tracker.clone();
        tracker.set("mistral", ProgressRecord::starting()).await;
        assert!(other.get("mistral").await.is_some());
        assert!(DownloadTracker::default().get("mistral").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_waits_for_delay() {
        let tracker = DownloadTracker::new(Duration::from_secs(300));
        tracker.set("llama3", ProgressRecord::completed()).await;
        let handle = tracker.schedule_cleanup("llama3");

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert!(tracker.get("llama3").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.await.unwrap();
        assert!(tracker.get("llama3").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_can_be_cancelled() {
        let tracker = DownloadTracker::new(Duration::from_secs(10));
        tracker.set("phi3", ProgressRecord::completed()).await;
        let handle = tracker.schedule_cleanup("phi3");
        handle.abort();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(tracker.get("phi3").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_only_touches_its_model() {
        let tracker = DownloadTracker::new(Duration::from_secs(5));
        tracker.set("a", ProgressRecord::completed()).await;
        tracker.set("b", ProgressRecord::starting()).await;
        tracker.schedule_cleanup("a").await.unwrap();

        assert!(tracker.get("a").await.is_none());
        assert!(tracker.get("b").await.is_some());
    }
}
