//! Refreshable handle on the current station directory.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::client::FeedClient;
use super::directory::StationDirectory;
use super::error::FeedError;

/// Thread-safe access to the latest directory snapshot.
///
/// Readers take an `Arc` snapshot and release the lock immediately, so a
/// plan in progress keeps the directory it started with even if a refresh
/// lands meanwhile.
#[derive(Debug, Clone)]
pub struct SharedDirectory {
    inner: Arc<RwLock<Arc<StationDirectory>>>,
    client: Option<FeedClient>,
}

impl SharedDirectory {
    /// Wrap a directory that is never refreshed.
    pub fn new(directory: StationDirectory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(directory))),
            client: None,
        }
    }

    /// Attach the client used by [`refresh`](Self::refresh).
    pub fn with_client(mut self, client: FeedClient) -> Self {
        self.client = Some(client);
        self
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<StationDirectory> {
        let guard = self.inner.read().await;
        Arc::clone(&guard)
    }

    /// Swap in a new directory.
    pub async fn replace(&self, directory: StationDirectory) {
        let mut guard = self.inner.write().await;
        *guard = Arc::new(directory);
    }

    /// Refresh from the feed.
    ///
    /// On success, replaces the current snapshot and returns the new
    /// station count. On failure, or if the feed came back empty, the
    /// existing snapshot is preserved and the error is returned.
    pub async fn refresh(&self) -> Result<usize, FeedError> {
        let client = self.client.as_ref().ok_or(FeedError::NoClient)?;
        let directory = StationDirectory::try_fetch(client).await?;
        let count = directory.len();

        self.replace(directory).await;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StationId, StationRecord};
    use crate::stations::FeedClientConfig;

    fn one_station() -> StationDirectory {
        StationDirectory::new(vec![StationRecord {
            id: StationId(1),
            name: "Abbey Road".to_string(),
            is_valid: true,
            ..Default::default()
        }])
    }

    #[tokio::test]
    async fn snapshot_survives_replace() {
        let shared = SharedDirectory::new(one_station());
        let before = shared.snapshot().await;

        shared.replace(StationDirectory::empty()).await;

        assert_eq!(before.len(), 1);
        assert!(shared.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn refresh_without_client_fails() {
        let shared = SharedDirectory::new(one_station());

        assert!(matches!(shared.refresh().await, Err(FeedError::NoClient)));
        assert_eq!(shared.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_old_snapshot() {
        // Nothing listens on port 9 locally; the fetch fails fast
        let client = FeedClient::new(
            FeedClientConfig::new()
                .with_url("http://127.0.0.1:9/feed.xml")
                .with_timeout_secs(2),
        )
        .unwrap();
        let shared = SharedDirectory::new(one_station()).with_client(client);

        assert!(shared.refresh().await.is_err());
        assert_eq!(shared.snapshot().await.len(), 1);
    }
}
