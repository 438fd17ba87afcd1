//! Per-viewer read snapshots using moka
//!
//! Each viewer keeps its own snapshot of a worksheet for the freshness
//! window. Writes never invalidate snapshots; a new row shows up for a viewer
//! once that viewer's snapshot has expired.

use crate::types::{SheetRow, ViewerId, WorksheetId};
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Shared, immutable worksheet rows
pub type Snapshot = Arc<Vec<SheetRow>>;

/// Whether a lookup was served from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Fresh snapshot reused
    Hit,
    /// Store queried
    Miss,
}

/// Cache key: one snapshot per viewer and worksheet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    viewer: ViewerId,
    worksheet: WorksheetId,
}

impl SnapshotKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(viewer: ViewerId, worksheet: WorksheetId) -> Self {
        Self { viewer, worksheet }
    }
}

/// TTL cache of worksheet snapshots
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    inner: Cache<SnapshotKey, Snapshot>,
    freshness: Duration,
}

impl SnapshotCache {
    /// Create cache with max capacity and freshness window
    #[must_use]
    pub fn new(max_capacity: u64, freshness: Duration) -> Self {
        let inner = if freshness.is_zero() {
            Cache::new(max_capacity)
        } else {
            Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(freshness)
                .build()
        };

        Self { inner, freshness }
    }

    /// Fresh snapshot for key, if any
    #[inline]
    pub async fn get(&self, key: &SnapshotKey) -> Option<Snapshot> {
        if self.freshness.is_zero() {
            return None;
        }
        self.inner.get(key).await
    }

    /// Store snapshot for key
    #[inline]
    pub async fn insert(&self, key: SnapshotKey, snapshot: Snapshot) {
        if self.freshness.is_zero() {
            return;
        }
        self.inner.insert(key, snapshot).await;
    }

    /// Return the fresh snapshot or fetch and store a new one
    ///
    /// Fetch failures are returned as-is and nothing is cached.
    pub async fn try_get_or_fetch<E, F, Fut>(
        &self,
        key: SnapshotKey,
        fetch: F,
    ) -> Result<(Snapshot, CacheOutcome), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<SheetRow>, E>>,
    {
        if let Some(cached) = self.get(&key).await {
            return Ok((cached, CacheOutcome::Hit));
        }

        let snapshot: Snapshot = Arc::new(fetch().await?);
        self.insert(key, Arc::clone(&snapshot)).await;

        Ok((snapshot, CacheOutcome::Miss))
    }

    /// Drop every snapshot
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for SnapshotCache {
    /// 10,000 viewers, 5 second freshness
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn rows(n: usize) -> Vec<SheetRow> {
        (0..n)
            .map(|i| SheetRow::from_cells(["A".to_string(), format!("q{i}")]))
            .collect()
    }

    #[tokio::test]
    async fn second_lookup_hits() {
        let cache = SnapshotCache::new(100, Duration::from_secs(60));
        let key = SnapshotKey::new(ViewerId::new(), WorksheetId::default());
        let calls = AtomicUsize::new(0);

        let (first, outcome) = cache
            .try_get_or_fetch(key.clone(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(rows(2))
            })
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Miss);
        assert_eq!(first.len(), 2);

        let (second, outcome) = cache
            .try_get_or_fetch(key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(rows(5))
            })
            .await
            .unwrap();
        assert_eq!(outcome, CacheOutcome::Hit);
        assert_eq!(second.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn viewers_do_not_share_snapshots() {
        let cache = SnapshotCache::new(100, Duration::from_secs(60));
        let sheet = WorksheetId::default();
        let alice = SnapshotKey::new(ViewerId::new(), sheet.clone());
        let bob = SnapshotKey::new(ViewerId::new(), sheet);

        cache.insert(alice.clone(), Arc::new(rows(1))).await;

        assert!(cache.get(&alice).await.is_some());
        assert!(cache.get(&bob).await.is_none());
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = SnapshotCache::new(100, Duration::from_secs(60));
        let key = SnapshotKey::new(ViewerId::new(), WorksheetId::default());

        let err = cache
            .try_get_or_fetch(key.clone(), || async { Err::<Vec<SheetRow>, _>("down") })
            .await
            .unwrap_err();
        assert_eq!(err, "down");
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn snapshot_expires_after_freshness_window() {
        let cache = SnapshotCache::new(100, Duration::from_millis(50));
        let key = SnapshotKey::new(ViewerId::new(), WorksheetId::default());

        cache.insert(key.clone(), Arc::new(rows(1))).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn zero_freshness_always_fetches() {
        let cache = SnapshotCache::new(100, Duration::ZERO);
        let key = SnapshotKey::new(ViewerId::new(), WorksheetId::default());

        cache.insert(key.clone(), Arc::new(rows(1))).await;
        assert!(cache.get(&key).await.is_none());
    }
}
