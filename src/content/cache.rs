//! Content list cache
//!
//! Wraps a [`ContentSource`] behind a TTL gate. Readers get an
//! `Arc<CacheSnapshot>`; a refresh builds a complete new snapshot and swaps it
//! in, so no reader ever sees a half-built list.
//!
//! Refresh policy: at most one refresh in flight. Callers that find the
//! snapshot stale queue on a mutex; once inside, a non-forced caller re-checks
//! freshness and reuses the snapshot produced while it waited. A forced caller
//! always reloads exactly once.
//!
//! A refresh that comes back empty (for example because the directory could
//! not be listed) still counts as a refresh. The next reload is attempted only
//! after the TTL elapses again, so a failing source is not hit on every
//! request. Meanwhile the empty list is served.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::loader::{ContentLoader, ContentSource};
use super::record::ContentRecord;
use crate::logger;

/// Default time-to-live of a snapshot
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// One complete, immutable result of a full load
#[derive(Debug)]
pub struct CacheSnapshot {
    records: Vec<ContentRecord>,
    refreshed_at: Instant,
    generation: u64,
}

impl CacheSnapshot {
    /// Records, newest first
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    pub const fn refreshed_at(&self) -> Instant {
        self.refreshed_at
    }

    /// Sequence number of the load that produced this snapshot (starts at 1)
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// TTL-gated cache of the full content listing
pub struct ContentCache<S = ContentLoader> {
    source: S,
    ttl: Duration,
    snapshot: ArcSwapOption<CacheSnapshot>,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl<S: ContentSource> ContentCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: ArcSwapOption::empty(),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_default_ttl(source: S) -> Self {
        Self::new(source, DEFAULT_TTL)
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Current snapshot without triggering a refresh; `None` until first load
    pub fn current(&self) -> Option<Arc<CacheSnapshot>> {
        self.snapshot.load_full()
    }

    fn fresh_snapshot(&self) -> Option<Arc<CacheSnapshot>> {
        self.current()
            .filter(|snap| snap.refreshed_at.elapsed() <= self.ttl)
    }

    /// Return the listing, reloading it when forced, empty or expired.
    pub async fn get(&self, force_refresh: bool) -> Arc<CacheSnapshot> {
        if !force_refresh {
            if let Some(snap) = self.fresh_snapshot() {
                return snap;
            }
        }

        let _guard = self.refresh_lock.lock().await;
        if !force_refresh {
            // Another caller may have refreshed while we waited for the lock
            if let Some(snap) = self.fresh_snapshot() {
                return snap;
            }
        }
        self.reload().await
    }

    /// Force a reload; shorthand for `get(true)`
    pub async fn refresh(&self) -> Arc<CacheSnapshot> {
        self.get(true).await
    }

    /// Load one record straight from the source, bypassing the snapshot
    pub async fn get_one(&self, identifier: &str) -> Option<ContentRecord> {
        self.source.load_one(identifier).await
    }

    /// Must be called with `refresh_lock` held
    async fn reload(&self) -> Arc<CacheSnapshot> {
        let records = self.source.load_all().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(CacheSnapshot {
            records,
            refreshed_at: Instant::now(),
            generation,
        });
        self.snapshot.store(Some(Arc::clone(&snapshot)));
        logger::log_cache_refresh(snapshot.len(), generation);
        snapshot
    }
}
