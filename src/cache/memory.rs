// ABOUTME: In-memory cache implementation with LRU eviction and TTL support
// ABOUTME: Includes background cleanup task for expired entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{CacheConfig, CacheKey, CacheProvider};
use crate::errors::{AppError, AppResult};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};

/// In-memory cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

type Store = Arc<RwLock<LruCache<String, CacheEntry>>>;

/// In-memory cache with LRU eviction and background cleanup
///
/// The store is shared with the reaper task spawned in `new_with_config`.
/// Expired entries are also dropped lazily on read, so correctness does not
/// depend on the reaper running.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Store,
    shutdown_tx: Option<Arc<mpsc::Sender<()>>>,
}

impl InMemoryCache {
    const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    fn new_with_config(config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CACHE_CAPACITY);
        let store: Store = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = if config.enable_background_cleanup {
            let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
            let reaper_store = Arc::clone(&store);
            let cleanup_interval = config.cleanup_interval;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(cleanup_interval);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            Self::cleanup_expired(&reaper_store).await;
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::debug!("Cache cleanup task received shutdown signal");
                            break;
                        }
                    }
                }
            });

            Some(Arc::new(shutdown_tx))
        } else {
            None
        };

        Self { store, shutdown_tx }
    }

    async fn cleanup_expired(store: &Store) {
        let mut guard = store.write().await;
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            guard.pop(key);
        }
        drop(guard);

        if !expired.is_empty() {
            tracing::debug!(removed = expired.len(), "Cleaned up expired cache entries");
        }
    }

    /// Look up a live entry, evicting it if it has expired
    async fn live_entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut guard = self.store.write().await;
        let entry = guard.get(key.as_str())?.clone();
        if entry.is_expired() {
            guard.pop(key.as_str());
            return None;
        }
        Some(entry)
    }
}

#[async_trait::async_trait]
impl CacheProvider for InMemoryCache {
    async fn new(config: CacheConfig) -> AppResult<Self> {
        Ok(Self::new_with_config(&config))
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(value)?;
        self.store
            .write()
            .await
            .push(key.as_str().to_owned(), CacheEntry::new(serialized, ttl));
        Ok(())
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        match self.live_entry(key).await {
            Some(entry) => Ok(Some(serde_json::from_slice(&entry.data)?)),
            None => Ok(None),
        }
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.store.write().await.pop(key.as_str());
        Ok(())
    }

    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        let glob_pattern = glob::Pattern::new(pattern).map_err(|e| {
            AppError::invalid_input(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        let mut guard = self.store.write().await;
        let matching: Vec<String> = guard
            .iter()
            .filter(|(key, _)| glob_pattern.matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            guard.pop(key);
        }
        drop(guard);

        Ok(matching.len() as u64)
    }

    async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        let guard = self.store.read().await;
        Ok(guard
            .peek(key.as_str())
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::remaining_ttl))
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.store.write().await.clear();
        Ok(())
    }
}

impl Drop for InMemoryCache {
    fn drop(&mut self) {
        // Only the last handle stops the reaper; clones share it.
        if let Some(tx) = &self.shutdown_tx {
            if Arc::strong_count(tx) == 1 {
                if let Err(e) = tx.try_send(()) {
                    tracing::debug!(error = ?e, "Cache shutdown signal send failed (channel likely closed)");
                }
            }
        }
    }
}
