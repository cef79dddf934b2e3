// ABOUTME: Cache abstraction layer backing the time-boxed draft store
// ABOUTME: Pluggable backend support (in-memory, Redis) behind one async provider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Cache factory for selecting a backend from configuration
pub mod factory;
/// In-memory cache implementation
pub mod memory;
/// Redis cache implementation
pub mod redis;

pub use crate::config::cache::CacheConfig;
pub use factory::Cache;

use crate::constants::drafts::DRAFT_KEY_PREFIX;
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Cache provider trait for pluggable backend implementations
///
/// Values are stored as JSON; every write replaces the whole value and resets its TTL.
///
/// # Examples
///
/// ```rust,no_run
/// use recipe_forge::cache::{CacheConfig, CacheKey, CacheProvider};
/// use recipe_forge::cache::memory::InMemoryCache;
/// use std::time::Duration;
/// # async fn example() -> Result<(), recipe_forge::errors::AppError> {
///
/// let config = CacheConfig {
///     enable_background_cleanup: false,
///     ..Default::default()
/// };
/// let cache = InMemoryCache::new(config).await?;
///
/// let key = CacheKey::recipe_draft("3f2c");
/// cache.set(&key, &"draft body", Duration::from_secs(60)).await?;
/// let cached: Option<String> = cache.get(&key).await?;
/// assert_eq!(cached.as_deref(), Some("draft body"));
/// cache.invalidate(&key).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync + Clone {
    /// Create new cache instance with configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Store value in cache with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Retrieve value from cache, `None` when missing or expired
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or deserialization fails
    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>>;

    /// Remove single cache entry; removing a missing entry succeeds
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Remove all cache entries matching a glob pattern (e.g. `recipe:draft:*`)
    ///
    /// # Errors
    ///
    /// Returns an error if pattern invalidation fails
    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64>;

    /// Check if key exists in cache
    ///
    /// # Errors
    ///
    /// Returns an error if existence check fails
    async fn exists(&self, key: &CacheKey) -> AppResult<bool>;

    /// Get remaining TTL for key
    ///
    /// # Errors
    ///
    /// Returns an error if TTL check fails
    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>>;

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if health check fails
    async fn health_check(&self) -> AppResult<()>;

    /// Clear all cache entries (for testing/admin)
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Literal cache key; identical in every backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wrap an arbitrary key
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a recipe draft: `recipe:draft:<id>`
    #[must_use]
    pub fn recipe_draft(id: &str) -> Self {
        Self(format!("{DRAFT_KEY_PREFIX}{id}"))
    }

    /// Borrow the key text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
