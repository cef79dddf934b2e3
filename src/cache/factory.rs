// ABOUTME: Cache factory for configuration-based backend selection
// ABOUTME: Dispatches to Redis when a URL is configured and to the in-memory cache otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{memory::InMemoryCache, redis::RedisCache, CacheConfig, CacheKey, CacheProvider};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unified cache interface over the available backends
#[derive(Clone)]
pub enum Cache {
    /// Process-local LRU cache
    Memory(InMemoryCache),
    /// Shared Redis cache
    Redis(RedisCache),
}

impl Cache {
    /// Create new cache instance based on configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    pub async fn new(config: CacheConfig) -> AppResult<Self> {
        if config.redis_url.is_some() {
            tracing::info!("Initializing Redis cache");
            Ok(Self::Redis(RedisCache::new(config).await?))
        } else {
            tracing::info!(
                max_entries = config.max_entries,
                "Initializing in-memory cache"
            );
            Ok(Self::Memory(InMemoryCache::new(config).await?))
        }
    }

    /// Name of the active backend
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }

    /// Store value in cache with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    pub async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.set(key, value, ttl).await,
            Self::Redis(cache) => cache.set(key, value, ttl).await,
        }
    }

    /// Retrieve value from cache
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or deserialization fails
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
        }
    }

    /// Remove single cache entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.invalidate(key).await,
            Self::Redis(cache) => cache.invalidate(key).await,
        }
    }

    /// Remove all cache entries matching pattern
    ///
    /// # Errors
    ///
    /// Returns an error if pattern invalidation fails
    pub async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        match self {
            Self::Memory(cache) => cache.invalidate_pattern(pattern).await,
            Self::Redis(cache) => cache.invalidate_pattern(pattern).await,
        }
    }

    /// Check if key exists in cache
    ///
    /// # Errors
    ///
    /// Returns an error if existence check fails
    pub async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        match self {
            Self::Memory(cache) => cache.exists(key).await,
            Self::Redis(cache) => cache.exists(key).await,
        }
    }

    /// Get remaining TTL for key
    ///
    /// # Errors
    ///
    /// Returns an error if TTL check fails
    pub async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        match self {
            Self::Memory(cache) => cache.ttl(key).await,
            Self::Redis(cache) => cache.ttl(key).await,
        }
    }

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if health check fails
    pub async fn health_check(&self) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.health_check().await,
            Self::Redis(cache) => cache.health_check().await,
        }
    }

    /// Clear all cache entries
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    pub async fn clear_all(&self) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.clear_all().await,
            Self::Redis(cache) => cache.clear_all().await,
        }
    }
}
