// ABOUTME: Cache backend and draft retention configuration types
// ABOUTME: Handles Redis connection tuning, in-memory capacity and the draft TTL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::env_or;
use crate::constants::cache::{redis, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CLEANUP_INTERVAL_SECS};
use crate::constants::drafts::DRAFT_TTL_SECS;
use crate::errors::{AppError, AppResult};
use std::env;
use std::time::Duration;

/// Cache configuration for Redis and in-memory backends
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (for in-memory cache)
    pub max_entries: usize,
    /// Redis connection URL; selects the Redis backend when set
    pub redis_url: Option<String>,
    /// Cleanup interval for expired entries
    pub cleanup_interval: Duration,
    /// Enable background cleanup task (should be false in tests to avoid runtime conflicts)
    pub enable_background_cleanup: bool,
    /// Redis connection and retry configuration
    pub redis_connection: RedisConnectionConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            redis_url: None,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
            redis_connection: RedisConnectionConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Load cache configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_entries: env_or("CACHE_MAX_ENTRIES", DEFAULT_CACHE_MAX_ENTRIES),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            cleanup_interval: Duration::from_secs(env_or(
                "CACHE_CLEANUP_INTERVAL_SECS",
                DEFAULT_CLEANUP_INTERVAL_SECS,
            )),
            enable_background_cleanup: true,
            redis_connection: RedisConnectionConfig::from_env(),
        }
    }

    /// Check invariants that would otherwise surface at first use
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the Redis URL is malformed or the
    /// cleanup interval is zero
    pub fn validate(&self) -> AppResult<()> {
        if let Some(url) = &self.redis_url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(AppError::config_invalid(format!(
                    "REDIS_URL must use the redis:// or rediss:// scheme, got '{url}'"
                )));
            }
        }
        if self.enable_background_cleanup && self.cleanup_interval.is_zero() {
            return Err(AppError::config_invalid(
                "CACHE_CLEANUP_INTERVAL_SECS must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Redis connection and retry configuration
#[derive(Debug, Clone)]
pub struct RedisConnectionConfig {
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
    /// Response/command timeout in seconds
    pub response_timeout_secs: u64,
    /// Number of reconnection retries after connection drop
    pub reconnection_retries: usize,
    /// Exponential backoff base for retry delays
    pub retry_exponent_base: u64,
    /// Maximum retry delay in milliseconds
    pub max_retry_delay_ms: u64,
    /// Number of retries for initial connection at startup
    pub initial_connection_retries: u32,
    /// Initial retry delay in milliseconds (doubles with exponential backoff)
    pub initial_retry_delay_ms: u64,
}

impl Default for RedisConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: redis::CONNECTION_TIMEOUT_SECS,
            response_timeout_secs: redis::RESPONSE_TIMEOUT_SECS,
            reconnection_retries: redis::RECONNECTION_RETRIES,
            retry_exponent_base: redis::RETRY_EXPONENT_BASE,
            max_retry_delay_ms: redis::MAX_RETRY_DELAY_MS,
            initial_connection_retries: redis::INITIAL_CONNECTION_RETRIES,
            initial_retry_delay_ms: redis::INITIAL_RETRY_DELAY_MS,
        }
    }
}

impl RedisConnectionConfig {
    /// Load Redis connection configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            connection_timeout_secs: env_or(
                "REDIS_CONNECTION_TIMEOUT_SECS",
                redis::CONNECTION_TIMEOUT_SECS,
            ),
            response_timeout_secs: env_or(
                "REDIS_RESPONSE_TIMEOUT_SECS",
                redis::RESPONSE_TIMEOUT_SECS,
            ),
            reconnection_retries: env_or(
                "REDIS_RECONNECTION_RETRIES",
                redis::RECONNECTION_RETRIES,
            ),
            retry_exponent_base: env_or("REDIS_RETRY_EXPONENT_BASE", redis::RETRY_EXPONENT_BASE),
            max_retry_delay_ms: env_or("REDIS_MAX_RETRY_DELAY_MS", redis::MAX_RETRY_DELAY_MS),
            initial_connection_retries: env_or(
                "REDIS_INITIAL_CONNECTION_RETRIES",
                redis::INITIAL_CONNECTION_RETRIES,
            ),
            initial_retry_delay_ms: env_or(
                "REDIS_INITIAL_RETRY_DELAY_MS",
                redis::INITIAL_RETRY_DELAY_MS,
            ),
        }
    }
}

/// Draft store configuration
#[derive(Debug, Clone)]
pub struct DraftStoreConfig {
    /// How long an untouched draft survives
    pub ttl: Duration,
}

impl Default for DraftStoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DRAFT_TTL_SECS),
        }
    }
}

impl DraftStoreConfig {
    /// Load draft store configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            ttl: Duration::from_secs(env_or("RECIPE_DRAFT_TTL_SECS", DRAFT_TTL_SECS)),
        }
    }

    /// Validate the retention window
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TTL is zero
    pub fn validate(&self) -> AppResult<()> {
        if self.ttl.is_zero() {
            return Err(AppError::config_invalid(
                "RECIPE_DRAFT_TTL_SECS must be greater than zero",
            ));
        }
        Ok(())
    }
}
