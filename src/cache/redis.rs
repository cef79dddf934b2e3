// ABOUTME: Redis cache implementation with managed connections and TTL support
// ABOUTME: Lets several pipeline instances share one draft store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{CacheConfig, CacheKey, CacheProvider};
use crate::config::cache::RedisConnectionConfig;
use crate::constants::cache::redis::SCAN_BATCH_SIZE;
use crate::errors::{AppError, AppResult};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

/// Pattern covering every key this crate writes
const OWNED_KEY_PATTERN: &str = "recipe:*";

/// Redis cache implementation
///
/// Keys are written verbatim, so a draft lives at `recipe:draft:<id>` in Redis.
/// Expiry is delegated to Redis (`SET EX`); pattern deletion walks the keyspace with `SCAN`.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

fn store_error(operation: &str, e: &redis::RedisError) -> AppError {
    error!(operation, error = %e, "Redis operation failed");
    AppError::store_unavailable(format!("Redis {operation} failed: {e}"))
}

impl RedisCache {
    async fn new_with_config(config: &CacheConfig) -> AppResult<Self> {
        let redis_url = config.redis_url.as_ref().ok_or_else(|| {
            AppError::config_missing("REDIS_URL is required for the Redis cache backend")
        })?;
        let conn_config = &config.redis_connection;

        info!(
            timeout_secs = conn_config.connection_timeout_secs,
            response_timeout_secs = conn_config.response_timeout_secs,
            retries = conn_config.initial_connection_retries,
            "Connecting to Redis"
        );

        let client = redis::Client::open(redis_url.as_str()).map_err(|e| {
            AppError::config_invalid(format!("Failed to create Redis client: {e}"))
        })?;
        let manager = Self::connect_with_retry(&client, conn_config).await?;

        info!("Successfully connected to Redis");
        Ok(Self { manager })
    }

    /// Connect to Redis with exponential backoff retry on failure
    async fn connect_with_retry(
        client: &redis::Client,
        conn_config: &RedisConnectionConfig,
    ) -> AppResult<ConnectionManager> {
        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(conn_config.connection_timeout_secs))
            .set_response_timeout(Duration::from_secs(conn_config.response_timeout_secs))
            .set_number_of_retries(conn_config.reconnection_retries)
            .set_exponent_base(conn_config.retry_exponent_base)
            .set_max_delay(conn_config.max_retry_delay_ms);

        let max_retries = conn_config.initial_connection_retries;
        let mut delay_ms = conn_config.initial_retry_delay_ms;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match ConnectionManager::new_with_config(client.clone(), manager_config.clone()).await {
                Ok(manager) => {
                    if attempt > 0 {
                        info!(retries = attempt, "Redis connection established after retries");
                    }
                    return Ok(manager);
                }
                Err(e) => {
                    if attempt < max_retries {
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = max_retries + 1,
                            delay_ms,
                            error = %e,
                            "Redis connection attempt failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(conn_config.max_retry_delay_ms);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::store_unavailable(format!(
            "Failed to connect to Redis after {} attempts: {}",
            max_retries + 1,
            last_error.map_or_else(|| "unknown error".to_owned(), |e| e.to_string())
        )))
    }

    /// Delete every key matching `pattern`, returning how many were removed
    async fn scan_delete(&self, pattern: &str) -> AppResult<u64> {
        let mut conn = self.manager.clone();
        let mut cursor = 0u64;
        let mut count = 0u64;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await
                .map_err(|e| store_error("SCAN", &e))?;

            if !keys.is_empty() {
                let deleted: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| store_error("DEL", &e))?;
                count += deleted;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(count)
    }
}

#[async_trait::async_trait]
impl CacheProvider for RedisCache {
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized,
    {
        Self::new_with_config(&config).await
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(value)?;
        // SET EX rejects zero; sub-second TTLs round up to one second.
        let ttl_secs = ttl.as_secs().max(1);
        let mut conn = self.manager.clone();

        conn.set_ex::<_, _, ()>(key.as_str(), serialized, ttl_secs)
            .await
            .map_err(|e| store_error("SET", &e))
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let mut conn = self.manager.clone();
        let data: Option<Vec<u8>> = conn
            .get(key.as_str())
            .await
            .map_err(|e| store_error("GET", &e))?;

        data.map(|bytes| serde_json::from_slice(&bytes).map_err(AppError::from))
            .transpose()
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .del(key.as_str())
            .await
            .map_err(|e| store_error("DEL", &e))?;
        Ok(())
    }

    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64> {
        self.scan_delete(pattern).await
    }

    async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        conn.exists(key.as_str())
            .await
            .map_err(|e| store_error("EXISTS", &e))
    }

    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        let mut conn = self.manager.clone();
        let ttl_secs: i64 = conn
            .ttl(key.as_str())
            .await
            .map_err(|e| store_error("TTL", &e))?;

        // -2: missing key, -1: no expiry
        Ok(u64::try_from(ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs))
    }

    async fn health_check(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let response: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("PING", &e))?;

        if response == "PONG" {
            Ok(())
        } else {
            Err(AppError::store_unavailable(format!(
                "unexpected PING response '{response}'"
            )))
        }
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.scan_delete(OWNED_KEY_PATTERN).await.map(|_| ())
    }
}
