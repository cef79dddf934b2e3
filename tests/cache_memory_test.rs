// ABOUTME: Unit tests for in-memory cache implementation
// ABOUTME: Tests TTL expiration, capacity limits, pattern invalidation and background cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use anyhow::Result;
use recipe_forge::cache::{Cache, CacheConfig, CacheKey};
use recipe_forge::errors::ErrorCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TestData {
    value: String,
    count: u32,
}

/// Helper: Create a unique draft key
fn test_draft_key() -> CacheKey {
    CacheKey::recipe_draft(&Uuid::new_v4().to_string())
}

/// Helper: Create in-memory cache with custom config
async fn create_test_cache(max_entries: usize, background_cleanup: bool) -> Result<Cache> {
    let config = CacheConfig {
        max_entries,
        redis_url: None,
        cleanup_interval: Duration::from_millis(200),
        enable_background_cleanup: background_cleanup,
        ..CacheConfig::default()
    };
    Ok(Cache::new(config).await?)
}

#[tokio::test]
async fn test_cache_set_and_get() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let key = test_draft_key();
    let data = TestData {
        value: "test".to_owned(),
        count: 42,
    };

    cache.set(&key, &data, Duration::from_secs(10)).await?;

    let retrieved: Option<TestData> = cache.get(&key).await?;
    assert_eq!(retrieved, Some(data));
    Ok(())
}

#[tokio::test]
async fn test_cache_expiration() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let key = test_draft_key();
    let data = TestData {
        value: "expires".to_owned(),
        count: 1,
    };

    cache.set(&key, &data, Duration::from_secs(1)).await?;
    assert!(cache.exists(&key).await?);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let retrieved: Option<TestData> = cache.get(&key).await?;
    assert_eq!(retrieved, None);
    assert!(!cache.exists(&key).await?);
    assert!(cache.ttl(&key).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_cache_ttl_reports_remaining_time() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let key = test_draft_key();

    cache.set(&key, &"value", Duration::from_secs(3600)).await?;

    let ttl = cache.ttl(&key).await?.unwrap();
    assert!(ttl <= Duration::from_secs(3600));
    assert!(ttl > Duration::from_secs(3590));
    Ok(())
}

#[tokio::test]
async fn test_cache_set_overwrites_and_resets_ttl() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let key = test_draft_key();

    cache.set(&key, &"first", Duration::from_secs(10)).await?;
    cache.set(&key, &"second", Duration::from_secs(3600)).await?;

    let value: Option<String> = cache.get(&key).await?;
    assert_eq!(value.as_deref(), Some("second"));
    assert!(cache.ttl(&key).await?.unwrap() > Duration::from_secs(10));
    Ok(())
}

#[tokio::test]
async fn test_cache_invalidate() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let key = test_draft_key();

    cache.set(&key, &"value", Duration::from_secs(60)).await?;
    cache.invalidate(&key).await?;
    assert!(!cache.exists(&key).await?);

    // Invalidating a missing key is not an error
    cache.invalidate(&key).await?;
    Ok(())
}

#[tokio::test]
async fn test_cache_invalidate_pattern() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let drafts = [test_draft_key(), test_draft_key(), test_draft_key()];
    let other = CacheKey::new("session:abc");

    for key in &drafts {
        cache.set(key, &"draft", Duration::from_secs(60)).await?;
    }
    cache.set(&other, &"session", Duration::from_secs(60)).await?;

    let removed = cache.invalidate_pattern("recipe:draft:*").await?;
    assert_eq!(removed, 3);
    for key in &drafts {
        assert!(!cache.exists(key).await?);
    }
    assert!(cache.exists(&other).await?);
    Ok(())
}

#[tokio::test]
async fn test_cache_invalid_pattern_is_rejected() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let error = cache.invalidate_pattern("recipe:[").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
    Ok(())
}

#[tokio::test]
async fn test_cache_capacity_eviction() -> Result<()> {
    let cache = create_test_cache(3, false).await?;
    let keys: Vec<CacheKey> = (0..4).map(|_| test_draft_key()).collect();

    for (i, key) in keys.iter().enumerate() {
        cache.set(key, &i, Duration::from_secs(60)).await?;
    }

    // The least recently used entry is evicted
    assert!(!cache.exists(&keys[0]).await?);
    for key in &keys[1..] {
        assert!(cache.exists(key).await?);
    }
    Ok(())
}

#[tokio::test]
async fn test_cache_background_cleanup() -> Result<()> {
    let cache = create_test_cache(100, true).await?;
    let key = test_draft_key();

    cache.set(&key, &"short", Duration::from_millis(100)).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    // The reaper already dropped the entry, so nothing is left to match
    assert_eq!(cache.invalidate_pattern("*").await?, 0);
    assert!(!cache.exists(&key).await?);
    Ok(())
}

#[tokio::test]
async fn test_cache_clear_all() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    let keys = [test_draft_key(), test_draft_key()];
    for key in &keys {
        cache.set(key, &"value", Duration::from_secs(60)).await?;
    }

    cache.clear_all().await?;

    for key in &keys {
        assert!(!cache.exists(key).await?);
    }
    Ok(())
}

#[tokio::test]
async fn test_cache_health_check() -> Result<()> {
    let cache = create_test_cache(100, false).await?;
    cache.health_check().await?;
    assert_eq!(cache.backend_name(), "memory");
    Ok(())
}
