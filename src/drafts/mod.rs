// ABOUTME: Time-boxed repository for in-progress recipe drafts over the pluggable cache
// ABOUTME: Every write stores the full draft under recipe:draft:<id> and resets its expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Draft Store
//!
//! Drafts are written whole; there are no partial-field updates. Backend
//! failures of any kind surface as `STORE_UNAVAILABLE` and are never retried
//! here. Concurrent writers to one draft race with last-writer-wins semantics.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cache::{Cache, CacheKey};
use crate::config::DraftStoreConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::recipes::RecipeDraft;

/// Draft repository with a fixed retention window
#[derive(Clone)]
pub struct DraftStore {
    cache: Cache,
    ttl: Duration,
}

impl DraftStore {
    /// Create a store over an initialised cache backend
    #[must_use]
    pub const fn new(cache: Cache, config: &DraftStoreConfig) -> Self {
        Self {
            cache,
            ttl: config.ttl,
        }
    }

    /// Retention window applied on every write
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Name of the backend in use
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Assign an ID and timestamps, then persist the draft
    ///
    /// Any ID already on `draft` is replaced.
    ///
    /// # Errors
    ///
    /// Returns `STORE_UNAVAILABLE` if the backend write fails
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn save(&self, mut draft: RecipeDraft) -> AppResult<RecipeDraft> {
        let now = Utc::now();
        draft.id = Uuid::new_v4().to_string();
        draft.created_at = now;
        draft.updated_at = now;

        let result = self.write(&draft).await;
        AppLogger::log_draft_operation("save", &draft.id, result.is_ok());
        result.map(|()| draft)
    }

    /// Fetch a draft
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for an empty ID
    /// - `RESOURCE_NOT_FOUND` when the draft never existed or has expired
    /// - `STORE_UNAVAILABLE` on backend failure
    pub async fn get(&self, id: &str) -> AppResult<RecipeDraft> {
        let key = Self::key(id)?;
        self.cache
            .get::<RecipeDraft>(&key)
            .await
            .map_err(into_store_error)?
            .ok_or_else(|| AppError::not_found(format!("Recipe draft {id}")).with_resource_id(id))
    }

    /// Persist a modified draft, refreshing `updated_at` and the retention window
    ///
    /// Does not check that the draft still exists, so an expired draft is
    /// recreated. `updated_at` always moves strictly forward.
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` when the draft has no ID
    /// - `STORE_UNAVAILABLE` if the backend write fails
    #[instrument(skip(self, draft), fields(draft_id = %draft.id))]
    pub async fn update(&self, mut draft: RecipeDraft) -> AppResult<RecipeDraft> {
        Self::key(&draft.id)?;

        let floor = draft.updated_at + TimeDelta::microseconds(1);
        draft.updated_at = Utc::now().max(floor);

        let result = self.write(&draft).await;
        AppLogger::log_draft_operation("update", &draft.id, result.is_ok());
        result.map(|()| draft)
    }

    /// Remove a draft; removing a missing draft succeeds
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for an empty ID
    /// - `STORE_UNAVAILABLE` on backend failure
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let key = Self::key(id)?;
        let result = self.cache.invalidate(&key).await.map_err(into_store_error);
        AppLogger::log_draft_operation("delete", id, result.is_ok());
        result
    }

    /// Whether a live draft is stored under `id`
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for an empty ID
    /// - `STORE_UNAVAILABLE` on backend failure
    pub async fn exists(&self, id: &str) -> AppResult<bool> {
        let key = Self::key(id)?;
        self.cache.exists(&key).await.map_err(into_store_error)
    }

    /// Time left before the draft expires, `None` when it is gone
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for an empty ID
    /// - `STORE_UNAVAILABLE` on backend failure
    pub async fn remaining_ttl(&self, id: &str) -> AppResult<Option<Duration>> {
        let key = Self::key(id)?;
        self.cache.ttl(&key).await.map_err(into_store_error)
    }

    /// Probe the backend
    ///
    /// # Errors
    ///
    /// Returns `STORE_UNAVAILABLE` if the backend does not answer
    pub async fn health_check(&self) -> AppResult<()> {
        self.cache.health_check().await.map_err(into_store_error)
    }

    async fn write(&self, draft: &RecipeDraft) -> AppResult<()> {
        let key = Self::key(&draft.id)?;
        self.cache
            .set(&key, draft, self.ttl)
            .await
            .map_err(into_store_error)?;
        debug!(draft_id = %draft.id, ttl_secs = self.ttl.as_secs(), "Draft written");
        Ok(())
    }

    fn key(id: &str) -> AppResult<CacheKey> {
        if id.trim().is_empty() {
            return Err(AppError::invalid_input("draft ID must not be empty"));
        }
        Ok(CacheKey::recipe_draft(id))
    }
}

/// Collapse backend failures into the single storage error kind
fn into_store_error(error: AppError) -> AppError {
    match error.code {
        ErrorCode::StoreUnavailable | ErrorCode::InvalidInput => error,
        _ => AppError::store_unavailable(format!("draft store failure: {error}")).with_source(error),
    }
}
