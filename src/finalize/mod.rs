// ABOUTME: Terminal enrichment of a draft with an embedding vector and an illustrative image
// ABOUTME: Capabilities are optional collaborators and their failures never reach the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Finalizer
//!
//! The embedding and image checks are independent and both run on every call.
//! Populated fields are never overwritten. The draft is written back only
//! when at least one enrichment changed it, which also refreshes its expiry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::constants::generation::image_retry;
use crate::drafts::DraftStore;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::recipes::RecipeDraft;

/// Produces a semantic embedding for a recipe
#[async_trait]
pub trait EmbeddingCapability: Send + Sync {
    /// Embed a recipe from its descriptive fields and dietary context
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding service fails
    async fn generate_embedding_from_recipe(
        &self,
        name: &str,
        description: &str,
        ingredients: &[String],
        category: &str,
        dietary_tags: &[String],
    ) -> AppResult<Vec<f32>>;
}

/// Produces an illustrative image for a recipe
#[async_trait]
pub trait ImageCapability: Send + Sync {
    /// Generate an image and return its URL
    ///
    /// # Errors
    ///
    /// Returns an error if the image service fails
    async fn generate_recipe_image(&self, draft: &RecipeDraft) -> AppResult<String>;
}

/// Result of a finalize call
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    /// Draft as it now stands, enriched or not
    pub draft: RecipeDraft,
    /// An embedding was generated during this call
    pub embedding_added: bool,
    /// An image was generated during this call
    pub image_added: bool,
}

impl FinalizeOutcome {
    /// Whether the draft was written back
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.embedding_added || self.image_added
    }
}

/// Enriches drafts through whichever capabilities are configured
#[derive(Clone)]
pub struct Finalizer {
    store: DraftStore,
    embeddings: Option<Arc<dyn EmbeddingCapability>>,
    images: Option<Arc<dyn ImageCapability>>,
}

impl Finalizer {
    /// Create a finalizer with no capabilities
    #[must_use]
    pub const fn new(store: DraftStore) -> Self {
        Self {
            store,
            embeddings: None,
            images: None,
        }
    }

    /// Enable embedding enrichment
    #[must_use]
    pub fn with_embeddings(mut self, capability: Arc<dyn EmbeddingCapability>) -> Self {
        self.embeddings = Some(capability);
        self
    }

    /// Enable image enrichment
    #[must_use]
    pub fn with_images(mut self, capability: Arc<dyn ImageCapability>) -> Self {
        self.images = Some(capability);
        self
    }

    /// Load a draft, fill in a missing embedding and image, and persist any change
    ///
    /// # Errors
    ///
    /// Only storage errors from loading or writing the draft. Enrichment
    /// failures are logged and the draft is returned without that enrichment.
    pub async fn finalize(&self, draft_id: &str) -> AppResult<FinalizeOutcome> {
        let mut draft = self.store.get(draft_id).await?;

        let embedding_added = self.enrich_embedding(&mut draft).await;
        let image_added = self.enrich_image(&mut draft).await;

        if embedding_added || image_added {
            draft = self.store.update(draft).await?;
        }

        Ok(FinalizeOutcome {
            draft,
            embedding_added,
            image_added,
        })
    }

    async fn enrich_embedding(&self, draft: &mut RecipeDraft) -> bool {
        let Some(capability) = &self.embeddings else {
            return false;
        };
        if draft.has_embedding() {
            AppLogger::log_enrichment(&draft.id, "embedding", "already_present");
            return false;
        }

        let dietary_tags: Vec<String> = draft
            .dietary_preferences
            .iter()
            .chain(&draft.allergens)
            .cloned()
            .collect();
        let result = capability
            .generate_embedding_from_recipe(
                &draft.name,
                &draft.description,
                &draft.ingredients,
                &draft.category,
                &dietary_tags,
            )
            .await;

        match result {
            Ok(vector) if !vector.is_empty() => {
                draft.embedding = vector;
                AppLogger::log_enrichment(&draft.id, "embedding", "added");
                true
            }
            Ok(_) => {
                warn!(draft_id = %draft.id, "Embedding capability returned an empty vector");
                AppLogger::log_enrichment(&draft.id, "embedding", "empty");
                false
            }
            Err(e) => {
                let error = AppError::enrichment_failed("embedding", e.to_string());
                warn!(draft_id = %draft.id, error = %error, "Embedding enrichment failed");
                AppLogger::log_enrichment(&draft.id, "embedding", "failed");
                false
            }
        }
    }

    async fn enrich_image(&self, draft: &mut RecipeDraft) -> bool {
        let Some(capability) = &self.images else {
            return false;
        };
        if draft.has_image() {
            AppLogger::log_enrichment(&draft.id, "image", "already_present");
            return false;
        }

        match capability.generate_recipe_image(draft).await {
            Ok(url) if !url.trim().is_empty() => {
                draft.image_url = Some(url);
                AppLogger::log_enrichment(&draft.id, "image", "added");
                true
            }
            Ok(_) => {
                warn!(draft_id = %draft.id, "Image capability returned an empty reference");
                AppLogger::log_enrichment(&draft.id, "image", "empty");
                false
            }
            Err(e) => {
                let error = AppError::enrichment_failed("image", e.to_string());
                warn!(draft_id = %draft.id, error = %error, "Image enrichment failed");
                AppLogger::log_enrichment(&draft.id, "image", "failed");
                false
            }
        }
    }
}

/// Image capability decorator with bounded attempts and linear backoff
///
/// Attempt `n` that fails is followed by a sleep of `base_delay * n`.
pub struct RetryingImageGenerator {
    inner: Arc<dyn ImageCapability>,
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryingImageGenerator {
    /// Wrap `inner` with the default retry policy
    #[must_use]
    pub fn new(inner: Arc<dyn ImageCapability>) -> Self {
        Self::with_policy(
            inner,
            image_retry::MAX_ATTEMPTS,
            Duration::from_millis(image_retry::BASE_DELAY_MS),
        )
    }

    /// Wrap `inner` with an explicit retry policy; at least one attempt is made
    #[must_use]
    pub fn with_policy(inner: Arc<dyn ImageCapability>, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }
}

#[async_trait]
impl ImageCapability for RetryingImageGenerator {
    async fn generate_recipe_image(&self, draft: &RecipeDraft) -> AppResult<String> {
        let mut attempt = 1;
        loop {
            match self.inner.generate_recipe_image(draft).await {
                Ok(url) => return Ok(url),
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.base_delay * attempt;
                    warn!(
                        draft_id = %draft.id,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Image generation attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AppError::enrichment_failed(
                        "image",
                        format!("failed after {attempt} attempts: {e}"),
                    ))
                }
            }
        }
    }
}
