// ABOUTME: Recipe draft service composing generation, decoding, storage, nutrition and finalization
// ABOUTME: Entry point for every draft operation, independent of the surface that calls it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::GenerationConfig;
use crate::drafts::DraftStore;
use crate::errors::{AppError, AppResult};
use crate::finalize::{FinalizeOutcome, Finalizer};
use crate::generation::{CancellationToken, GenerationClient, GenerationMode};
use crate::llm::prompts::{DietaryConstraints, PromptBuilder};
use crate::llm::LlmProvider;
use crate::nutrition::{apply_macros, NutritionCalculator};
use crate::recipes::RecipeDraft;

/// Request for a new draft
#[derive(Debug, Clone)]
pub struct DraftRequest {
    /// Free-text description of the wanted recipe
    pub query: String,
    /// Owner of the resulting draft
    pub user_id: Uuid,
    /// Dietary preferences and allergens to honour
    pub constraints: DietaryConstraints,
    /// Size and deadline profile
    pub mode: GenerationMode,
}

impl DraftRequest {
    /// Full-mode request with no dietary constraints
    #[must_use]
    pub fn new(query: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            query: query.into(),
            user_id,
            constraints: DietaryConstraints::default(),
            mode: GenerationMode::Full,
        }
    }

    /// Attach dietary constraints
    #[must_use]
    pub fn with_constraints(mut self, constraints: DietaryConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Select the generation mode
    #[must_use]
    pub const fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Draft lifecycle operations
#[derive(Clone)]
pub struct RecipeDraftService {
    generation: GenerationClient,
    nutrition: NutritionCalculator,
    store: DraftStore,
    finalizer: Finalizer,
}

impl RecipeDraftService {
    /// Wire the pipeline from its collaborators
    #[must_use]
    pub fn new(generation: GenerationClient, store: DraftStore, finalizer: Finalizer) -> Self {
        Self {
            nutrition: NutritionCalculator::new(generation.clone()),
            generation,
            store,
            finalizer,
        }
    }

    /// Wire the pipeline over a provider, with a finalizer lacking capabilities
    #[must_use]
    pub fn from_provider(
        provider: Arc<dyn LlmProvider>,
        config: GenerationConfig,
        store: DraftStore,
    ) -> Self {
        let finalizer = Finalizer::new(store.clone());
        Self::new(GenerationClient::new(provider, config), store, finalizer)
    }

    /// Draft store used by the service
    #[must_use]
    pub const fn store(&self) -> &DraftStore {
        &self.store
    }

    /// Generate a recipe and save it as a new draft
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for a blank query
    /// - `GENERATION_FAILED` or `CANCELLED` from the generation loop
    /// - `STORE_UNAVAILABLE` if the draft cannot be saved
    #[instrument(skip(self, request, cancel), fields(user_id = %request.user_id, mode = ?request.mode))]
    pub async fn generate_draft(
        &self,
        request: &DraftRequest,
        cancel: &CancellationToken,
    ) -> AppResult<RecipeDraft> {
        if request.query.trim().is_empty() {
            return Err(AppError::invalid_input("recipe query must not be empty"));
        }

        let prompt = PromptBuilder::generation(&request.query, &request.constraints);
        let generation = self.generation.generate(&prompt, request.mode, cancel).await?;
        let draft = RecipeDraft::from_fields(
            generation.decoded.fields,
            request.user_id,
            &request.constraints,
        );
        let draft = self.store.save(draft).await?;

        info!(
            draft_id = %draft.id,
            attempts = generation.attempts,
            tier = generation.decoded.tier.as_str(),
            "Recipe draft generated"
        );
        Ok(draft)
    }

    /// Apply a modification request to an existing draft, saving the result as a new draft
    ///
    /// The original draft is left untouched. The new draft inherits the
    /// original's owner and dietary constraints.
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` for a blank modification request
    /// - `RESOURCE_NOT_FOUND` when the original draft is gone
    /// - `GENERATION_FAILED` or `CANCELLED` from the generation loop
    /// - `STORE_UNAVAILABLE` on storage failure
    #[instrument(skip(self, modification, cancel))]
    pub async fn modify_draft(
        &self,
        draft_id: &str,
        modification: &str,
        cancel: &CancellationToken,
    ) -> AppResult<RecipeDraft> {
        if modification.trim().is_empty() {
            return Err(AppError::invalid_input(
                "modification request must not be empty",
            ));
        }

        let original = self.store.get(draft_id).await?;
        let constraints = original.dietary_constraints();
        let prompt = PromptBuilder::modification(modification, &constraints, &original);
        let generation = self
            .generation
            .generate(&prompt, GenerationMode::Full, cancel)
            .await?;
        let draft =
            RecipeDraft::from_fields(generation.decoded.fields, original.user_id, &constraints);
        let draft = self.store.save(draft).await?;

        info!(
            original_id = %original.id,
            draft_id = %draft.id,
            attempts = generation.attempts,
            "Recipe draft modified"
        );
        Ok(draft)
    }

    /// Estimate macros for a draft's ingredients and store them with per-serving values
    ///
    /// # Errors
    ///
    /// - `RESOURCE_NOT_FOUND` when the draft is gone
    /// - `INVALID_INPUT` when the draft has no ingredients
    /// - the transport, decode or cancellation error of the nutrition call
    /// - `STORE_UNAVAILABLE` on storage failure
    #[instrument(skip(self, cancel))]
    pub async fn calculate_nutrition(
        &self,
        draft_id: &str,
        cancel: &CancellationToken,
    ) -> AppResult<RecipeDraft> {
        let mut draft = self.store.get(draft_id).await?;
        let macros = self.nutrition.calculate(&draft.ingredients, cancel).await?;
        apply_macros(&mut draft, macros);
        self.store.update(draft).await
    }

    /// Enrich a draft with an embedding and image where missing
    ///
    /// # Errors
    ///
    /// Only storage errors; enrichment failures are logged
    pub async fn finalize(&self, draft_id: &str) -> AppResult<FinalizeOutcome> {
        self.finalizer.finalize(draft_id).await
    }

    /// Fetch a draft
    ///
    /// # Errors
    ///
    /// `RESOURCE_NOT_FOUND` or `STORE_UNAVAILABLE`
    pub async fn get_draft(&self, draft_id: &str) -> AppResult<RecipeDraft> {
        self.store.get(draft_id).await
    }

    /// Delete a draft; deleting a missing draft succeeds
    ///
    /// # Errors
    ///
    /// `STORE_UNAVAILABLE` on backend failure
    pub async fn delete_draft(&self, draft_id: &str) -> AppResult<()> {
        self.store.delete(draft_id).await
    }
}
