// ABOUTME: Generation client that calls the text-generation endpoint with a bounded retry loop
// ABOUTME: Every attempt is raced against a per-call deadline and the caller's cancellation token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Generation Client
//!
//! An attempt fails when the HTTP call errors, returns a non-success status,
//! exceeds its deadline, or yields text the [`ResponseDecoder`] rejects. Failed
//! attempts are retried immediately, without backoff, up to the configured
//! budget. Exhausting the budget yields a `GENERATION_FAILED` error naming the
//! attempt count.

mod cancellation;

pub use cancellation::CancellationToken;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::constants::generation::{nutrition_sampling, recipe_sampling};
use crate::constants::service_names::TEXT_GENERATION;
use crate::decoder::{DecodedRecipe, ResponseDecoder};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{PromptKind, RecipePrompt};
use crate::llm::{ChatRequest, LlmProvider};
use crate::logging::AppLogger;

/// Size and deadline profile for recipe calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationMode {
    /// Complete recipe; long deadline and full token budget
    #[default]
    Full,
    /// Short recipe; short deadline and reduced token budget
    Quick,
}

/// A successful generation
#[derive(Debug, Clone)]
pub struct Generation {
    /// Decoded record and the tier that accepted it
    pub decoded: DecodedRecipe,
    /// 1-based number of the accepted attempt
    pub attempts: u32,
}

/// Text-generation client with retry, deadlines and cancellation
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
    decoder: ResponseDecoder,
}

impl GenerationClient {
    /// Create a client over `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self {
            provider,
            config,
            decoder: ResponseDecoder::new(),
        }
    }

    /// Deadline for one call of this kind
    #[must_use]
    pub const fn call_timeout(&self, kind: PromptKind, mode: GenerationMode) -> Duration {
        match (kind, mode) {
            (PromptKind::Nutrition, _) | (PromptKind::Generation, GenerationMode::Quick) => {
                self.config.short_call_timeout
            }
            _ => self.config.long_call_timeout,
        }
    }

    /// Build the wire request for a prompt, applying the call profile's sampling
    #[must_use]
    pub fn build_request(prompt: &RecipePrompt, mode: GenerationMode) -> ChatRequest {
        let request = ChatRequest::new(prompt.messages());
        match prompt.kind {
            PromptKind::Nutrition => request
                .with_temperature(nutrition_sampling::TEMPERATURE)
                .with_top_p(nutrition_sampling::TOP_P)
                .with_max_tokens(nutrition_sampling::MAX_TOKENS),
            PromptKind::Generation | PromptKind::Modification => request
                .with_temperature(recipe_sampling::TEMPERATURE)
                .with_top_p(recipe_sampling::TOP_P)
                .with_penalties(
                    recipe_sampling::FREQUENCY_PENALTY,
                    recipe_sampling::PRESENCE_PENALTY,
                )
                .with_max_tokens(match mode {
                    GenerationMode::Full => recipe_sampling::FULL_MAX_TOKENS,
                    GenerationMode::Quick => recipe_sampling::QUICK_MAX_TOKENS,
                }),
        }
    }

    /// Generate and decode a recipe, retrying failed attempts
    ///
    /// # Errors
    ///
    /// - `CANCELLED` as soon as `cancel` fires; the in-flight call is dropped
    /// - `GENERATION_FAILED` after the attempt budget is exhausted
    /// - any non-retryable error immediately
    pub async fn generate(
        &self,
        prompt: &RecipePrompt,
        mode: GenerationMode,
        cancel: &CancellationToken,
    ) -> AppResult<Generation> {
        let request = Self::build_request(prompt, mode);
        let timeout = self.call_timeout(prompt.kind, mode);
        let max_attempts = self.config.max_attempts;
        let started = Instant::now();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let outcome = self
                .cancellable_call(&request, timeout, cancel)
                .await
                .and_then(|text| self.decoder.decode(&text).map(|decoded| (text, decoded)));

            match outcome {
                Ok((raw_text, decoded)) => {
                    info!(
                        attempt,
                        max_attempts,
                        tier = decoded.tier.as_str(),
                        response_len = raw_text.len(),
                        "Generation attempt succeeded"
                    );
                    AppLogger::log_generation_outcome(
                        prompt.kind.as_str(),
                        attempt,
                        true,
                        elapsed_ms(started),
                    );
                    return Ok(Generation {
                        decoded,
                        attempts: attempt,
                    });
                }
                Err(error) if error.is_retryable() => {
                    warn!(attempt, max_attempts, error = %error, "Generation attempt failed");
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        AppLogger::log_generation_outcome(
            prompt.kind.as_str(),
            max_attempts,
            false,
            elapsed_ms(started),
        );
        let last_error =
            last_error.unwrap_or_else(|| AppError::internal("no generation attempt was made"));
        Err(AppError::generation_failed(max_attempts, &last_error))
    }

    /// Single call returning the raw first-choice text, for prompts decoded elsewhere
    ///
    /// # Errors
    ///
    /// Returns the transport, timeout or cancellation error of the call
    pub async fn complete_once(
        &self,
        prompt: &RecipePrompt,
        cancel: &CancellationToken,
    ) -> AppResult<String> {
        let request = Self::build_request(prompt, GenerationMode::Quick);
        let timeout = self.call_timeout(prompt.kind, GenerationMode::Quick);
        self.cancellable_call(&request, timeout, cancel).await
    }

    /// One provider call bounded by `timeout` and abandoned on cancellation
    async fn cancellable_call(
        &self,
        request: &ChatRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> AppResult<String> {
        if cancel.is_cancelled() {
            return Err(AppError::cancelled("generation cancelled before the call"));
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!("Generation cancelled, abandoning in-flight call");
                Err(AppError::cancelled("generation cancelled by caller"))
            }
            result = tokio::time::timeout(timeout, self.provider.complete(request)) => {
                match result {
                    Ok(response) => response.map(|r| r.content),
                    Err(_) => Err(AppError::timeout(TEXT_GENERATION, timeout.as_secs())),
                }
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
