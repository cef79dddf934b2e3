// ABOUTME: Top-level configuration assembled once from environment variables at startup
// ABOUTME: Aggregates endpoint, retry, draft retention and cache sections and validates them together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::cache::{CacheConfig, DraftStoreConfig};
use super::llm::{GenerationConfig, LlmConfig};
use crate::errors::AppResult;
use tracing::info;

/// Complete runtime configuration
///
/// Built once by [`ForgeConfig::from_env`], checked by [`ForgeConfig::validate`],
/// then split into per-component slices handed to constructors.
#[derive(Debug, Clone, Default)]
pub struct ForgeConfig {
    /// Text-generation endpoint
    pub llm: LlmConfig,
    /// Retry budget and deadlines
    pub generation: GenerationConfig,
    /// Draft retention
    pub drafts: DraftStoreConfig,
    /// Cache backend
    pub cache: CacheConfig,
}

impl ForgeConfig {
    /// Load every section from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            llm: LlmConfig::from_env(),
            generation: GenerationConfig::from_env(),
            drafts: DraftStoreConfig::from_env(),
            cache: CacheConfig::from_env(),
        }
    }

    /// Load from environment and validate in one step
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found
    pub fn load() -> AppResult<Self> {
        let config = Self::from_env();
        config.validate()?;
        info!(
            base_url = %config.llm.base_url,
            model = %config.llm.model,
            max_attempts = config.generation.max_attempts,
            backend = if config.cache.redis_url.is_some() { "redis" } else { "memory" },
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found
    pub fn validate(&self) -> AppResult<()> {
        self.llm.validate()?;
        self.generation.validate()?;
        self.drafts.validate()?;
        self.cache.validate()
    }
}
