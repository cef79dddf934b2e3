// ABOUTME: Generation constants: retry budget, per-call deadlines and sampling profiles
// ABOUTME: Structured-output calls use lower temperature and top-p than creative calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Attempts per generation request before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Deadline for short calls (nutrition, quick recipe)
pub const DEFAULT_SHORT_CALL_TIMEOUT_SECS: u64 = 30;

/// Deadline for long calls (full recipe, modification)
pub const DEFAULT_LONG_CALL_TIMEOUT_SECS: u64 = 90;

/// TCP connect timeout for the text-generation endpoint
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default text-generation endpoint (any `OpenAI`-compatible API)
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model identifier
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Sampling for recipe generation and modification
pub mod recipe_sampling {
    /// Temperature
    pub const TEMPERATURE: f32 = 0.7;
    /// Nucleus sampling cutoff
    pub const TOP_P: f32 = 0.9;
    /// Frequency penalty
    pub const FREQUENCY_PENALTY: f32 = 0.3;
    /// Presence penalty
    pub const PRESENCE_PENALTY: f32 = 0.2;
    /// Token budget for full recipes
    pub const FULL_MAX_TOKENS: u32 = 1_500;
    /// Token budget for quick recipes
    pub const QUICK_MAX_TOKENS: u32 = 800;
}

/// Sampling for nutrition estimation (pure JSON output)
pub mod nutrition_sampling {
    /// Temperature
    pub const TEMPERATURE: f32 = 0.1;
    /// Nucleus sampling cutoff
    pub const TOP_P: f32 = 0.3;
    /// Token budget
    pub const MAX_TOKENS: u32 = 300;
}

/// Image capability retry defaults (linear backoff)
pub mod image_retry {
    /// Attempts before the image enrichment is abandoned
    pub const MAX_ATTEMPTS: u32 = 3;
    /// Delay unit multiplied by the attempt number
    pub const BASE_DELAY_MS: u64 = 1_000;
}
