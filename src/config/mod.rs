// ABOUTME: Configuration management module for the recipe draft pipeline
// ABOUTME: Builds one validated configuration at startup and hands slices to each component
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: top-level [`ForgeConfig`] loaded from environment variables
//! - **Cache**: draft store backend selection and Redis connection tuning
//! - **LLM**: text-generation endpoint, retry budget and per-call deadlines

/// Cache backend and draft retention configuration
pub mod cache;
/// Top-level configuration assembled from the environment
pub mod environment;
/// Text-generation endpoint and retry configuration
pub mod llm;

pub use cache::{CacheConfig, DraftStoreConfig, RedisConnectionConfig};
pub use environment::ForgeConfig;
pub use llm::{GenerationConfig, LlmConfig};

use std::env;
use std::str::FromStr;

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is unset or unparsable
pub(crate) fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
