// ABOUTME: Tests for environment-driven configuration loading and validation
// ABOUTME: Covers defaults, overrides, endpoint credentials, timeout ordering and backend URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use recipe_forge::config::ForgeConfig;
use recipe_forge::constants::drafts::DRAFT_TTL_SECS;
use recipe_forge::constants::generation::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LONG_CALL_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_SHORT_CALL_TIMEOUT_SECS,
};
use recipe_forge::errors::ErrorCode;
use serial_test::serial;
use std::env;
use std::time::Duration;

const FORGE_VARS: &[&str] = &[
    "RECIPE_LLM_BASE_URL",
    "RECIPE_LLM_API_KEY",
    "RECIPE_LLM_MODEL",
    "RECIPE_LLM_CONNECT_TIMEOUT_SECS",
    "RECIPE_GENERATION_MAX_ATTEMPTS",
    "RECIPE_SHORT_CALL_TIMEOUT_SECS",
    "RECIPE_LONG_CALL_TIMEOUT_SECS",
    "RECIPE_DRAFT_TTL_SECS",
    "REDIS_URL",
    "CACHE_MAX_ENTRIES",
    "CACHE_CLEANUP_INTERVAL_SECS",
];

fn clear_forge_env() {
    for name in FORGE_VARS {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_defaults_when_environment_is_empty() {
    clear_forge_env();

    let config = ForgeConfig::from_env();
    assert_eq!(config.llm.base_url, DEFAULT_LLM_BASE_URL);
    assert_eq!(config.llm.model, DEFAULT_LLM_MODEL);
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.generation.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(
        config.generation.short_call_timeout,
        Duration::from_secs(DEFAULT_SHORT_CALL_TIMEOUT_SECS)
    );
    assert_eq!(
        config.generation.long_call_timeout,
        Duration::from_secs(DEFAULT_LONG_CALL_TIMEOUT_SECS)
    );
    assert_eq!(config.drafts.ttl, Duration::from_secs(DRAFT_TTL_SECS));
    assert!(config.cache.redis_url.is_none());
}

#[test]
#[serial]
fn test_hosted_endpoint_requires_api_key() {
    clear_forge_env();

    let error = ForgeConfig::load().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigMissing);
    assert!(error.message.contains("RECIPE_LLM_API_KEY"));

    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    let config = ForgeConfig::load().unwrap();
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));

    clear_forge_env();
}

#[test]
#[serial]
fn test_blank_api_key_counts_as_missing() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_API_KEY", "   ");

    let error = ForgeConfig::load().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigMissing);

    clear_forge_env();
}

#[test]
#[serial]
fn test_loopback_endpoint_needs_no_key() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_BASE_URL", "http://localhost:11434/v1");
    env::set_var("RECIPE_LLM_MODEL", "llama3.1");

    let config = ForgeConfig::load().unwrap();
    assert!(config.llm.is_loopback());
    assert_eq!(config.llm.model, "llama3.1");

    env::set_var("RECIPE_LLM_BASE_URL", "http://127.0.0.1:8080/v1");
    assert!(ForgeConfig::load().is_ok());

    clear_forge_env();
}

#[test]
#[serial]
fn test_retry_and_timeout_overrides() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    env::set_var("RECIPE_GENERATION_MAX_ATTEMPTS", "5");
    env::set_var("RECIPE_SHORT_CALL_TIMEOUT_SECS", "12");
    env::set_var("RECIPE_LONG_CALL_TIMEOUT_SECS", "45");
    env::set_var("RECIPE_DRAFT_TTL_SECS", "600");

    let config = ForgeConfig::load().unwrap();
    assert_eq!(config.generation.max_attempts, 5);
    assert_eq!(config.generation.short_call_timeout, Duration::from_secs(12));
    assert_eq!(config.generation.long_call_timeout, Duration::from_secs(45));
    assert_eq!(config.drafts.ttl, Duration::from_secs(600));

    clear_forge_env();
}

#[test]
#[serial]
fn test_unparsable_numbers_fall_back_to_defaults() {
    clear_forge_env();
    env::set_var("RECIPE_GENERATION_MAX_ATTEMPTS", "many");
    env::set_var("RECIPE_DRAFT_TTL_SECS", "-1");

    let config = ForgeConfig::from_env();
    assert_eq!(config.generation.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(config.drafts.ttl, Duration::from_secs(DRAFT_TTL_SECS));

    clear_forge_env();
}

#[test]
#[serial]
fn test_short_timeout_must_not_exceed_long_timeout() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    env::set_var("RECIPE_SHORT_CALL_TIMEOUT_SECS", "120");
    env::set_var("RECIPE_LONG_CALL_TIMEOUT_SECS", "60");

    let error = ForgeConfig::load().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("RECIPE_SHORT_CALL_TIMEOUT_SECS"));

    clear_forge_env();
}

#[test]
#[serial]
fn test_zero_attempts_rejected() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    env::set_var("RECIPE_GENERATION_MAX_ATTEMPTS", "0");

    let error = ForgeConfig::load().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);

    clear_forge_env();
}

#[test]
#[serial]
fn test_zero_draft_ttl_rejected() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    env::set_var("RECIPE_DRAFT_TTL_SECS", "0");

    let error = ForgeConfig::load().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("RECIPE_DRAFT_TTL_SECS"));

    clear_forge_env();
}

#[test]
#[serial]
fn test_redis_url_scheme_checked() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    env::set_var("REDIS_URL", "http://localhost:6379");

    let error = ForgeConfig::load().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("REDIS_URL"));

    env::set_var("REDIS_URL", "redis://localhost:6379");
    let config = ForgeConfig::load().unwrap();
    assert_eq!(
        config.cache.redis_url.as_deref(),
        Some("redis://localhost:6379")
    );

    clear_forge_env();
}

#[test]
#[serial]
fn test_invalid_base_url_rejected() {
    clear_forge_env();
    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    env::set_var("RECIPE_LLM_BASE_URL", "not a url");

    let error = ForgeConfig::load().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);

    clear_forge_env();
}

#[test]
fn test_api_key_redacted_in_debug_output() {
    let mut config = ForgeConfig::default();
    config.llm.api_key = Some("sk-very-secret".to_owned());

    let rendered = format!("{config:?}");
    assert!(!rendered.contains("sk-very-secret"));
}
