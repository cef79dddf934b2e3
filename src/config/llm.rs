// ABOUTME: Text-generation endpoint configuration and generation retry policy
// ABOUTME: Holds base URL, credentials, model, attempt budget and per-call deadlines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::env_or;
use crate::constants::generation::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LONG_CALL_TIMEOUT_SECS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_SHORT_CALL_TIMEOUT_SECS,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::time::Duration;
use url::{Host, Url};

/// Connection settings for an `OpenAI`-compatible text-generation endpoint
#[derive(Clone)]
pub struct LlmConfig {
    /// Base URL, e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1`
    pub base_url: String,
    /// Bearer token; optional for loopback endpoints
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_owned(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Load endpoint configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("RECIPE_LLM_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_owned()),
            api_key: env::var("RECIPE_LLM_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            model: env::var("RECIPE_LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_owned()),
            connect_timeout: Duration::from_secs(env_or(
                "RECIPE_LLM_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
        }
    }

    /// Whether the endpoint is served from this machine
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| {
                url.host().map(|host| match host {
                    Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
                    Host::Ipv4(addr) => addr.is_loopback(),
                    Host::Ipv6(addr) => addr.is_loopback(),
                })
            })
            .unwrap_or(false)
    }

    /// Validate endpoint settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL does not parse as an
    /// http(s) URL, the model is empty, or a remote endpoint has no API key
    pub fn validate(&self) -> AppResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            AppError::config_invalid(format!(
                "RECIPE_LLM_BASE_URL '{}' is not a valid URL: {e}",
                self.base_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config_invalid(format!(
                "RECIPE_LLM_BASE_URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::config_invalid("RECIPE_LLM_MODEL must not be empty"));
        }
        if self.api_key.is_none() && !self.is_loopback() {
            return Err(AppError::config_missing(
                "RECIPE_LLM_API_KEY is required for non-local endpoints",
            ));
        }
        Ok(())
    }
}

/// Retry budget and per-call deadlines for generation calls
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Attempts per generation request
    pub max_attempts: u32,
    /// Deadline for nutrition and quick recipe calls
    pub short_call_timeout: Duration,
    /// Deadline for full recipe and modification calls
    pub long_call_timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            short_call_timeout: Duration::from_secs(DEFAULT_SHORT_CALL_TIMEOUT_SECS),
            long_call_timeout: Duration::from_secs(DEFAULT_LONG_CALL_TIMEOUT_SECS),
        }
    }
}

impl GenerationConfig {
    /// Load retry policy from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_attempts: env_or("RECIPE_GENERATION_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            short_call_timeout: Duration::from_secs(env_or(
                "RECIPE_SHORT_CALL_TIMEOUT_SECS",
                DEFAULT_SHORT_CALL_TIMEOUT_SECS,
            )),
            long_call_timeout: Duration::from_secs(env_or(
                "RECIPE_LONG_CALL_TIMEOUT_SECS",
                DEFAULT_LONG_CALL_TIMEOUT_SECS,
            )),
        }
    }

    /// Validate retry policy
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero attempt budget, a zero deadline,
    /// or a short deadline longer than the long one
    pub fn validate(&self) -> AppResult<()> {
        if self.max_attempts == 0 {
            return Err(AppError::config_invalid(
                "RECIPE_GENERATION_MAX_ATTEMPTS must be at least 1",
            ));
        }
        if self.short_call_timeout.is_zero() || self.long_call_timeout.is_zero() {
            return Err(AppError::config_invalid(
                "generation call timeouts must be greater than zero",
            ));
        }
        if self.short_call_timeout > self.long_call_timeout {
            return Err(AppError::config_invalid(format!(
                "RECIPE_SHORT_CALL_TIMEOUT_SECS ({}s) exceeds RECIPE_LONG_CALL_TIMEOUT_SECS ({}s)",
                self.short_call_timeout.as_secs(),
                self.long_call_timeout.as_secs()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_detection() {
        let mut config = LlmConfig {
            base_url: "http://localhost:11434/v1".to_owned(),
            ..LlmConfig::default()
        };
        assert!(config.is_loopback());
        config.base_url = "http://127.0.0.1:8080/v1".to_owned();
        assert!(config.is_loopback());
        config.base_url = "https://api.groq.com/openai/v1".to_owned();
        assert!(!config.is_loopback());
    }

    #[test]
    fn test_api_key_not_required_for_loopback() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/v1".to_owned(),
            ..LlmConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(LlmConfig::default().validate().is_err());
    }

    #[test]
    fn test_short_timeout_must_not_exceed_long() {
        let config = GenerationConfig {
            short_call_timeout: Duration::from_secs(120),
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(GenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = LlmConfig {
            api_key: Some("sk-secret".to_owned()),
            ..LlmConfig::default()
        };
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}
