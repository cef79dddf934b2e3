// ABOUTME: OpenAI-compatible chat completions client for the text-generation endpoint
// ABOUTME: Works with OpenAI, Groq, Ollama, vLLM and any other compatible API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Sends `POST {base_url}/chat/completions` and returns the first choice's
//! message content. Only that content is consumed; additional choices are ignored.
//!
//! The client carries a connect timeout only. Per-call deadlines are applied
//! by the generation loop so that quick and full calls can differ.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::constants::service_names::TEXT_GENERATION;
use crate::errors::{AppError, ErrorCode};

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// `OpenAI`-compatible text-generation provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: LlmConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: LlmConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.bearer_auth(api_key)
        } else {
            request
        }
    }

    /// Map a non-success status and body onto the error taxonomy
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| match parsed.error.error_type {
                Some(kind) => format!("{kind} - {}", parsed.error.message),
                None => parsed.error.message,
            },
        );

        match status.as_u16() {
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("{TEXT_GENERATION}: rate limited: {detail}"),
            ),
            502..=504 => AppError::external_unavailable(
                TEXT_GENERATION,
                format!("endpoint unavailable ({status}): {detail}"),
            ),
            _ => AppError::external_service(TEXT_GENERATION, format!("API error ({status}): {detail}")),
        }
    }

    fn map_send_error(&self, e: &reqwest::Error) -> AppError {
        error!(base_url = %self.config.base_url, error = %e, "Failed to send generation request");
        if e.is_connect() {
            AppError::external_unavailable(
                TEXT_GENERATION,
                format!("cannot connect to {}", self.config.base_url),
            )
        } else if e.is_timeout() {
            AppError::new(
                ErrorCode::ExternalTimeout,
                format!("{TEXT_GENERATION}: request timed out"),
            )
        } else {
            AppError::external_service(TEXT_GENERATION, format!("request failed: {e}"))
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let openai_request = OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            top_p: request.top_p,
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
            max_tokens: request.max_tokens,
            stream: false,
        };
        debug!(messages = request.messages.len(), "Sending chat completion request");

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&openai_request);
        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service(TEXT_GENERATION, format!("failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse chat completion envelope");
            AppError::external_service(TEXT_GENERATION, format!("failed to parse response: {e}"))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(TEXT_GENERATION, "API returned no choices"))?;

        debug!(
            content_len = choice.message.content.as_ref().map_or(0, String::len),
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            model: openai_response.model.unwrap_or_else(|| model.to_owned()),
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
