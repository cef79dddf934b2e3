// ABOUTME: Main library entry point for the recipe draft generation pipeline
// ABOUTME: Turns unreliable model text into validated, enriched, time-boxed recipe drafts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Forge
//!
//! A pipeline that asks a text-generation model for a recipe, recovers a
//! structured record from whatever the model returns, and carries the result
//! through a short-lived draft lifecycle.
//!
//! ## Pipeline
//!
//! - **Prompts**: fixed system instruction per call type plus a user instruction
//!   carrying the query and dietary constraints
//! - **Generation**: bounded retry loop with per-call deadlines and cancellation
//! - **Decoding**: line-oriented `KEY: value` grammar first, ordered JSON repair
//!   rules as the fallback
//! - **Drafts**: time-boxed storage over an in-memory or Redis backend
//! - **Nutrition**: JSON-only estimation call plus per-serving derivation
//! - **Finalization**: optional embedding and image enrichment
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recipe_forge::cache::Cache;
//! use recipe_forge::config::ForgeConfig;
//! use recipe_forge::drafts::DraftStore;
//! use recipe_forge::errors::AppResult;
//! use recipe_forge::generation::CancellationToken;
//! use recipe_forge::llm::OpenAiCompatibleProvider;
//! use recipe_forge::services::{DraftRequest, RecipeDraftService};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ForgeConfig::load()?;
//!     let store = DraftStore::new(Cache::new(config.cache.clone()).await?, &config.drafts);
//!     let provider = Arc::new(OpenAiCompatibleProvider::new(config.llm.clone())?);
//!     let service = RecipeDraftService::from_provider(provider, config.generation, store);
//!
//!     let request = DraftRequest::new("vegan chickpea curry", uuid::Uuid::new_v4());
//!     let draft = service.generate_draft(&request, &CancellationToken::new()).await?;
//!     println!("saved draft {}", draft.id);
//!     Ok(())
//! }
//! ```

/// Cache abstraction layer with pluggable backends
pub mod cache;

/// Configuration built once at startup and passed to each component
pub mod config;

/// Application constants and default values
pub mod constants;

/// Two-tier decoding of model text into recipe fields
pub mod decoder;

/// Time-boxed draft repository
pub mod drafts;

/// Unified error handling system with standard error codes
pub mod errors;

/// Embedding and image enrichment of drafts
pub mod finalize;

/// Generation client with retry, deadlines and cancellation
pub mod generation;

/// LLM provider abstraction and prompt assembly
pub mod llm;

/// Structured logging setup and pipeline log helpers
pub mod logging;

/// Nutrition estimation and per-serving derivation
pub mod nutrition;

/// Recipe draft domain types
pub mod recipes;

/// Draft lifecycle service layer
pub mod services;
