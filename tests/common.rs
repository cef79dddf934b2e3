// ABOUTME: Shared test utilities: scripted LLM provider, fake enrichment capabilities, store setup
// ABOUTME: Lets integration tests drive the pipeline without network or Redis access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `recipe_forge`

use async_trait::async_trait;
use recipe_forge::{
    cache::{Cache, CacheConfig},
    config::{DraftStoreConfig, GenerationConfig},
    drafts::DraftStore,
    errors::{AppError, AppResult, ErrorCode},
    finalize::{EmbeddingCapability, ImageCapability},
    llm::{ChatRequest, ChatResponse, LlmProvider},
    recipes::RecipeDraft,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("recipe_forge=warn")
            .with_test_writer()
            .try_init();
    });
}

/// Plant-based response in the structured grammar
pub const CURRY_RESPONSE: &str = "\
Here is a recipe you might enjoy.

NAME: Vegan Chickpea Curry
DESCRIPTION: A creamy weeknight curry
CATEGORY: Dinner
CUISINE: Indian
INGREDIENTS: 2 cans chickpeas | 1 can coconut milk | 1 onion | 2 cloves garlic | 1 tbsp curry powder
INSTRUCTIONS: Saute the onion and garlic | Add curry powder | Add chickpeas and coconut milk | Simmer 20 minutes
PREP_TIME: 10 minutes
COOK_TIME: 25 minutes
SERVINGS: 4
DIFFICULTY: Easy
CALORIES: 1640
PROTEIN: 52
CARBS: 180
FAT: 78

Enjoy your curry!";

/// JSON nutrition estimate for chickpeas and coconut milk
pub const NUTRITION_RESPONSE: &str =
    "```json\n{\"calories\": 1250, \"protein\": 47, \"carbs\": 130, \"fat\": 61}\n```";

/// One scripted provider response
#[derive(Debug, Clone)]
pub enum Step {
    /// Return this text as the first choice
    Reply(String),
    /// Fail with an error of this code
    Fail(ErrorCode),
    /// Never answer
    Hang,
}

impl Step {
    pub fn reply(text: &str) -> Self {
        Self::Reply(text.to_owned())
    }
}

/// Provider that plays back a fixed script and records every request
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
    calls: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Fail(ErrorCode::ExternalServiceUnavailable));

        match step {
            Step::Reply(content) => Ok(ChatResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Step::Fail(code) => Err(AppError::new(code, "scripted failure")),
            Step::Hang => std::future::pending().await,
        }
    }
}

/// Generation config with tight deadlines for tests
pub fn test_generation_config() -> GenerationConfig {
    GenerationConfig {
        max_attempts: 3,
        short_call_timeout: Duration::from_millis(200),
        long_call_timeout: Duration::from_millis(400),
    }
}

/// In-memory cache without the background reaper
pub async fn memory_cache(max_entries: usize) -> Cache {
    let config = CacheConfig {
        max_entries,
        enable_background_cleanup: false, // Disable in tests to avoid tokio runtime conflicts
        ..CacheConfig::default()
    };
    Cache::new(config).await.unwrap()
}

/// Draft store over a fresh in-memory cache
pub async fn memory_store() -> DraftStore {
    memory_store_with_ttl(Duration::from_secs(86_400)).await
}

/// Draft store with a custom retention window
pub async fn memory_store_with_ttl(ttl: Duration) -> DraftStore {
    DraftStore::new(memory_cache(1_000).await, &DraftStoreConfig { ttl })
}

/// Embedding capability returning a fixed vector, or failing on demand
pub struct FakeEmbeddings {
    pub fail: bool,
    pub calls: AtomicU32,
    pub last_dietary_tags: Mutex<Vec<String>>,
}

impl FakeEmbeddings {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicU32::new(0),
            last_dietary_tags: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicU32::new(0),
            last_dietary_tags: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingCapability for FakeEmbeddings {
    async fn generate_embedding_from_recipe(
        &self,
        _name: &str,
        _description: &str,
        _ingredients: &[String],
        _category: &str,
        dietary_tags: &[String],
    ) -> AppResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_dietary_tags.lock().unwrap() = dietary_tags.to_vec();
        if self.fail {
            return Err(AppError::external_unavailable("embeddings", "offline"));
        }
        Ok(vec![0.25, 0.5, 0.75])
    }
}

/// Image capability that fails a set number of times before succeeding
pub struct FakeImages {
    failures_left: AtomicU32,
    pub calls: AtomicU32,
}

impl FakeImages {
    pub fn working() -> Arc<Self> {
        Self::failing_times(0)
    }

    pub fn failing_times(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageCapability for FakeImages {
    async fn generate_recipe_image(&self, draft: &RecipeDraft) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::external_service("images", "render failed"));
        }
        Ok(format!("https://images.test/{}.png", draft.id))
    }
}
