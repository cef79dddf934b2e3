// ABOUTME: Nutrition estimation through a narrow JSON-only generation call
// ABOUTME: Derives per-serving macros from the servings text of a draft
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Calculator
//!
//! The estimation call expects a bare JSON object and has no structured-text
//! fallback. Per-serving values are always `round(total / servings, 1)` where
//! the serving count is the first number in the servings text, or 1.

use tracing::debug;

use crate::decoder::strip_code_fences;
use crate::errors::{AppError, AppResult};
use crate::generation::{CancellationToken, GenerationClient};
use crate::llm::prompts::PromptBuilder;
use crate::recipes::{first_number, Macros, RecipeDraft};

/// Estimates whole-recipe macros from an ingredient list
#[derive(Clone)]
pub struct NutritionCalculator {
    client: GenerationClient,
}

impl NutritionCalculator {
    /// Create a calculator that issues its calls through `client`
    #[must_use]
    pub const fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// Estimate macros for `ingredients`
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` when no ingredient is given
    /// - the transport or cancellation error of the single call
    /// - `DECODE_FAILED` when the response is not a macros object
    pub async fn calculate(
        &self,
        ingredients: &[String],
        cancel: &CancellationToken,
    ) -> AppResult<Macros> {
        if ingredients.iter().all(|i| i.trim().is_empty()) {
            return Err(AppError::invalid_input(
                "nutrition estimation needs at least one ingredient",
            ));
        }

        let prompt = PromptBuilder::nutrition(ingredients);
        let raw = self.client.complete_once(&prompt, cancel).await?;
        let macros = decode_macros(&raw)?;
        debug!(
            calories = macros.calories,
            protein = macros.protein,
            carbs = macros.carbs,
            fat = macros.fat,
            "Nutrition estimate decoded"
        );
        Ok(macros)
    }
}

/// Decode a nutrition response, tolerating code fences and surrounding prose
///
/// # Errors
///
/// Returns `DECODE_FAILED` when no JSON object with numeric macros is found
pub fn decode_macros(raw: &str) -> AppResult<Macros> {
    let text = strip_code_fences(raw);
    let object = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(AppError::decode_failed(
                "nutrition response contains no JSON object",
            ))
        }
    };

    serde_json::from_str(object).map_err(|e| {
        AppError::decode_failed(format!("nutrition response is not a macros object: {e}"))
            .with_source(e)
    })
}

/// Serving count taken from the first number in `servings`; 1 when absent or not positive
#[must_use]
pub fn extract_serving_count(servings: &str) -> f64 {
    first_number(servings)
        .filter(|count| *count > 0.0)
        .unwrap_or(1.0)
}

/// `total / servings` rounded to one decimal place
#[must_use]
pub fn per_serving(total: f64, servings: f64) -> f64 {
    (total / servings * 10.0).round() / 10.0
}

/// Store `macros` as the draft's totals and rederive its per-serving values
pub fn apply_macros(draft: &mut RecipeDraft, macros: Macros) {
    let servings = extract_serving_count(&draft.servings);

    draft.calories = macros.calories;
    draft.protein = macros.protein;
    draft.carbs = macros.carbs;
    draft.fat = macros.fat;

    draft.calories_per_serving = per_serving(macros.calories, servings);
    draft.protein_per_serving = per_serving(macros.protein, servings);
    draft.carbs_per_serving = per_serving(macros.carbs, servings);
    draft.fat_per_serving = per_serving(macros.fat, servings);
}
