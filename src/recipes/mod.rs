// ABOUTME: Recipe draft domain types shared by the decoder, nutrition and finalization stages
// ABOUTME: Defines the draft record, decoded recipe fields and macro nutrient values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe Drafts
//!
//! A [`RecipeDraft`] exists only in the time-boxed draft store. It is created
//! from [`RecipeFields`] decoded out of model text, gains macro data from the
//! nutrition stage, and gains an embedding and image during finalization.

/// Normalisation of the polymorphic servings value
pub mod servings;

pub use servings::ServingsShape;

use crate::llm::prompts::DietaryConstraints;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

/// Calorie and macronutrient estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    /// Kilocalories
    #[serde(deserialize_with = "lenient_number")]
    pub calories: f64,
    /// Grams of protein
    #[serde(deserialize_with = "lenient_number")]
    pub protein: f64,
    /// Grams of carbohydrate
    #[serde(deserialize_with = "lenient_number")]
    pub carbs: f64,
    /// Grams of fat
    #[serde(deserialize_with = "lenient_number")]
    pub fat: f64,
}

/// Accept a JSON number, a numeric string (`"450"`, `"450 kcal"`) or null
///
/// # Errors
///
/// Returns a deserialization error for booleans, arrays, objects and
/// strings with no number in them
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of range")),
        serde_json::Value::String(s) => first_number(&s)
            .ok_or_else(|| D::Error::custom(format!("no number in '{s}'"))),
        other => Err(D::Error::custom(format!(
            "expected a number, found {other}"
        ))),
    }
}

/// First decimal number appearing in `text`; comma thousands separators are accepted
#[must_use]
pub fn first_number(text: &str) -> Option<f64> {
    FIRST_NUMBER
        .as_ref()?
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

static FIRST_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?").ok());

/// Recipe content recovered from model text, before it becomes a draft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeFields {
    /// Recipe name
    pub name: String,
    /// Short description
    pub description: String,
    /// Meal category
    pub category: String,
    /// Cuisine
    pub cuisine: String,
    /// Ingredient lines, in order
    pub ingredients: Vec<String>,
    /// Instruction steps, in order
    pub instructions: Vec<String>,
    /// Free-text preparation time
    pub prep_time: String,
    /// Free-text cooking time
    pub cook_time: String,
    /// Servings, normalised to text
    pub servings: String,
    /// Difficulty label
    pub difficulty: String,
    /// Whole-recipe nutrition totals reported by the model
    pub macros: Macros,
}

impl RecipeFields {
    /// Minimal validity: a non-empty name and at least one ingredient
    #[must_use]
    pub fn is_minimally_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.ingredients.iter().any(|i| !i.trim().is_empty())
    }
}

/// An in-progress recipe held in the draft store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// Opaque identifier assigned by the store; empty until saved
    pub id: String,
    /// Recipe name
    pub name: String,
    /// Short description
    pub description: String,
    /// Meal category
    pub category: String,
    /// Cuisine
    pub cuisine: String,
    /// Ingredient lines, in order
    pub ingredients: Vec<String>,
    /// Instruction steps, in order
    pub instructions: Vec<String>,
    /// Free-text preparation time
    pub prep_time: String,
    /// Free-text cooking time
    pub cook_time: String,
    /// Servings as text, e.g. `4` or `24 cookies`
    pub servings: String,
    /// Difficulty label
    pub difficulty: String,
    /// Whole-recipe calories
    pub calories: f64,
    /// Whole-recipe protein grams
    pub protein: f64,
    /// Whole-recipe carbohydrate grams
    pub carbs: f64,
    /// Whole-recipe fat grams
    pub fat: f64,
    /// Calories per serving
    pub calories_per_serving: f64,
    /// Protein grams per serving
    pub protein_per_serving: f64,
    /// Carbohydrate grams per serving
    pub carbs_per_serving: f64,
    /// Fat grams per serving
    pub fat_per_serving: f64,
    /// Owning user
    pub user_id: Uuid,
    /// Dietary preferences the draft was generated under
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    /// Allergens the draft was generated to avoid
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Illustrative image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Semantic embedding; empty means absent
    #[serde(default)]
    pub embedding: Vec<f32>,
    /// Set by the store on save
    pub created_at: DateTime<Utc>,
    /// Set by the store on every write
    pub updated_at: DateTime<Utc>,
}

impl RecipeDraft {
    /// Build an unsaved draft from decoded fields
    ///
    /// Per-serving values are derived from the model-reported totals.
    #[must_use]
    pub fn from_fields(fields: RecipeFields, user_id: Uuid, constraints: &DietaryConstraints) -> Self {
        let now = Utc::now();
        let mut draft = Self {
            id: String::new(),
            name: fields.name,
            description: fields.description,
            category: fields.category,
            cuisine: fields.cuisine,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            prep_time: fields.prep_time,
            cook_time: fields.cook_time,
            servings: fields.servings,
            difficulty: fields.difficulty,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            calories_per_serving: 0.0,
            protein_per_serving: 0.0,
            carbs_per_serving: 0.0,
            fat_per_serving: 0.0,
            user_id,
            dietary_preferences: constraints.preferences.clone(),
            allergens: constraints.allergens.clone(),
            image_url: None,
            embedding: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        crate::nutrition::apply_macros(&mut draft, fields.macros);
        draft
    }

    /// Embedding is absent iff the vector is empty
    #[must_use]
    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }

    /// Image is absent when missing or blank
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Whole-recipe totals
    #[must_use]
    pub const fn macros(&self) -> Macros {
        Macros {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }

    /// Constraints the draft was generated under
    #[must_use]
    pub fn dietary_constraints(&self) -> DietaryConstraints {
        DietaryConstraints {
            preferences: self.dietary_preferences.clone(),
            allergens: self.allergens.clone(),
        }
    }
}
