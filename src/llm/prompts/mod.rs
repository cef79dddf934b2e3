// ABOUTME: Prompt construction for recipe generation, modification and nutrition calls
// ABOUTME: System prompts are loaded at compile time; user prompts carry query and dietary constraints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompts
//!
//! System instructions are fixed per call type and live in markdown files next
//! to this module. The user instruction is assembled from the request.

use std::fmt::Write;

use super::ChatMessage;
use crate::recipes::RecipeDraft;

/// System prompt for new recipes
pub const RECIPE_GENERATION_PROMPT: &str = include_str!("recipe_generation.md");

/// System prompt for modifying an existing recipe
pub const RECIPE_MODIFICATION_PROMPT: &str = include_str!("recipe_modification.md");

/// System prompt for ingredient nutrition estimation
pub const NUTRITION_ESTIMATION_PROMPT: &str = include_str!("nutrition_estimation.md");

/// Which fixed system instruction a prompt uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Basic recipe generation
    Generation,
    /// Modification of an existing recipe
    Modification,
    /// Nutrition estimation
    Nutrition,
}

impl PromptKind {
    /// Fixed system instruction for this call type
    #[must_use]
    pub const fn system_prompt(self) -> &'static str {
        match self {
            Self::Generation => RECIPE_GENERATION_PROMPT,
            Self::Modification => RECIPE_MODIFICATION_PROMPT,
            Self::Nutrition => NUTRITION_ESTIMATION_PROMPT,
        }
    }

    /// Label used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Modification => "modification",
            Self::Nutrition => "nutrition",
        }
    }
}

/// Dietary preference and allergen tags for a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DietaryConstraints {
    /// e.g. `vegan`, `gluten-free`
    pub preferences: Vec<String>,
    /// e.g. `peanuts`, `shellfish`
    pub allergens: Vec<String>,
}

impl DietaryConstraints {
    /// Build from tag lists, dropping blank tags
    #[must_use]
    pub fn new(preferences: Vec<String>, allergens: Vec<String>) -> Self {
        let clean = |tags: Vec<String>| -> Vec<String> {
            tags.into_iter()
                .map(|tag| tag.trim().to_owned())
                .filter(|tag| !tag.is_empty())
                .collect()
        };
        Self {
            preferences: clean(preferences),
            allergens: clean(allergens),
        }
    }

    /// True when there is nothing to constrain
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty() && self.allergens.is_empty()
    }

    /// Constraint block appended to user instructions, empty when unconstrained
    fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut block = String::from("\n\nDietary constraints:");
        if !self.preferences.is_empty() {
            let _ = write!(
                block,
                "\n- Must follow these dietary preferences: {}",
                self.preferences.join(", ")
            );
        }
        if !self.allergens.is_empty() {
            let _ = write!(
                block,
                "\n- Must NOT contain these allergens: {}",
                self.allergens.join(", ")
            );
        }
        block
    }
}

/// A fully assembled prompt: fixed system instruction plus user instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipePrompt {
    /// Call type
    pub kind: PromptKind,
    /// System instruction
    pub system: String,
    /// User instruction
    pub user: String,
}

impl RecipePrompt {
    /// Messages in wire order: system then user
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

/// Pure prompt assembly
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt for a new recipe
    #[must_use]
    pub fn generation(query: &str, constraints: &DietaryConstraints) -> RecipePrompt {
        RecipePrompt {
            kind: PromptKind::Generation,
            system: RECIPE_GENERATION_PROMPT.to_owned(),
            user: format!("Generate a recipe for: {}{}", query.trim(), constraints.render()),
        }
    }

    /// Prompt for modifying `original` according to `query`
    #[must_use]
    pub fn modification(
        query: &str,
        constraints: &DietaryConstraints,
        original: &RecipeDraft,
    ) -> RecipePrompt {
        let mut user = String::from("Modify this recipe:\n");
        let _ = writeln!(user, "NAME: {}", original.name);
        if !original.description.is_empty() {
            let _ = writeln!(user, "DESCRIPTION: {}", original.description);
        }
        let _ = writeln!(user, "INGREDIENTS: {}", original.ingredients.join(" | "));
        let _ = writeln!(user, "INSTRUCTIONS: {}", original.instructions.join(" | "));
        if !original.servings.is_empty() {
            let _ = writeln!(user, "SERVINGS: {}", original.servings);
        }
        let _ = write!(
            user,
            "\nModification request: {}{}",
            query.trim(),
            constraints.render()
        );

        RecipePrompt {
            kind: PromptKind::Modification,
            system: RECIPE_MODIFICATION_PROMPT.to_owned(),
            user,
        }
    }

    /// Prompt for estimating totals of an ingredient list
    #[must_use]
    pub fn nutrition(ingredients: &[String]) -> RecipePrompt {
        let mut user = String::from("Estimate total nutrition for these ingredients:");
        for ingredient in ingredients {
            let _ = write!(user, "\n- {ingredient}");
        }
        RecipePrompt {
            kind: PromptKind::Nutrition,
            system: NUTRITION_ESTIMATION_PROMPT.to_owned(),
            user,
        }
    }
}
