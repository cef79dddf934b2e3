// ABOUTME: Converts raw model text into recipe fields through two decoding tiers
// ABOUTME: Tries the line-oriented structured format first, then the JSON repair chain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Decoder
//!
//! The upstream model does not reliably honour the requested output format, so
//! decoding is tiered:
//!
//! 1. [`structured`]: the `KEY: value` line grammar requested by the recipe prompts
//! 2. [`json_repair`]: an ordered chain of named repair rules followed by a JSON parse
//!
//! Both tiers share a pre-pass that removes Markdown code fences, and both must
//! produce a minimally valid record (non-empty name, at least one ingredient).

pub mod json_repair;
pub mod structured;

use crate::errors::{AppError, AppResult};
use crate::recipes::RecipeFields;
use serde::Serialize;
use tracing::debug;

/// Which decoding tier produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeTier {
    /// Line-oriented `KEY: value` grammar
    Structured,
    /// Repaired JSON
    JsonRepair,
}

impl DecodeTier {
    /// Label used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::JsonRepair => "json_repair",
        }
    }
}

/// A decoded recipe and the tier that accepted it
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecipe {
    /// Recovered fields
    pub fields: RecipeFields,
    /// Tier that succeeded
    pub tier: DecodeTier,
}

/// Two-tier decoder for recipe responses
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder;

impl ResponseDecoder {
    /// Create a decoder
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode raw model text
    ///
    /// # Errors
    ///
    /// Returns a decode error when neither tier yields a record with a name
    /// and at least one ingredient
    #[allow(clippy::unused_self)]
    pub fn decode(&self, raw: &str) -> AppResult<DecodedRecipe> {
        let text = strip_code_fences(raw);

        if let Some(fields) = structured::parse(&text) {
            debug!(tier = DecodeTier::Structured.as_str(), "Decoded recipe");
            return Ok(DecodedRecipe {
                fields,
                tier: DecodeTier::Structured,
            });
        }

        let fields = json_repair::decode(&text)?;
        if !fields.is_minimally_valid() {
            return Err(AppError::decode_failed(
                "repaired JSON lacks a recipe name or ingredients",
            ));
        }
        debug!(tier = DecodeTier::JsonRepair.as_str(), "Decoded recipe");
        Ok(DecodedRecipe {
            fields,
            tier: DecodeTier::JsonRepair,
        })
    }
}

/// Remove Markdown code-fence lines (```` ``` ```` or ```` ```json ````) wherever they appear
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}
