// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Groups draft storage, cache and generation defaults by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Cache backend defaults (capacity, cleanup cadence, Redis tuning)
pub mod cache;
/// Draft storage key schema and retention
pub mod drafts;
/// Generation retry budget, deadlines and sampling profiles
pub mod generation;

/// Service names used in structured logs
pub mod service_names {
    /// Name reported by the pipeline in startup logs
    pub const RECIPE_FORGE: &str = "recipe-forge";
    /// Label used for the text-generation upstream in errors and logs
    pub const TEXT_GENERATION: &str = "TextGeneration";
}
