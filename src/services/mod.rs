// ABOUTME: Domain service layer composing the draft pipeline stages
// ABOUTME: Provides surface-agnostic operations reusable by the CLI and any future API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services hold no state of their own beyond their collaborators, so every
//! entry point applies the same rules.

/// Recipe draft lifecycle: generate, modify, nutrition, finalize, get, delete
pub mod recipe_drafts;

pub use recipe_drafts::{DraftRequest, RecipeDraftService};
