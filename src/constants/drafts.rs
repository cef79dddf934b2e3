// ABOUTME: Draft storage constants: key schema and retention window
// ABOUTME: Drafts live only in time-boxed storage until promoted elsewhere
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Prefix of every draft key (`recipe:draft:<id>`)
pub const DRAFT_KEY_PREFIX: &str = "recipe:draft:";

/// Retention window for drafts that are never promoted (24 hours)
pub const DRAFT_TTL_SECS: u64 = 86_400;
