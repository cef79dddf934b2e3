// ABOUTME: Cache-related constants for capacity, cleanup intervals and Redis tuning
// ABOUTME: Supports both in-memory and Redis cache backends with sensible defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum cache entries for in-memory cache
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default cleanup interval in seconds for expired entries
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300; // 5 minutes

/// Redis connection settings
pub mod redis {
    /// Connection timeout in seconds
    pub const CONNECTION_TIMEOUT_SECS: u64 = 5;
    /// Response timeout in seconds
    pub const RESPONSE_TIMEOUT_SECS: u64 = 3;
    /// Reconnection attempts after a dropped connection
    pub const RECONNECTION_RETRIES: usize = 6;
    /// Exponential backoff base for reconnection
    pub const RETRY_EXPONENT_BASE: u64 = 2;
    /// Cap on reconnection delay in milliseconds
    pub const MAX_RETRY_DELAY_MS: u64 = 5_000;
    /// Attempts for the initial connection at startup
    pub const INITIAL_CONNECTION_RETRIES: u32 = 3;
    /// First startup retry delay in milliseconds (doubles each time)
    pub const INITIAL_RETRY_DELAY_MS: u64 = 500;
    /// Keys inspected per SCAN iteration
    pub const SCAN_BATCH_SIZE: usize = 100;
}
