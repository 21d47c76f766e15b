// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Version of this SDK, reported in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API endpoint. Request paths are appended to it.
pub const DEFAULT_BASE_URL: &str = "https://checklogs.dev";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const USER_AGENT: &str = concat!("CheckLogs-Rust-SDK/", env!("CARGO_PKG_VERSION"));

pub const LOGS_PATH: &str = "/api/logs";
pub const STATS_PATH: &str = "/api/stats";
pub const SUMMARY_PATH: &str = "/api/summary";

/// Maximum message length in bytes.
pub const MAX_MESSAGE_BYTES: usize = 1024;
/// Maximum source length in bytes.
pub const MAX_SOURCE_BYTES: usize = 100;
/// Maximum size of the JSON-serialized context in bytes.
pub const MAX_CONTEXT_BYTES: usize = 5000;

/// Shortest API key accepted by configuration validation.
pub const MIN_API_KEY_LEN: usize = 10;

/// Upper bound for a single backoff delay between flush rounds.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);
