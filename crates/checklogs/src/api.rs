// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Query parameters and response shapes of the read endpoints.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::LogEntry;
use crate::level::LogLevel;

/// Filters for `GET /api/logs`. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetLogsParams {
    pub limit: Option<u32>,
    pub level: Option<LogLevel>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub user_id: Option<i64>,
}

impl GetLogsParams {
    /// Query pairs in a stable order. Timestamps use RFC 3339.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(level) = self.level {
            pairs.push(("level", level.as_str().to_string()));
        }
        if let Some(since) = self.since {
            pairs.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(until) = self.until {
            pairs.push(("until", until.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(source) = self.source.as_ref().filter(|source| !source.is_empty()) {
            pairs.push(("source", source.clone()));
        }
        if let Some(user_id) = self.user_id {
            pairs.push(("user_id", user_id.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub data: Vec<LogEntry>,
    #[serde(default)]
    pub meta: LogsMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsMeta {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Server-side statistics from `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStats {
    pub total_logs: i64,
    pub last_log: Option<DateTime<Utc>>,
    pub error_rate: f64,
}

/// Analytics from `GET /api/summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub analytics: Analytics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analytics {
    pub error_rate: f64,
    pub trend: String,
    pub peak_day: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetryQueueStatus {
    pub count: usize,
}

/// `{"data": ...}` wrapper used by the stats and summary endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}
