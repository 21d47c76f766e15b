// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The log record shipped to the ingestion API and its context map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::level::LogLevel;

/// Structured key/value data attached to a log entry. Keys keep insertion order.
pub type Context = serde_json::Map<String, Value>;

/// Builds a [`Context`] from JSON object syntax.
///
/// ```
/// let ctx = checklogs::context! { "module": "auth", "attempt": 3 };
/// assert_eq!(ctx["attempt"], 3);
/// ```
#[macro_export]
macro_rules! context {
    ($($tt:tt)*) => {
        $crate::entry::into_context($crate::serde_json::json!({ $($tt)* }))
    };
}

/// Returns the map inside a JSON object, or an empty context for any other value.
#[must_use]
pub fn into_context(value: Value) -> Context {
    match value {
        Value::Object(map) => map,
        _ => Context::new(),
    }
}

/// One log record.
///
/// Optional fields are omitted from the JSON body when absent, and so is an
/// empty context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "is_none_or_empty")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "context_is_empty")]
    pub context: Option<Context>,
    /// Set to the send time by [`Client::log`](crate::Client::log) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "is_none_or_empty")]
    pub hostname: Option<String>,
}

fn context_is_empty(context: &Option<Context>) -> bool {
    context.as_ref().map_or(true, Context::is_empty)
}

fn is_none_or_empty(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            source: None,
            user_id: None,
            context: None,
            timestamp: None,
            hostname: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }
}

/// Overlays `overlay` on top of `base`. Keys present in both take the value
/// from `overlay`; `base` is left untouched.
#[must_use]
pub fn overlay_context(base: &Context, overlay: Option<&Context>) -> Context {
    let mut merged = base.clone();
    if let Some(overlay) = overlay {
        for (key, value) in overlay {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Merges any number of contexts, later maps winning on key collisions.
/// Returns `None` when nothing remains after the merge.
#[must_use]
pub fn merge_contexts<'a, I>(contexts: I) -> Option<Context>
where
    I: IntoIterator<Item = &'a Context>,
{
    let mut merged = Context::new();
    for context in contexts {
        for (key, value) in context {
            merged.insert(key.clone(), value.clone());
        }
    }
    if merged.is_empty() {
        None
    } else {
        Some(merged)
    }
}

/// Drops `null` values from a context.
#[must_use]
pub fn sanitize_context(context: &Context) -> Context {
    context
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Size of the context in bytes once serialized to JSON.
#[must_use]
pub fn context_size(context: &Context) -> usize {
    serde_json::to_vec(context).unwrap_or_default().len()
}
