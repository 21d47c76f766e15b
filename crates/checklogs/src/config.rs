// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client and logger configuration.
//!
//! Both configs are plain values built once at startup and never mutated
//! afterward: the client keeps its config behind an `Arc`, and each logger
//! owns its own copy.

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::entry::Context;
use crate::errors::ValidationError;
use crate::level::LogLevel;
use crate::validation::{validate_api_key, validate_base_url};

#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    /// Sent as `Authorization: Bearer <api_key>`.
    pub api_key: String,
    /// Scheme and host of the API; request paths are appended to it.
    pub base_url: String,
    pub timeout: Duration,
    /// Run entry validation before sending. When `false` entries go out as is.
    pub validate_payload: bool,
    /// Bound on the retry queue. `None` means unbounded.
    pub max_retry_queue_size: Option<usize>,
    pub https_proxy: Option<String>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            validate_payload: true,
            max_retry_queue_size: None,
            https_proxy: None,
        }
    }

    /// Reads the configuration from `CHECKLOGS_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("CHECKLOGS_API_KEY")
            .ok_or_else(|| ValidationError::new("api_key", "API key is required"))?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup("CHECKLOGS_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "CHECKLOGS_TIMEOUT") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(validate) = parse_bool(&lookup, "CHECKLOGS_VALIDATE_PAYLOAD") {
            config.validate_payload = validate;
        }
        config.max_retry_queue_size =
            parse_var::<usize, _>(&lookup, "CHECKLOGS_MAX_RETRY_QUEUE_SIZE");
        config.https_proxy = lookup("CHECKLOGS_PROXY_HTTPS").or_else(|| lookup("HTTPS_PROXY"));

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_api_key(&self.api_key)?;
        validate_base_url(&self.base_url)?;
        if self.timeout.is_zero() {
            return Err(ValidationError::new(
                "timeout",
                "timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("validate_payload", &self.validate_payload)
            .field("max_retry_queue_size", &self.max_retry_queue_size)
            .field("https_proxy", &self.https_proxy)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub client: ClientConfig,
    pub source: Option<String>,
    pub user_id: Option<i64>,
    /// Merged under the call-site context of every entry.
    pub default_context: Context,
    /// Drop every call without sending or echoing anything.
    pub silent: bool,
    /// Echo each entry to the console sink.
    pub console_output: bool,
    pub enabled_levels: BTreeSet<LogLevel>,
    /// Prefix console lines with the entry timestamp.
    pub include_timestamp: bool,
    pub include_hostname: bool,
}

impl LoggerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(ClientConfig::new(api_key))
    }

    #[must_use]
    pub fn with_client(client: ClientConfig) -> Self {
        Self {
            client,
            source: None,
            user_id: None,
            default_context: Context::new(),
            silent: false,
            console_output: true,
            enabled_levels: LogLevel::ALL.into_iter().collect(),
            include_timestamp: true,
            include_hostname: true,
        }
    }

    #[must_use]
    pub fn is_level_enabled(&self, level: LogLevel) -> bool {
        self.enabled_levels.contains(&level)
    }

    /// Reads the client settings plus `CHECKLOGS_SOURCE`, `CHECKLOGS_USER_ID`,
    /// `CHECKLOGS_SILENT`, `CHECKLOGS_CONSOLE_OUTPUT` and
    /// `CHECKLOGS_ENABLED_LEVELS` (comma separated).
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::with_client(ClientConfig::from_lookup(&lookup)?);

        config.source = lookup("CHECKLOGS_SOURCE").filter(|v| !v.is_empty());
        config.user_id = parse_var::<i64, _>(&lookup, "CHECKLOGS_USER_ID");
        if let Some(silent) = parse_bool(&lookup, "CHECKLOGS_SILENT") {
            config.silent = silent;
        }
        if let Some(console_output) = parse_bool(&lookup, "CHECKLOGS_CONSOLE_OUTPUT") {
            config.console_output = console_output;
        }
        if let Some(levels) = lookup("CHECKLOGS_ENABLED_LEVELS") {
            let parsed = parse_levels(&levels)?;
            if !parsed.is_empty() {
                config.enabled_levels = parsed;
            }
        }

        Ok(config)
    }
}

/// Parses a comma-separated list of level names.
pub fn parse_levels(value: &str) -> Result<BTreeSet<LogLevel>, ValidationError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .map(LogLevel::from_str)
        .collect()
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring {} with unparsable value '{}'", name, value);
            None
        }
    }
}

fn parse_bool<F>(lookup: &F, name: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|val| {
        let val = val.trim().to_lowercase();
        val == "true" || val == "1" || val == "yes"
    })
}
