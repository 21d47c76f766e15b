// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Payload and configuration checks run before any request is issued.
//!
//! Entry checks run in a fixed order and stop at the first failure:
//! message presence, message length, source length, context size. The level
//! is a closed enum, so membership is already guaranteed by the type and by
//! [`LogLevel::from_str`](crate::LogLevel).

use reqwest::Url;

use crate::constants::{MAX_CONTEXT_BYTES, MAX_MESSAGE_BYTES, MAX_SOURCE_BYTES, MIN_API_KEY_LEN};
use crate::entry::{context_size, LogEntry};
use crate::errors::ValidationError;

pub fn validate_entry(entry: &LogEntry) -> Result<(), ValidationError> {
    if entry.message.is_empty() {
        return Err(ValidationError::new("message", "message is required"));
    }

    if entry.message.len() > MAX_MESSAGE_BYTES {
        return Err(ValidationError::new(
            "message",
            format!("message must not exceed {MAX_MESSAGE_BYTES} characters"),
        ));
    }

    if let Some(source) = entry.source.as_deref() {
        if source.len() > MAX_SOURCE_BYTES {
            return Err(ValidationError::new(
                "source",
                format!("source must not exceed {MAX_SOURCE_BYTES} characters"),
            ));
        }
    }

    if let Some(context) = entry.context.as_ref() {
        if context_size(context) > MAX_CONTEXT_BYTES {
            return Err(ValidationError::new(
                "context",
                format!("context must not exceed {MAX_CONTEXT_BYTES} characters when serialized"),
            ));
        }
    }

    Ok(())
}

pub fn validate_api_key(api_key: &str) -> Result<(), ValidationError> {
    if api_key.trim().is_empty() {
        return Err(ValidationError::new("api_key", "API key is required"));
    }
    if api_key.len() < MIN_API_KEY_LEN {
        return Err(ValidationError::new(
            "api_key",
            "API key appears to be invalid (too short)",
        ));
    }
    Ok(())
}

pub fn validate_base_url(base_url: &str) -> Result<(), ValidationError> {
    if base_url.trim().is_empty() {
        return Err(ValidationError::new("base_url", "URL cannot be empty"));
    }
    let url =
        Url::parse(base_url).map_err(|_| ValidationError::new("base_url", "invalid URL format"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::new(
            "base_url",
            "URL must use http or https scheme",
        ));
    }
    Ok(())
}
