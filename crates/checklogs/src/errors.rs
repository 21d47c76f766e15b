// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types returned by the client and logger.
//!
//! Every failure is reported through the closed [`Error`] enum. The three
//! payload types carry the structured data callers match on, and the
//! predicates (`is_auth_error`, `is_rate_limit_error`, `is_timeout_error`,
//! `is_retriable`) are pure functions of that data.

use reqwest::StatusCode;

use crate::transport::{TransportError, TransportErrorKind};

/// A log entry or configuration value rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation Error on field '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, thiserror::Error)]
#[error("Network Error: {message}")]
pub struct NetworkError {
    pub message: String,
    #[source]
    pub cause: TransportError,
}

impl NetworkError {
    pub fn new(message: impl Into<String>, cause: TransportError) -> Self {
        Self {
            message: message.into(),
            cause,
        }
    }

    /// True when the request ran out of time, either on the configured
    /// timeout or on the caller's deadline.
    #[must_use]
    pub fn is_timeout_error(&self) -> bool {
        self.cause.kind == TransportErrorKind::Timeout
    }

    /// A request that could not even be built fails the same way every time.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        self.cause.kind != TransportErrorKind::InvalidRequest
    }
}

/// The API answered with a status code of 400 or above.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API Error {status_code}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    /// Status line, e.g. `500 Internal Server Error`.
    pub message: String,
    /// Raw response body.
    pub response: String,
}

impl ApiError {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: status.to_string(),
            response: body.into(),
        }
    }

    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        self.status_code == 401 || self.status_code == 403
    }

    #[must_use]
    pub fn is_rate_limit_error(&self) -> bool {
        self.status_code == 429
    }

    /// Rate limiting and server errors are worth another attempt; any other
    /// 4xx will fail the same way again.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        self.status_code == 429 || self.status_code >= 500
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to encode log entry: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_auth_error())
    }

    #[must_use]
    pub fn is_rate_limit_error(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_rate_limit_error())
    }

    #[must_use]
    pub fn is_timeout_error(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_timeout_error())
    }

    /// Whether a send failing with this error lands in the retry queue.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_retriable(),
            Error::Api(e) => e.is_retriable(),
            Error::Validation(_) | Error::Encode(_) | Error::Decode(_) => false,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(e) => Some(e.status_code),
            _ => None,
        }
    }
}
