// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client SDK for the CheckLogs log-ingestion API.
//!
//! A [`Client`] validates and ships [`LogEntry`] values over HTTP and keeps
//! every entry that failed with a retriable error in an in-memory retry
//! queue until the caller explicitly [flushes](Client::flush) it. A
//! [`Logger`] wraps a shared client with default context, level filtering,
//! console echo, child-logger derivation and timers.
//!
//! ```rust,no_run
//! use checklogs::{context, Logger, LoggerConfig, RequestContext};
//!
//! # async fn run() -> Result<(), checklogs::Error> {
//! let mut config = LoggerConfig::new("my-checklogs-api-key");
//! config.source = Some("billing".to_string());
//! let logger = Logger::new(config);
//!
//! let ctx = RequestContext::background();
//! logger.info(&ctx, "service started", None).await?;
//!
//! let request_logger = logger.child(context! { "request_id": "abc-123" });
//! request_logger
//!     .error(&ctx, "payment declined", Some(context! { "amount": 42 }))
//!     .await?;
//!
//! if !logger.client().flush(&ctx).await {
//!     tracing::warn!("some entries are still queued");
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod api;
pub mod client;
pub mod clock;
pub mod config;
pub mod console;
pub mod constants;
pub mod entry;
pub mod errors;
pub mod hostname;
pub mod http;
pub mod level;
pub mod logger;
pub mod request_context;
pub mod retry;
pub mod retry_queue;
pub mod stats;
pub mod timer;
pub mod transport;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{
    Analytics, ApiStats, GetLogsParams, LogsMeta, LogsResponse, RetryQueueStatus, Summary,
};
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, LoggerConfig};
pub use entry::{Context, LogEntry};
pub use errors::{ApiError, Error, NetworkError, ValidationError};
pub use level::LogLevel;
pub use logger::Logger;
pub use request_context::RequestContext;
pub use retry::RetryStrategy;
pub use stats::StatsSnapshot;
pub use timer::Timer;

#[doc(hidden)]
pub use serde_json;
