// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the CheckLogs API.
//!
//! [`Client::log`] is the send path every entry goes through, whether it
//! comes from a [`Logger`](crate::Logger), a direct call, or a flush of the
//! retry queue:
//!
//! ```text
//!   entry ──> timestamp ──> validate ──> stats ──> POST /api/logs
//!                                                      │
//!                 ┌───────────────┬────────────────────┼──────────────┐
//!                 v               v                    v              v
//!           network error    429 / 5xx          other 4xx         < 400
//!           queue + Err      queue + Err        Err only          Ok
//! ```
//!
//! Queued entries are only resent when the caller invokes [`Client::flush`]
//! or [`Client::flush_with_retry`]. Delivery is at-least-once: an entry can
//! reach the API twice if a response is lost after the server stored it.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::api::{ApiStats, DataEnvelope, GetLogsParams, LogsResponse, RetryQueueStatus, Summary};
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::constants::{LOGS_PATH, STATS_PATH, SUMMARY_PATH, USER_AGENT as USER_AGENT_VALUE};
use crate::entry::LogEntry;
use crate::errors::{ApiError, Error, NetworkError};
use crate::http::get_client;
use crate::request_context::RequestContext;
use crate::retry::RetryStrategy;
use crate::retry_queue::{InMemoryRetryQueue, RetryQueue};
use crate::stats::{InMemoryStats, StatsManager, StatsSnapshot};
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};
use crate::validation::validate_entry;

pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
    retry_queue: Arc<dyn RetryQueue>,
    stats: Arc<dyn StatsManager>,
    clock: Arc<dyn Clock>,
}

/// Assembles a [`Client`], substituting any of its collaborators.
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    retry_queue: Option<Arc<dyn RetryQueue>>,
    stats: Option<Arc<dyn StatsManager>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn retry_queue(mut self, retry_queue: Arc<dyn RetryQueue>) -> Self {
        self.retry_queue = Some(retry_queue);
        self
    }

    #[must_use]
    pub fn stats(mut self, stats: Arc<dyn StatsManager>) -> Self {
        self.stats = Some(stats);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn build(self) -> Client {
        let config = self.config;
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new(get_client(&config))));
        let retry_queue = self.retry_queue.unwrap_or_else(|| {
            let queue = match config.max_retry_queue_size {
                Some(max_size) => InMemoryRetryQueue::bounded(max_size),
                None => InMemoryRetryQueue::new(),
            };
            Arc::new(queue)
        });
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let stats = self
            .stats
            .unwrap_or_else(|| Arc::new(InMemoryStats::with_clock(Arc::clone(&clock))));

        Client {
            config: Arc::new(config),
            transport,
            retry_queue,
            stats,
            clock,
        }
    }
}

impl Client {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::builder(config).build()
    }

    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            retry_queue: None,
            stats: None,
            clock: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Sends one entry to `POST /api/logs`.
    ///
    /// A missing timestamp is set to the current time. Entries that fail
    /// with a network error, a 429 or a 5xx are added to the retry queue;
    /// the error is returned either way.
    pub async fn log(&self, ctx: &RequestContext, mut entry: LogEntry) -> Result<(), Error> {
        if entry.timestamp.is_none() {
            entry.timestamp = Some(self.clock.now());
        }

        if self.config.validate_payload {
            validate_entry(&entry)?;
        }

        self.stats.increment_logs();

        let body = match serde_json::to_vec(&entry) {
            Ok(body) => body,
            Err(e) => {
                self.stats.increment_errors();
                return Err(Error::Encode(e));
            }
        };

        let request = match self.build_request(ctx, Method::POST, LOGS_PATH, &[], Some(body)) {
            Ok(request) => request,
            Err(cause) => {
                self.stats.increment_errors();
                return Err(NetworkError::new("failed to create request", cause).into());
            }
        };

        let response = match self.execute(ctx, request).await {
            Ok(response) => response,
            Err(cause) => {
                self.stats.increment_errors();
                warn!("Failed to send log entry, queued for retry: {}", cause);
                self.retry_queue.add(entry);
                return Err(NetworkError::new("request failed", cause).into());
            }
        };

        if let Some(api_error) = api_error(&response) {
            self.stats.increment_errors();
            if api_error.is_retriable() {
                warn!(
                    "{}: Log entry rejected, queued for retry",
                    api_error.status_code
                );
                self.retry_queue.add(entry);
            } else if api_error.is_auth_error() {
                error!(
                    "Request was denied by CheckLogs. Please verify that your API key is valid."
                );
            } else {
                debug!(
                    "{}: Log entry rejected, not retrying: {}",
                    api_error.status_code, api_error.response
                );
            }
            return Err(api_error.into());
        }

        debug!("Log entry accepted with status {}", response.status);
        Ok(())
    }

    /// Queries stored entries. Read calls never touch the retry queue.
    pub async fn get_logs(
        &self,
        ctx: &RequestContext,
        params: &GetLogsParams,
    ) -> Result<LogsResponse, Error> {
        self.get_json(ctx, LOGS_PATH, &params.query_pairs()).await
    }

    pub async fn get_stats(&self, ctx: &RequestContext) -> Result<ApiStats, Error> {
        let envelope: DataEnvelope<ApiStats> = self.get_json(ctx, STATS_PATH, &[]).await?;
        Ok(envelope.data)
    }

    pub async fn get_summary(&self, ctx: &RequestContext) -> Result<Summary, Error> {
        let envelope: DataEnvelope<Summary> = self.get_json(ctx, SUMMARY_PATH, &[]).await?;
        Ok(envelope.data)
    }

    pub async fn get_error_rate(&self, ctx: &RequestContext) -> Result<f64, Error> {
        Ok(self.get_summary(ctx).await?.analytics.error_rate)
    }

    pub async fn get_trend(&self, ctx: &RequestContext) -> Result<String, Error> {
        Ok(self.get_summary(ctx).await?.analytics.trend)
    }

    pub async fn get_peak_day(&self, ctx: &RequestContext) -> Result<String, Error> {
        Ok(self.get_summary(ctx).await?.analytics.peak_day)
    }

    #[must_use]
    pub fn get_retry_queue_status(&self) -> RetryQueueStatus {
        RetryQueueStatus {
            count: self.retry_queue.size(),
        }
    }

    /// Copy of the entries currently waiting for a flush.
    #[must_use]
    pub fn retry_queue_entries(&self) -> Vec<LogEntry> {
        self.retry_queue.get_all()
    }

    /// Counters of send attempts made through this client.
    #[must_use]
    pub fn local_stats(&self) -> StatsSnapshot {
        self.stats.get_stats()
    }

    /// Resends everything in the retry queue, one entry at a time.
    ///
    /// The queue is drained up front. Entries that fail again are put back
    /// by the normal [`log`](Self::log) failure path, so afterwards the
    /// queue holds only what failed in this round. Returns `true` when every
    /// entry was delivered.
    pub async fn flush(&self, ctx: &RequestContext) -> bool {
        let entries = self.retry_queue.drain();
        if entries.is_empty() {
            return true;
        }

        let total = entries.len();
        debug!("Flushing {} queued log entries", total);

        let mut failed = 0;
        for entry in entries {
            if let Err(e) = self.log(ctx, entry).await {
                debug!("Failed to resend queued log entry: {}", e);
                failed += 1;
            }
        }

        if failed == 0 {
            debug!("Successfully flushed {} log entries", total);
        } else {
            warn!("Failed to flush {} of {} log entries", failed, total);
        }
        failed == 0
    }

    /// Repeats [`flush`](Self::flush) until the queue is delivered, the
    /// strategy runs out of attempts, or `ctx` is cancelled. Returns `true`
    /// only when the last round delivered everything.
    pub async fn flush_with_retry(&self, ctx: &RequestContext, strategy: &RetryStrategy) -> bool {
        let attempts = strategy.max_attempts().max(1);
        for attempt in 0..attempts {
            if self.flush(ctx).await {
                return true;
            }
            if self.retry_queue.is_empty() || ctx.is_cancelled() {
                return false;
            }
            if attempt + 1 < attempts {
                let delay = strategy.delay(attempt);
                debug!(
                    "Retrying flush of {} entries in {:?}",
                    self.retry_queue.size(),
                    delay
                );
                if !delay.is_zero() && !ctx.sleep(delay).await {
                    return false;
                }
            }
        }
        false
    }

    /// Drops every queued entry without sending it.
    pub fn clear_retry_queue(&self) {
        let dropped = self.retry_queue.size();
        self.retry_queue.clear();
        if dropped > 0 {
            debug!("Discarded {} queued log entries", dropped);
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let request = self
            .build_request(ctx, Method::GET, path, query, None)
            .map_err(|cause| NetworkError::new("failed to create request", cause))?;
        let response = self
            .execute(ctx, request)
            .await
            .map_err(|cause| NetworkError::new("request failed", cause))?;

        if let Some(api_error) = api_error(&response) {
            if api_error.is_auth_error() {
                error!(
                    "Request was denied by CheckLogs. Please verify that your API key is valid."
                );
            }
            return Err(api_error.into());
        }

        serde_json::from_slice(&response.body).map_err(Error::Decode)
    }

    fn build_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<HttpRequest, TransportError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(HttpRequest {
            method,
            url,
            headers: self.headers(body.is_some())?,
            body,
            timeout: ctx.effective_timeout(self.config.timeout),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = format!("{base}{path}");
        Url::parse(&url)
            .map_err(|e| TransportError::invalid_request(format!("invalid URL '{url}': {e}")))
    }

    fn headers(&self, with_body: bool) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        let authorization = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|_| TransportError::invalid_request("API key is not a valid header value"))?;
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if with_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }

    async fn execute(
        &self,
        ctx: &RequestContext,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        ctx.run(timeout, self.transport.send(request)).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("retry_queue_size", &self.retry_queue.size())
            .finish_non_exhaustive()
    }
}

fn api_error(response: &HttpResponse) -> Option<ApiError> {
    if response.status.as_u16() >= 400 {
        Some(ApiError::new(response.status, response.text()))
    } else {
        None
    }
}
