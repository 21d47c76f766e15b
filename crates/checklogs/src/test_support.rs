// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Scripted transport shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::entry::LogEntry;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

pub(crate) const TEST_API_KEY: &str = "test-api-key-0123456789";

/// Replies with queued outcomes in order, then with `200 OK` once the
/// script runs out. Every request is recorded.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn push_status(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body.as_bytes().to_vec())));
    }

    pub(crate) fn push_error(&self, error: TransportError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Bodies of every request that carried one, decoded as log entries.
    pub(crate) fn sent_entries(&self) -> Vec<LogEntry> {
        self.requests()
            .iter()
            .filter_map(|r| r.body.as_ref())
            .map(|body| serde_json::from_slice(body).unwrap())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(HttpResponse::new(StatusCode::OK, b"{}".to_vec())))
    }
}

pub(crate) fn test_client(transport: Arc<ScriptedTransport>) -> Client {
    let mut config = ClientConfig::new(TEST_API_KEY);
    config.base_url = "https://checklogs.test".to_string();
    Client::builder(config).transport(transport).build()
}
