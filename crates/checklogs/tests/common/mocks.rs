// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock transports for testing without a network

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use checklogs::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use checklogs::LogEntry;
use reqwest::StatusCode;

/// Mock transport that answers with queued outcomes, then with `fallback`
#[allow(dead_code)]
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Result<u16, TransportError>>>,
    fallback: u16,
    delay: Option<Duration>,
    calls: AtomicUsize,
    bodies: Mutex<Vec<Vec<u8>>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn always(status: u16) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            fallback: status,
            delay: None,
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::always(200)
        }
    }

    pub fn then_status(self, status: u16) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(status));
        self
    }

    pub fn then_error(self, error: TransportError) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent_entries(&self) -> Vec<LogEntry> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .map(|body| serde_json::from_slice(body).unwrap())
            .collect()
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(body) = request.body {
            self.bodies.lock().unwrap().push(body);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.fallback));
        let status = StatusCode::from_u16(outcome?).unwrap();
        Ok(HttpResponse::new(status, b"{}".to_vec()))
    }
}

/// Mock transport that fails every request with a connection error
#[allow(dead_code)]
pub struct UnreachableTransport;

#[async_trait::async_trait]
impl HttpTransport for UnreachableTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::connect("connection refused"))
    }
}
