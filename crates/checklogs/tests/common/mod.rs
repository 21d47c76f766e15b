// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities and mocks for integration tests

pub mod mocks;

use std::sync::Arc;

use checklogs::console::{ConsoleSink, MemorySink};
use checklogs::transport::HttpTransport;
use checklogs::{Client, Logger, LoggerConfig};

pub const API_KEY: &str = "integration-test-api-key";

/// A logger wired to `transport`, echoing into a memory sink instead of stdout.
#[allow(dead_code)]
pub fn logger_with(
    transport: Arc<dyn HttpTransport>,
    configure: impl FnOnce(&mut LoggerConfig),
) -> (Logger, Arc<MemorySink>) {
    let mut config = LoggerConfig::new(API_KEY);
    config.include_hostname = false;
    configure(&mut config);

    let client = Client::builder(config.client.clone())
        .transport(transport)
        .build();
    let console = Arc::new(MemorySink::new());
    let logger = Logger::with_client(Arc::new(client), config)
        .with_console(Arc::clone(&console) as Arc<dyn ConsoleSink>);
    (logger, console)
}
