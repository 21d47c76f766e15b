// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Local echo of log entries for humans watching the process output.

use std::fmt::Debug;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::level::LogLevel;

/// Receives one formatted line per echoed entry. Implementations must not
/// panic; write failures are ignored.
pub trait ConsoleSink: Send + Sync + Debug {
    fn write_line(&self, line: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let _ = writeln!(std::io::stdout().lock(), "{line}");
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConsoleSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// `2024-05-01 12:30:00 [INFO] message`, without the timestamp when
/// `timestamp` is `None`.
#[must_use]
pub fn format_line(timestamp: Option<DateTime<Utc>>, level: LogLevel, message: &str) -> String {
    match timestamp {
        Some(ts) => format!(
            "{} [{}] {}",
            ts.format("%Y-%m-%d %H:%M:%S"),
            level.label(),
            message
        ),
        None => format!("[{}] {}", level.label(), message),
    }
}
