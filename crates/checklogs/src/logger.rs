// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tracing::debug;

use crate::client::Client;
use crate::config::LoggerConfig;
use crate::console::{format_line, ConsoleSink, StdoutSink};
use crate::entry::{overlay_context, Context, LogEntry};
use crate::errors::Error;
use crate::hostname::get_hostname;
use crate::level::LogLevel;
use crate::request_context::RequestContext;
use crate::timer::Timer;
use crate::validation::validate_entry;

/// Level-filtered front end over a shared [`Client`].
///
/// Cloning a logger, or deriving a [`child`](Self::child), is cheap: the
/// client (and with it the retry queue and stats) is shared, while the
/// config is an immutable snapshot owned by each logger.
#[derive(Debug, Clone)]
pub struct Logger {
    client: Arc<Client>,
    config: Arc<LoggerConfig>,
    console: Arc<dyn ConsoleSink>,
    hostname: Option<Arc<str>>,
}

impl Logger {
    /// Builds a logger and its own client from `config.client`.
    #[must_use]
    pub fn new(config: LoggerConfig) -> Self {
        let client = Arc::new(Client::new(config.client.clone()));
        Self::with_client(client, config)
    }

    /// Builds a logger on top of an existing client. The hostname is
    /// resolved once here and shared with every child.
    #[must_use]
    pub fn with_client(client: Arc<Client>, config: LoggerConfig) -> Self {
        let hostname = if config.include_hostname {
            get_hostname().map(Arc::from)
        } else {
            None
        };
        Self {
            client,
            config: Arc::new(config),
            console: Arc::new(StdoutSink),
            hostname,
        }
    }

    #[must_use]
    pub fn with_console(mut self, console: Arc<dyn ConsoleSink>) -> Self {
        self.console = console;
        self
    }

    /// Replaces the detected hostname. Ignored when `include_hostname` is off.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        if self.config.include_hostname {
            self.hostname = Some(Arc::from(hostname.into()));
        }
        self
    }

    #[must_use]
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    #[must_use]
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Sends `message` at `level`, merged with the logger's default context.
    ///
    /// Returns `Ok(())` without doing anything when the logger is silent or
    /// `level` is disabled.
    pub async fn log(
        &self,
        ctx: &RequestContext,
        level: LogLevel,
        message: &str,
        context: Option<Context>,
    ) -> Result<(), Error> {
        if self.config.silent || !self.config.is_level_enabled(level) {
            return Ok(());
        }

        let entry = self.build_entry(level, message, context.as_ref());
        if self.client.config().validate_payload {
            validate_entry(&entry)?;
        }

        if self.config.console_output {
            let timestamp = entry.timestamp.filter(|_| self.config.include_timestamp);
            self.console
                .write_line(&format_line(timestamp, level, &entry.message));
        }

        self.client.log(ctx, entry).await
    }

    pub async fn debug(
        &self,
        ctx: &RequestContext,
        message: &str,
        context: Option<Context>,
    ) -> Result<(), Error> {
        self.log(ctx, LogLevel::Debug, message, context).await
    }

    pub async fn info(
        &self,
        ctx: &RequestContext,
        message: &str,
        context: Option<Context>,
    ) -> Result<(), Error> {
        self.log(ctx, LogLevel::Info, message, context).await
    }

    pub async fn warning(
        &self,
        ctx: &RequestContext,
        message: &str,
        context: Option<Context>,
    ) -> Result<(), Error> {
        self.log(ctx, LogLevel::Warning, message, context).await
    }

    pub async fn error(
        &self,
        ctx: &RequestContext,
        message: &str,
        context: Option<Context>,
    ) -> Result<(), Error> {
        self.log(ctx, LogLevel::Error, message, context).await
    }

    pub async fn critical(
        &self,
        ctx: &RequestContext,
        message: &str,
        context: Option<Context>,
    ) -> Result<(), Error> {
        self.log(ctx, LogLevel::Critical, message, context).await
    }

    /// Derives a logger whose default context is this logger's overlaid by
    /// `extra`. The parent is left untouched.
    #[must_use]
    pub fn child(&self, extra: Context) -> Logger {
        let mut config = LoggerConfig::clone(&self.config);
        config.default_context = overlay_context(&self.config.default_context, Some(&extra));
        debug!(
            "Created child logger with {} default context keys",
            config.default_context.len()
        );
        Logger {
            client: Arc::clone(&self.client),
            config: Arc::new(config),
            console: Arc::clone(&self.console),
            hostname: self.hostname.clone(),
        }
    }

    /// Starts a timer that reports through this logger when ended.
    #[must_use]
    pub fn time(&self, name: impl Into<String>, message: impl Into<String>) -> Timer {
        Timer::start(self.clone(), name.into(), message.into())
    }

    fn build_entry(&self, level: LogLevel, message: &str, context: Option<&Context>) -> LogEntry {
        let mut entry = LogEntry::new(level, message).with_timestamp(self.client.now());
        entry.source.clone_from(&self.config.source);
        entry.user_id = self.config.user_id;
        entry.hostname = self.hostname.as_deref().map(str::to_string);

        let merged = overlay_context(&self.config.default_context, context);
        if !merged.is_empty() {
            entry.context = Some(merged);
        }
        entry
    }
}
