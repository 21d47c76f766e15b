// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, process::ExitCode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use checklogs::{context, LogLevel, Logger, LoggerConfig, RequestContext, RetryStrategy};
use tokio_util::sync::CancellationToken;

const DEFAULT_FLUSH_ATTEMPTS: u64 = 3;
const FLUSH_BASE_DELAY_MS: u64 = 500;

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("CHECKLOGS_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,reqwest=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match LoggerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error creating config on checklogs startup: {e}");
            return ExitCode::FAILURE;
        }
    };

    let level = match env::var("CHECKLOGS_LEVEL") {
        Ok(val) => match val.parse::<LogLevel>() {
            Ok(level) => level,
            Err(e) => {
                error!("Invalid CHECKLOGS_LEVEL '{val}': {e}");
                return ExitCode::FAILURE;
            }
        },
        Err(_) => LogLevel::Info,
    };

    let flush_attempts = env::var("CHECKLOGS_FLUSH_ATTEMPTS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FLUSH_ATTEMPTS);

    let cancel_token = CancellationToken::new();
    let ctx = RequestContext::background().with_cancellation(cancel_token.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
            cancel_token.cancel();
        }
    });

    let logger = Logger::new(config);
    let (sent, failed) = ship_stdin(&logger, &ctx, level).await;
    let total = sent + failed;
    info!("Read {total} lines, {failed} failed on first attempt");

    let client = logger.client();
    if !ctx.is_cancelled() && client.get_retry_queue_status().count > 0 {
        let strategy = RetryStrategy::ExponentialBackoff {
            attempts: flush_attempts,
            base_delay_ms: FLUSH_BASE_DELAY_MS,
        };
        if client.flush_with_retry(&ctx, &strategy).await {
            info!("Retry queue flushed");
        }
    }

    let stats = client.local_stats();
    let remaining = client.get_retry_queue_status().count;
    info!(
        "Sent {} log entries, {} errors ({:.1}% error rate), {} still queued",
        stats.total_logs, stats.total_errors, stats.error_rate, remaining
    );

    if remaining > 0 {
        warn!("{} log entries could not be delivered", remaining);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Sends every non-empty stdin line as one entry. Returns `(ok, failed)`.
async fn ship_stdin(logger: &Logger, ctx: &RequestContext, level: LogLevel) -> (u64, u64) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_number: u64 = 0;
    let (mut ok, mut failed) = (0, 0);

    loop {
        let line = tokio::select! {
            biased;
            () = ctx.cancellation_token().cancelled() => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {e}");
                break;
            }
        };

        line_number += 1;
        let message = line.trim_end();
        if message.is_empty() {
            continue;
        }

        match logger
            .log(ctx, level, message, Some(context! { "line": line_number }))
            .await
        {
            Ok(()) => ok += 1,
            Err(e) => {
                debug!("Line {line_number} not delivered: {e}");
                failed += 1;
            }
        }
    }

    (ok, failed)
}
