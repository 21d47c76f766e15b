// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod common;

use std::sync::Arc;
use std::time::Duration;

use checklogs::transport::{HttpTransport, TransportError};
use checklogs::{context, Error, LogLevel, RequestContext, RetryStrategy};
use common::logger_with;
use common::mocks::{MockTransport, UnreachableTransport};
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn info_against_healthy_backend() {
    let transport = Arc::new(MockTransport::always(200));
    let (logger, console) = logger_with(transport.clone() as Arc<dyn HttpTransport>, |_| {});
    let ctx = RequestContext::background();

    let before = logger.client().get_retry_queue_status().count;
    logger.info(&ctx, "hello", None).await.expect("log failed");

    assert_eq!(logger.client().local_stats().total_logs, 1);
    assert_eq!(logger.client().get_retry_queue_status().count, before);
    assert_eq!(transport.calls(), 1);
    assert_eq!(console.lines().len(), 1);
    assert!(console.lines()[0].ends_with("[INFO] hello"));
}

#[tokio::test]
async fn info_against_failing_backend() {
    let transport = Arc::new(MockTransport::always(500));
    let (logger, _) = logger_with(transport as Arc<dyn HttpTransport>, |_| {});

    let err = logger
        .info(&RequestContext::background(), "hello", None)
        .await
        .unwrap_err();

    match &err {
        Error::Api(api) => assert_eq!(api.status_code, 500),
        other => panic!("expected an API error, got {other:?}"),
    }
    assert!(err.is_retriable());
    assert_eq!(logger.client().get_retry_queue_status().count, 1);
    assert_eq!(logger.client().local_stats().total_errors, 1);
}

#[tokio::test]
async fn consecutive_network_errors_then_clear() {
    let (logger, _) = logger_with(Arc::new(UnreachableTransport), |_| {});
    let ctx = RequestContext::background();

    for i in 0..7 {
        let err = logger
            .warning(&ctx, &format!("attempt {i}"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    assert_eq!(logger.client().get_retry_queue_status().count, 7);
    logger.client().clear_retry_queue();
    assert_eq!(logger.client().get_retry_queue_status().count, 0);
}

#[tokio::test]
async fn flush_leaves_only_failed_entries() {
    // Five sends fail, then the flush round gets 200, 500, 200, 503, 200.
    let transport = Arc::new(
        MockTransport::always(200)
            .then_status(500)
            .then_status(500)
            .then_status(500)
            .then_status(500)
            .then_status(500)
            .then_status(200)
            .then_status(500)
            .then_status(200)
            .then_status(503)
            .then_status(200),
    );
    let (logger, _) = logger_with(transport as Arc<dyn HttpTransport>, |_| {});
    let ctx = RequestContext::background();

    for i in 0..5 {
        let _ = logger.error(&ctx, &format!("m{i}"), None).await;
    }
    assert_eq!(logger.client().get_retry_queue_status().count, 5);

    assert!(!logger.client().flush(&ctx).await);
    assert_eq!(logger.client().get_retry_queue_status().count, 2);

    assert!(logger.client().flush(&ctx).await);
    assert_eq!(logger.client().get_retry_queue_status().count, 0);
}

#[tokio::test]
async fn concurrent_flushes_send_each_entry_once() {
    const QUEUED: usize = 6;
    let mut mock = MockTransport::slow(Duration::from_millis(20));
    for _ in 0..QUEUED {
        mock = mock.then_status(500);
    }
    let transport = Arc::new(mock);
    let (logger, _) = logger_with(transport.clone() as Arc<dyn HttpTransport>, |_| {});
    let ctx = RequestContext::background();

    for i in 0..QUEUED {
        let _ = logger.error(&ctx, &format!("m{i}"), None).await;
    }
    assert_eq!(logger.client().get_retry_queue_status().count, QUEUED);

    let client = logger.client();
    let (first, second) = tokio::join!(client.flush(&ctx), client.flush(&ctx));

    assert!(first);
    assert!(second);
    assert_eq!(transport.calls(), 2 * QUEUED);
    assert_eq!(client.get_retry_queue_status().count, 0);

    let sent = transport.sent_entries();
    let mut resent: Vec<&str> = sent[QUEUED..].iter().map(|e| e.message.as_str()).collect();
    resent.sort_unstable();
    let expected: Vec<String> = (0..QUEUED).map(|i| format!("m{i}")).collect();
    assert_eq!(resent, expected);
}

#[tokio::test]
async fn flush_with_exponential_backoff() {
    let transport = Arc::new(
        MockTransport::always(200)
            .then_error(TransportError::connect("down"))
            .then_error(TransportError::connect("down"))
            .then_status(502),
    );
    let (logger, _) = logger_with(transport.clone() as Arc<dyn HttpTransport>, |_| {});
    let ctx = RequestContext::background();
    let _ = logger.info(&ctx, "queued", None).await;

    let strategy = RetryStrategy::ExponentialBackoff {
        attempts: 4,
        base_delay_ms: 1,
    };
    assert!(logger.client().flush_with_retry(&ctx, &strategy).await);
    assert_eq!(transport.calls(), 4);
    assert_eq!(logger.client().get_retry_queue_status().count, 0);
}

#[tokio::test]
async fn flush_with_retry_stops_when_cancelled() {
    let (logger, _) = logger_with(Arc::new(UnreachableTransport), |_| {});
    let _ = logger
        .info(&RequestContext::background(), "queued", None)
        .await;

    let token = CancellationToken::new();
    let ctx = RequestContext::background().with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let strategy = RetryStrategy::LinearBackoff(100, 10_000);
    let delivered = tokio::time::timeout(
        Duration::from_secs(5),
        logger.client().flush_with_retry(&ctx, &strategy),
    )
    .await
    .expect("flush_with_retry ignored cancellation");

    canceller.await.unwrap();
    assert!(!delivered);
    assert_eq!(logger.client().get_retry_queue_status().count, 1);
}

#[tokio::test]
async fn deadline_shorter_than_response_time() {
    let transport = Arc::new(MockTransport::slow(Duration::from_secs(10)));
    let (logger, _) = logger_with(transport as Arc<dyn HttpTransport>, |_| {});
    let ctx = RequestContext::with_timeout(Duration::from_millis(30));

    let err = logger.info(&ctx, "slow", None).await.unwrap_err();

    assert!(err.is_timeout_error());
    assert_eq!(logger.client().get_retry_queue_status().count, 1);
}

#[tokio::test]
async fn configured_timeout_applies_without_deadline() {
    let transport = Arc::new(MockTransport::slow(Duration::from_secs(10)));
    let (logger, _) = logger_with(transport as Arc<dyn HttpTransport>, |config| {
        config.client.timeout = Duration::from_millis(30);
    });

    let err = logger
        .info(&RequestContext::background(), "slow", None)
        .await
        .unwrap_err();
    assert!(err.is_timeout_error());
}

#[tokio::test]
async fn child_loggers_merge_context() {
    let transport = Arc::new(MockTransport::always(200));
    let (logger, _) = logger_with(transport.clone() as Arc<dyn HttpTransport>, |config| {
        config.default_context = context! { "app": "shop", "tier": "web" };
    });
    let ctx = RequestContext::background();

    let child = logger.child(context! { "tier": "worker", "job": "emails" });
    let grandchild = child.child(context! { "job": "invoices" });

    child.info(&ctx, "child", None).await.unwrap();
    grandchild
        .info(&ctx, "grandchild", Some(context! { "batch": 7 }))
        .await
        .unwrap();
    logger.info(&ctx, "parent", None).await.unwrap();

    let sent = transport.sent_entries();
    assert_eq!(
        sent[0].context,
        Some(context! { "app": "shop", "tier": "worker", "job": "emails" })
    );
    assert_eq!(
        sent[1].context,
        Some(context! { "app": "shop", "tier": "worker", "job": "invoices", "batch": 7 })
    );
    assert_eq!(
        sent[2].context,
        Some(context! { "app": "shop", "tier": "web" })
    );
}

#[tokio::test]
async fn concurrent_children_share_queue() {
    let (logger, _) = logger_with(Arc::new(UnreachableTransport), |_| {});
    let ctx = RequestContext::background();

    let mut handles = Vec::new();
    for worker in 0..8 {
        let child = logger.child(context! { "worker": worker });
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..5 {
                let _ = child.debug(&ctx, &format!("w{worker} m{i}"), None).await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(logger.client().get_retry_queue_status().count, 40);
    let stats = logger.client().local_stats();
    assert_eq!(stats.total_logs, 40);
    assert_eq!(stats.total_errors, 40);
    assert!((stats.error_rate - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn timer_emits_single_info_entry() {
    let transport = Arc::new(MockTransport::always(200));
    let (logger, _) = logger_with(transport.clone() as Arc<dyn HttpTransport>, |_| {});

    let timer = logger.time("export", "Exporting report");
    tokio::time::sleep(Duration::from_millis(25)).await;
    let elapsed = timer.end(&RequestContext::background()).await;

    assert!(elapsed >= Duration::from_millis(25));
    let sent = transport.sent_entries();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].level, LogLevel::Info);
    let context = sent[0].context.as_ref().unwrap();
    assert_eq!(context["operation"], "export");
    assert!(context["duration_ms"].as_u64().unwrap() >= 25);
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn oversized_messages_never_reach_the_network(extra in 1usize..2048, ch in "[a-zA-Z0-9 ]") {
        let message = ch.repeat(1024 + extra);
        let transport = Arc::new(MockTransport::always(200));
        let (logger, _) = logger_with(transport.clone() as Arc<dyn HttpTransport>, |_| {});

        let result = block_on(logger.info(&RequestContext::background(), &message, None));

        match result {
            Err(Error::Validation(e)) => prop_assert_eq!(e.field, "message"),
            other => prop_assert!(false, "expected validation error, got {:?}", other),
        }
        prop_assert_eq!(transport.calls(), 0);
        prop_assert_eq!(logger.client().get_retry_queue_status().count, 0);
    }

    #[test]
    fn messages_within_limit_are_sent(len in 1usize..=1024) {
        let message = "a".repeat(len);
        let transport = Arc::new(MockTransport::always(200));
        let (logger, _) = logger_with(transport.clone() as Arc<dyn HttpTransport>, |_| {});

        let result = block_on(logger.info(&RequestContext::background(), &message, None));

        prop_assert!(result.is_ok());
        prop_assert_eq!(transport.calls(), 1);
    }
}
