//! Submission integration tests
//!
//! Compression, batching, counters and shutdown as seen by the collector.

use crate::fixtures::*;
use crate::helpers::*;
use pretty_assertions::assert_eq;
use usage_logger::{LogOptions, SubmitConfig};
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_batches_are_compressed_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/ndjson; charset=UTF-8"))
        .and(header("content-encoding", "deflated"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let logger = logger_for(&server, "include debug");
    assert!(!logger.skip_compression());
    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    assert_eq!(logger.submit_successes(), 1);
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(is_compressed(&requests[0]));
    assert_eq!(decode_batch(&requests[0]).len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_skip_compression_sends_plain_json() {
    for (rules, configured) in [("skip_compression", false), ("# none", true)] {
        let server = collector(204).await;
        let logger = logger_with(&server, &format!("include debug\n{rules}"), |c| {
            c.with_skip_compression(configured)
        });
        assert!(logger.skip_compression());

        logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
        logger.wait_for_response();

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("content-encoding").is_none());
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(body.starts_with("[[\"request_method\",\"GET\"],"), "{body}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_only_no_content_counts_as_success() {
    for status in [200, 201, 302, 400, 404, 500, 503] {
        let server = collector(status).await;
        let logger = logger_for(&server, "include debug");
        logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
        logger.wait_for_response();
        assert_eq!(logger.submit_successes(), 0, "{status}");
        assert_eq!(logger.submit_failures(), 1, "{status}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_counters_accumulate_across_batches() {
    let server = collector(204).await;
    let logger = logger_with(&server, "include debug", |c| {
        c.with_submit_config(SubmitConfig::default().with_max_batch_size(5))
    });

    for _ in 0..25 {
        logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    }
    logger.wait_for_response();

    assert_eq!(logger.submit_successes(), 25);
    assert_eq!(logger.submit_failures(), 0);
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.len() >= 5, "batches: {}", requests.len());
    assert!(requests.iter().all(|r| decode_batch(r).len() <= 5));
    assert_eq!(received_records(&server).await.len(), 25);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_logging_counts_every_record() {
    let server = collector(204).await;
    let logger = logger_for(&server, "include debug");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
                }
            });
        }
    });
    logger.wait_for_response();

    assert_eq!(logger.submit_successes(), 100);
    assert_eq!(logger.submit_failures(), 0);
    assert_eq!(received_records(&server).await.len(), 100);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_loggers_keep_separate_counters() {
    let accepting = collector(204).await;
    let failing = collector(500).await;
    let first = logger_for(&accepting, "include debug");
    let second = logger_for(&accepting, "include debug");
    let third = logger_for(&failing, "include debug");

    std::thread::scope(|scope| {
        for (logger, count) in [(&first, 3), (&second, 2), (&third, 4)] {
            scope.spawn(move || {
                for _ in 0..count {
                    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
                }
            });
        }
    });
    for logger in [&first, &second, &third] {
        logger.wait_for_response();
    }

    assert_eq!((first.submit_successes(), first.submit_failures()), (3, 0));
    assert_eq!((second.submit_successes(), second.submit_failures()), (2, 0));
    assert_eq!((third.submit_successes(), third.submit_failures()), (0, 4));
    assert_eq!(received_records(&accepting).await.len(), 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_synchronous_logging_counts_before_returning() {
    let server = collector(204).await;
    let logger = logger_with(&server, "include debug", |c| c.with_synchronous(true));

    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    assert_eq!(logger.submit_successes(), 1);
    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    assert_eq!(logger.submit_successes(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_skip_submission_sends_nothing() {
    let server = collector(204).await;
    let logger = logger_for(&server, "include debug\nskip_submission");
    assert!(logger.skip_submission());

    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    assert_eq!(logger.submit_successes(), 0);
    assert_eq!(logger.submit_failures(), 0);
    assert!(received_records(&server).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_collector_counts_failures() {
    let logger = usage_logger::HttpLogger::new(
        usage_logger::LoggerConfig::new()
            .with_url("http://127.0.0.1:1/message")
            .with_rules("include debug"),
    )
    .expect("Failed to create logger");

    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    logger.wait_for_response();

    assert_eq!(logger.submit_successes(), 0);
    assert_eq!(logger.submit_failures(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_delivers_pending_records() {
    let server = collector(204).await;
    let logger = logger_for(&server, "include debug");

    for _ in 0..10 {
        logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    }
    logger.shutdown();
    assert_eq!(logger.submit_successes(), 10);
    assert_eq!(received_records(&server).await.len(), 10);

    logger.log(&mock_request(), &mock_response_with_html(), LogOptions::new());
    assert_eq!(logger.submit_failures(), 1);
}
