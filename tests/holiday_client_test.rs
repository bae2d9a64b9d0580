use holiday_gate::{ClientConfig, HolidayClient, HolidayLookup, LookupError, LookupOutcome, LookupRequest};
use httpmock::prelude::*;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn client_for(server: &MockServer, timeout: Duration, max_retries: u32) -> HolidayClient {
    HolidayClient::new(ClientConfig::new(
        server.url("/PublicHolidays"),
        timeout,
        max_retries,
    ))
}

#[tokio::test]
async fn test_public_holiday_is_hit() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/PublicHolidays")
                .query_param("countryIsoCode", "ES")
                .query_param("languageIsoCode", "EN")
                .query_param("validFrom", "2025-01-01")
                .query_param("validTo", "2025-01-01");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{"type": "Public"}]));
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 0);
    let outcome = client
        .check(&LookupRequest::new("ES", "2025-01-01"), &CancellationToken::new())
        .await;

    assert_eq!(outcome, LookupOutcome::Hit);
    api_mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_array_is_no_hit() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(200).json_body(serde_json::json!([]));
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 0);
    let outcome = client
        .check(&LookupRequest::new("ES", "2025-01-02"), &CancellationToken::new())
        .await;

    assert_eq!(outcome, LookupOutcome::NoHit);
    api_mock.assert_async().await;
}

#[tokio::test]
async fn test_only_non_public_holidays_is_no_hit() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(200).json_body(serde_json::json!([
                {"id": "x1", "type": "Bank", "startDate": "2025-03-19"},
                {"id": "x2", "type": "Optional"}
            ]));
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 0);
    let outcome = client
        .check(&LookupRequest::new("ES", "2025-03-19"), &CancellationToken::new())
        .await;

    assert_eq!(outcome, LookupOutcome::NoHit);
}

#[tokio::test]
async fn test_record_without_type_next_to_public_is_hit() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(200)
                .json_body(serde_json::json!([{"id": "x"}, {"type": "Public"}]));
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 0);
    let outcome = client
        .check(&LookupRequest::new("ES", "2025-01-01"), &CancellationToken::new())
        .await;

    assert_eq!(outcome, LookupOutcome::Hit);
}

#[tokio::test]
async fn test_records_with_missing_or_null_type_are_no_hit() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(200)
                .json_body(serde_json::json!([{"id": "x"}, {"type": null}]));
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 0);
    let outcome = client
        .check(&LookupRequest::new("ES", "2025-01-01"), &CancellationToken::new())
        .await;

    assert_eq!(outcome, LookupOutcome::NoHit);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(400).body("unknown country");
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 3);
    let outcome = client
        .check(&LookupRequest::new("XX", "2025-01-01"), &CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        LookupOutcome::Failure(LookupError::Client {
            status: 400,
            body: "unknown country".to_string(),
        })
    );
    api_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_server_error_is_retried_until_exhausted() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(503);
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 2);
    let started = Instant::now();
    let outcome = client
        .check(&LookupRequest::new("IT", "2025-01-01"), &CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        LookupOutcome::Failure(LookupError::Server { status: 503 })
    );
    api_mock.assert_hits_async(3).await;
    // 150ms + 300ms 的退避
    assert!(started.elapsed() >= Duration::from_millis(450));
}

#[tokio::test]
async fn test_zero_retries_means_single_attempt() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(500);
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 0);
    let outcome = client
        .check(&LookupRequest::new("IT", "2025-01-01"), &CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        LookupOutcome::Failure(LookupError::Server { status: 500 })
    );
    api_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_malformed_payload_is_terminal() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let client = client_for(&server, Duration::from_millis(500), 3);
    let outcome = client
        .check(&LookupRequest::new("FR", "2025-01-01"), &CancellationToken::new())
        .await;

    match outcome {
        LookupOutcome::Failure(LookupError::Decode(_)) => {}
        other => panic!("expected decode failure, got {:?}", other),
    }
    api_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(serde_json::json!([]));
        })
        .await;

    let client = client_for(&server, Duration::from_millis(100), 1);
    let started = Instant::now();
    let outcome = client
        .check(&LookupRequest::new("DE", "2025-01-01"), &CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        LookupOutcome::Failure(LookupError::Timeout(Duration::from_millis(100)))
    );
    // 兩次逾時加上一次退避，遠小於上游延遲
    assert!(started.elapsed() < Duration::from_millis(1500));
}

#[tokio::test]
async fn test_cancel_aborts_in_flight_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(200)
                .delay(Duration::from_secs(5))
                .json_body(serde_json::json!([]));
        })
        .await;

    let client = client_for(&server, Duration::from_secs(10), 2);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = client
        .check(&LookupRequest::new("ES", "2025-01-01"), &cancel)
        .await;

    assert_eq!(outcome, LookupOutcome::Failure(LookupError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_cancel_aborts_backoff_sleep() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/PublicHolidays");
            then.status(502);
        })
        .await;

    // 第 5 次之後退避都是 2 秒，取消必須打斷等待
    let client = client_for(&server, Duration::from_millis(500), 10);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = client
        .check(&LookupRequest::new("IT", "2025-01-01"), &cancel)
        .await;

    assert_eq!(outcome, LookupOutcome::Failure(LookupError::Cancelled));
    assert!(started.elapsed() < Duration::from_millis(4000));
}
