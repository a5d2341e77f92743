//! Library-level tests of the upload flow against a fake CloudWatch Logs
mod common;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, ResponseTemplate};

use awsputlogs::auth::AwsCredentials;
use awsputlogs::config::ClientConfig;
use awsputlogs::core::{latest_log_stream, upload, upload_sequence_token};
use awsputlogs::errors::{PutLogsError, RemoteError};
use awsputlogs::logs::CloudWatchLogsClient;

use common::{messages, FakeCloudWatch, DESCRIBE_LOG_STREAMS, PUT_LOG_EVENTS};

fn client_for(fake: &FakeCloudWatch) -> CloudWatchLogsClient {
    let endpoint = Url::parse(&fake.uri()).unwrap();
    let config = ClientConfig::new("us-east-1", endpoint, AwsCredentials::new("AKIDTEST", "SECRET"));
    CloudWatchLogsClient::new(config).unwrap()
}

// ============================================================================
// Stream Resolution
// ============================================================================

#[tokio::test]
async fn test_latest_log_stream() {
    let fake = FakeCloudWatch::start().await;
    fake.latest_streams(json!([{"logStreamName": "newest", "lastEventTimestamp": 1700000000000_i64}]))
        .await;

    let client = client_for(&fake);
    assert_eq!(latest_log_stream(&client, "/g").await.unwrap(), "newest");

    let requests = fake.server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({"logGroupName": "/g", "orderBy": "LastEventTime", "descending": true, "limit": 1})
    );
}

#[tokio::test]
async fn test_latest_log_stream_empty_group() {
    let fake = FakeCloudWatch::start().await;
    fake.latest_streams(json!([])).await;

    let err = latest_log_stream(&client_for(&fake), "/empty").await.unwrap_err();
    match err {
        PutLogsError::NoStream { log_group } => assert_eq!(log_group, "/empty"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_sequence_token_exact_match() {
    let fake = FakeCloudWatch::start().await;
    fake.prefix_streams(
        "app",
        json!([
            {"logStreamName": "app-2", "uploadSequenceToken": "wrong"},
            {"logStreamName": "app", "uploadSequenceToken": "right"},
        ]),
    )
    .await;

    let token = upload_sequence_token(&client_for(&fake), "/g", "app").await.unwrap();
    assert_eq!(token.as_deref(), Some("right"));
}

#[tokio::test]
async fn test_sequence_token_follows_pages() {
    let fake = FakeCloudWatch::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
        .and(body_partial_json(json!({"nextToken": "page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logStreams": [{"logStreamName": "app", "uploadSequenceToken": "second-page"}]
        })))
        .with_priority(1)
        .mount(&fake.server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logStreams": [{"logStreamName": "app-1"}],
            "nextToken": "page-2"
        })))
        .mount(&fake.server)
        .await;

    let token = upload_sequence_token(&client_for(&fake), "/g", "app").await.unwrap();
    assert_eq!(token.as_deref(), Some("second-page"));
    assert_eq!(fake.targets().await.len(), 2);
}

#[tokio::test]
async fn test_sequence_token_repeated_page_token_stops() {
    let fake = FakeCloudWatch::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logStreams": [],
            "nextToken": "same"
        })))
        .mount(&fake.server)
        .await;

    let token = upload_sequence_token(&client_for(&fake), "/g", "missing").await.unwrap();
    assert!(token.is_none());
    assert_eq!(fake.targets().await.len(), 2);
}

#[tokio::test]
async fn test_sequence_token_page_cycle_stops() {
    let fake = FakeCloudWatch::start().await;
    // page-a -> page-b -> page-a ...
    for (current, next) in [("page-a", "page-b"), ("page-b", "page-a")] {
        Mock::given(method("POST"))
            .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
            .and(body_partial_json(json!({ "nextToken": current })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logStreams": [{"logStreamName": "app-other"}],
                "nextToken": next
            })))
            .with_priority(1)
            .mount(&fake.server)
            .await;
    }
    Mock::given(method("POST"))
        .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logStreams": [],
            "nextToken": "page-a"
        })))
        .mount(&fake.server)
        .await;

    let token = upload_sequence_token(&client_for(&fake), "/g", "app").await.unwrap();
    assert!(token.is_none());
    assert_eq!(fake.targets().await.len(), 3);
}

// ============================================================================
// PutLogEvents
// ============================================================================

#[tokio::test]
async fn test_upload_single_batch() {
    let fake = FakeCloudWatch::start().await;
    fake.group_with_stream("s", Some("tok")).await;

    let logs = vec!["a".to_string(), "b".to_string()];
    let response = upload(&client_for(&fake), "/g", Some("s"), logs).await.unwrap();
    assert_eq!(response.next_sequence_token.as_deref(), Some("next-token"));

    let bodies = fake.put_bodies().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(messages(&bodies[0]), vec!["a", "b"]);
    assert_eq!(bodies[0]["sequenceToken"], "tok");
}

#[tokio::test]
async fn test_upload_to_latest_stream() {
    let fake = FakeCloudWatch::start().await;
    fake.group_with_stream("newest", None).await;

    upload(&client_for(&fake), "/g", None, vec!["x".to_string()]).await.unwrap();

    assert_eq!(
        fake.targets().await,
        vec![DESCRIBE_LOG_STREAMS, DESCRIBE_LOG_STREAMS, PUT_LOG_EVENTS]
    );
    assert_eq!(fake.put_bodies().await[0]["logStreamName"], "newest");
}

#[tokio::test]
async fn test_rejected_events_are_not_an_error() {
    let fake = FakeCloudWatch::start().await;
    fake.prefix_streams("s", json!([{"logStreamName": "s"}])).await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", PUT_LOG_EVENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextSequenceToken": "n",
            "rejectedLogEventsInfo": {"tooOldLogEventEndIndex": 0}
        })))
        .mount(&fake.server)
        .await;

    let response = upload(&client_for(&fake), "/g", Some("s"), vec!["old".to_string()])
        .await
        .unwrap();
    let rejected = response.rejected_log_events_info.unwrap();
    assert_eq!(rejected.too_old_log_event_end_index, Some(0));
}

#[tokio::test]
async fn test_upload_service_error() {
    let fake = FakeCloudWatch::start().await;
    fake.prefix_streams("s", json!([])).await;
    fake.fail(PUT_LOG_EVENTS, 400, "ResourceNotFoundException", "The specified log stream does not exist.")
        .await;

    let err = upload(&client_for(&fake), "/g", Some("s"), vec!["x".to_string()])
        .await
        .unwrap_err();
    match err {
        PutLogsError::Remote(remote @ RemoteError::Service { .. }) => {
            assert_eq!(remote.code(), Some("ResourceNotFoundException"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // stream not found by the lookup: no token is sent
    assert!(fake.put_bodies().await[0].get("sequenceToken").is_none());
}

// ============================================================================
// Protocol
// ============================================================================

#[tokio::test]
async fn test_requests_are_signed_json_1_1() {
    let fake = FakeCloudWatch::start().await;
    fake.group_with_stream("s", None).await;

    upload(&client_for(&fake), "/g", Some("s"), vec!["x".to_string()]).await.unwrap();

    let requests = fake.server.received_requests().await.unwrap();
    for request in &requests {
        let get = |name: &str| request.headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("");
        assert_eq!(request.url.path(), "/");
        assert_eq!(get("content-type"), "application/x-amz-json-1.1");
        assert!(get("authorization")
            .starts_with("AWS4-HMAC-SHA256 Credential=AKIDTEST/"));
        assert!(get("authorization").contains("/us-east-1/logs/aws4_request"));
        assert!(!get("x-amz-date").is_empty());
    }
}

#[tokio::test]
async fn test_invalid_response_body() {
    let fake = FakeCloudWatch::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&fake.server)
        .await;

    let err = latest_log_stream(&client_for(&fake), "/g").await.unwrap_err();
    assert!(matches!(
        err,
        PutLogsError::Remote(RemoteError::InvalidResponse { operation: "DescribeLogStreams", .. })
    ));
}
