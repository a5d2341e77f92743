//! Common test utilities for awsputlogs integration tests
//!
//! - A fake CloudWatch Logs endpoint built on wiremock
//! - CLI invocation helpers with an isolated AWS environment
//! - Fixture paths

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DESCRIBE_LOG_STREAMS: &str = "Logs_20140328.DescribeLogStreams";
pub const PUT_LOG_EVENTS: &str = "Logs_20140328.PutLogEvents";

pub const TEST_REGION: &str = "us-east-1";

/// Variables that would leak the developer's AWS setup into a test run
const AMBIENT_VARS: &[&str] = &[
    "AWS_PROFILE",
    "AWS_DEFAULT_PROFILE",
    "AWS_REGION",
    "AWS_DEFAULT_REGION",
    "AWS_SESSION_TOKEN",
    "AWS_ENDPOINT_URL",
    "AWS_ENDPOINT_URL_CLOUDWATCH_LOGS",
    "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI",
    "AWS_CONTAINER_CREDENTIALS_FULL_URI",
    "AWS_CONTAINER_AUTHORIZATION_TOKEN",
    "AWS_WEB_IDENTITY_TOKEN_FILE",
    "AWS_ROLE_ARN",
    "RUST_LOG",
];

/// Fake CloudWatch Logs service
pub struct FakeCloudWatch {
    pub server: MockServer,
}

impl FakeCloudWatch {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn uri(&self) -> String {
        format!("{}/", self.server.uri())
    }

    /// Answer the "latest stream" lookup (orderBy LastEventTime) with `streams`
    pub async fn latest_streams(&self, streams: Value) {
        Mock::given(method("POST"))
            .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
            .and(body_partial_json(json!({"orderBy": "LastEventTime", "descending": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "logStreams": streams })))
            .mount(&self.server)
            .await;
    }

    /// Answer the sequence-token lookup for `prefix` with `streams`
    pub async fn prefix_streams(&self, prefix: &str, streams: Value) {
        Mock::given(method("POST"))
            .and(header("x-amz-target", DESCRIBE_LOG_STREAMS))
            .and(body_partial_json(json!({ "logStreamNamePrefix": prefix })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "logStreams": streams })))
            .mount(&self.server)
            .await;
    }

    /// Accept every PutLogEvents call
    pub async fn accept_puts(&self) {
        Mock::given(method("POST"))
            .and(header("x-amz-target", PUT_LOG_EVENTS))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "nextSequenceToken": "next-token" })),
            )
            .mount(&self.server)
            .await;
    }

    /// Fail every call of `target` with a JSON 1.1 error document
    pub async fn fail(&self, target: &str, status: u16, code: &str, message: &str) {
        Mock::given(method("POST"))
            .and(header("x-amz-target", target))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "__type": format!("com.amazonaws.logs#{}", code),
                "message": message,
            })))
            .mount(&self.server)
            .await;
    }

    /// A log group that exists with one stream named `stream`
    pub async fn group_with_stream(&self, stream: &str, token: Option<&str>) {
        let entry = match token {
            Some(token) => json!({"logStreamName": stream, "uploadSequenceToken": token}),
            None => json!({"logStreamName": stream}),
        };
        self.latest_streams(json!([entry.clone()])).await;
        self.prefix_streams(stream, json!([entry])).await;
        self.accept_puts().await;
    }

    /// X-Amz-Target of every received request, in order
    pub async fn targets(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.headers.get("x-amz-target"))
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// Authorization headers of the received CloudWatch Logs calls
    pub async fn authorizations(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.headers.contains_key("x-amz-target"))
            .filter_map(|r| r.headers.get("authorization"))
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// JSON bodies of the received PutLogEvents calls
    pub async fn put_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| {
                r.headers.get("x-amz-target").and_then(|v| v.to_str().ok()) == Some(PUT_LOG_EVENTS)
            })
            .map(|r| serde_json::from_slice(&r.body).expect("PutLogEvents body is JSON"))
            .collect()
    }
}

/// Messages of a PutLogEvents body, in order
pub fn messages(body: &Value) -> Vec<String> {
    body["logEvents"]
        .as_array()
        .expect("logEvents array")
        .iter()
        .map(|e| e["message"].as_str().expect("message string").to_string())
        .collect()
}

/// The awsputlogs binary with test credentials and no ambient AWS settings
pub fn awsputlogs() -> assert_cmd::Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_awsputlogs"));
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd.env("AWS_ACCESS_KEY_ID", "AKIDTEST")
        .env("AWS_SECRET_ACCESS_KEY", "secret-test-key")
        .env("AWS_CONFIG_FILE", "/nonexistent/awsputlogs/config")
        .env("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/awsputlogs/credentials")
        .env("AWSPUTLOGS_CONFIG", "/nonexistent/awsputlogs/config.toml")
        .env("AWS_EC2_METADATA_DISABLED", "true");
    assert_cmd::Command::from_std(cmd)
}

/// The binary pointed at `endpoint` for log group `group`
pub fn awsputlogs_for(endpoint: &str, group: &str) -> assert_cmd::Command {
    let mut cmd = awsputlogs();
    cmd.args(["--region", TEST_REGION, "--endpoint-url", endpoint, "--log-group", group]);
    cmd
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}
