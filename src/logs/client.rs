//! Minimal CloudWatch Logs client
//!
//! Speaks the AWS JSON 1.1 protocol: every operation is a SigV4-signed
//! `POST /` whose `X-Amz-Target` header names the operation.

use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    sanitize_error_code, DescribeLogStreamsRequest, DescribeLogStreamsResponse, ErrorBody,
    PutLogEventsRequest, PutLogEventsResponse,
};
use crate::auth::aws::sign_request;
use crate::config::{ClientConfig, SERVICE_NAME};
use crate::errors::{PutLogsError, RemoteError, Result};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "Logs_20140328";
const USER_AGENT: &str = concat!("awsputlogs/", env!("CARGO_PKG_VERSION"));

pub struct CloudWatchLogsClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl std::fmt::Debug for CloudWatchLogsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudWatchLogsClient").field("config", &self.config).finish()
    }
}

impl CloudWatchLogsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PutLogsError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub async fn describe_log_streams(
        &self,
        request: &DescribeLogStreamsRequest,
    ) -> Result<DescribeLogStreamsResponse> {
        self.call("DescribeLogStreams", request).await
    }

    pub async fn put_log_events(&self, request: &PutLogEventsRequest) -> Result<PutLogEventsResponse> {
        self.call("PutLogEvents", request).await
    }

    async fn call<Req, Resp>(&self, operation: &'static str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request).map_err(|e| {
            PutLogsError::Config(format!("failed to encode {} request: {}", operation, e))
        })?;
        let target = format!("{}.{}", TARGET_PREFIX, operation);

        let signed = sign_request(
            &self.config.credentials,
            &self.config.region,
            SERVICE_NAME,
            "POST",
            &self.config.endpoint,
            &[("content-type", CONTENT_TYPE), ("x-amz-target", target.as_str())],
            &body,
            SystemTime::now(),
        )?;

        let mut builder = self
            .http
            .post(self.config.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("x-amz-target", &target);
        for (name, value) in &signed {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!(operation, endpoint = %self.config.endpoint, bytes = body.len(), "sending request");
        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|source| RemoteError::Transport { operation, source })?;

        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|source| RemoteError::Transport { operation, source })?;

        tracing::debug!(operation, status = status.as_u16(), bytes = bytes.len(), "received response");

        if !status.is_success() {
            return Err(service_error(operation, status.as_u16(), error_type.as_deref(), &bytes).into());
        }

        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) { b"{}" } else { &bytes };
        serde_json::from_slice(payload).map_err(|e| {
            RemoteError::InvalidResponse { operation, message: e.to_string() }.into()
        })
    }
}

/// Build the error for a non-2xx response
///
/// The code comes from the `x-amzn-ErrorType` header when present, else from
/// the body's `__type`.
fn service_error(operation: &'static str, status: u16, error_type: Option<&str>, body: &[u8]) -> RemoteError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    let code = error_type
        .or(parsed.error_type.as_deref())
        .map(sanitize_error_code)
        .filter(|c| !c.is_empty())
        .unwrap_or("UnknownError")
        .to_string();

    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

    RemoteError::Service { operation, status, code, message }
}
