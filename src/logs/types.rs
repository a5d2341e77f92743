//! CloudWatch Logs wire types (AWS JSON 1.1, API version 2014-03-28)
//!
//! Only the members this tool reads or writes are modelled; unknown response
//! members are ignored.

use serde::{Deserialize, Serialize};

/// Sort key for `DescribeLogStreams`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderBy {
    LogStreamName,
    LastEventTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeLogStreamsRequest {
    pub log_group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_stream_name_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl DescribeLogStreamsRequest {
    /// Most recently written stream first
    pub fn latest(log_group: &str) -> Self {
        Self {
            log_group_name: log_group.to_string(),
            order_by: Some(OrderBy::LastEventTime),
            descending: Some(true),
            limit: Some(1),
            ..Default::default()
        }
    }

    /// Streams whose name starts with `prefix`, in name order
    pub fn with_prefix(log_group: &str, prefix: &str) -> Self {
        Self {
            log_group_name: log_group.to_string(),
            log_stream_name_prefix: Some(prefix.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeLogStreamsResponse {
    #[serde(default)]
    pub log_streams: Vec<LogStream>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStream {
    pub log_stream_name: String,
    pub creation_time: Option<i64>,
    pub first_event_timestamp: Option<i64>,
    pub last_event_timestamp: Option<i64>,
    pub last_ingestion_time: Option<i64>,
    pub upload_sequence_token: Option<String>,
    pub arn: Option<String>,
}

/// One event of a `PutLogEvents` batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputLogEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutLogEventsRequest {
    pub log_group_name: String,
    pub log_stream_name: String,
    pub log_events: Vec<InputLogEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_token: Option<String>,
}

impl PutLogEventsRequest {
    /// Build a batch where every message carries the same `timestamp`
    pub fn new(log_group: &str, log_stream: &str, messages: Vec<String>, timestamp: i64) -> Self {
        Self {
            log_group_name: log_group.to_string(),
            log_stream_name: log_stream.to_string(),
            log_events: messages
                .into_iter()
                .map(|message| InputLogEvent { timestamp, message })
                .collect(),
            sequence_token: None,
        }
    }

    pub fn sequence_token(mut self, token: Option<String>) -> Self {
        self.sequence_token = token;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutLogEventsResponse {
    pub next_sequence_token: Option<String>,
    pub rejected_log_events_info: Option<RejectedLogEventsInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedLogEventsInfo {
    pub too_new_log_event_start_index: Option<i64>,
    pub too_old_log_event_end_index: Option<i64>,
    pub expired_log_event_end_index: Option<i64>,
}

impl RejectedLogEventsInfo {
    pub fn is_empty(&self) -> bool {
        self.too_new_log_event_start_index.is_none()
            && self.too_old_log_event_end_index.is_none()
            && self.expired_log_event_end_index.is_none()
    }
}

/// Error document returned with non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "__type")]
    pub error_type: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

/// Strip the namespace and any `:` suffix from an error type,
/// e.g. `com.amazonaws.logs#ResourceNotFoundException` -> `ResourceNotFoundException`
pub fn sanitize_error_code(raw: &str) -> &str {
    let code = raw.split(':').next().unwrap_or(raw);
    code.rsplit('#').next().unwrap_or(code).trim()
}
