//! Error types for awsputlogs

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for awsputlogs
///
/// Every variant is terminal: the invocation stops and the message is shown
/// to the operator unchanged.
#[derive(Error, Debug)]
pub enum PutLogsError {
    #[error("argument error: {0}")]
    Argument(String),

    #[error("file error: {} does not exist", path.display())]
    FileNotFound { path: PathBuf },

    #[error("file error: failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no logs error: logs are required. pass them as arguments or use --logs-file")]
    NoLogs,

    #[error("no log stream error: log streams are not found in {log_group}. create a log stream before running this tool")]
    NoStream { log_group: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("config error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),
}

/// Failure reported by, or while talking to, the CloudWatch Logs service
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The service answered with an error document
    #[error("{operation} failed ({status}): {code}: {message}")]
    Service {
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a response (DNS, TLS, refused connection)
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned an unreadable response: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },

    /// `--endpoint-url` or `AWS_ENDPOINT_URL*` cannot address the service
    #[error("invalid endpoint URL '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

impl RemoteError {
    /// Service error code such as `ResourceNotFoundException`, if the service sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            RemoteError::Service { code, .. } => Some(code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PutLogsError>;
