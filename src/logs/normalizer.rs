//! Log events file normalization
//!
//! Turns the contents of a `--logs-file` into the ordered list of messages
//! that is sent in a single `PutLogEvents` call.

use std::io::ErrorKind;
use std::path::Path;

use crate::errors::{PutLogsError, Result};
use super::entry::LogEntry;

/// Parse a JSON array of log entries into messages, preserving order
///
/// Strings pass through unchanged, objects become compact JSON text.
/// Anything that is not a JSON array fails with [`PutLogsError::Parse`].
pub fn parse_log_events(data: &[u8]) -> Result<Vec<String>> {
    let entries: Vec<LogEntry> =
        serde_json::from_slice(data).map_err(|e| PutLogsError::Parse(e.to_string()))?;

    entries
        .into_iter()
        .map(|entry| entry.into_message().map_err(|e| PutLogsError::Parse(e.to_string())))
        .collect()
}

/// Read a log events file and normalize its contents
pub async fn load_log_events_file(path: &Path) -> Result<Vec<String>> {
    let data = tokio::fs::read(path).await.map_err(|source| match source.kind() {
        ErrorKind::NotFound => PutLogsError::FileNotFound { path: path.to_path_buf() },
        _ => PutLogsError::FileRead { path: path.to_path_buf(), source },
    })?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "read log events file");
    parse_log_events(&data)
}
