//! Invocation flow
//!
//! `run` owns the process-facing concerns (argument vector, exit status,
//! printing the error). Everything below it takes explicit values so it can
//! be driven from tests.

use std::collections::HashSet;

use crate::cli::{flag_takes_value, parse_parameters, Parameters};
use crate::config::{process_env, ClientConfig, EnvLookup, ToolConfig};
use crate::errors::{PutLogsError, Result};
use crate::logging;
use crate::logs::types::{DescribeLogStreamsRequest, PutLogEventsRequest, PutLogEventsResponse};
use crate::logs::{load_log_events_file, CloudWatchLogsClient};
use crate::status::ExitStatus;

/// Main entry point for the CLI
///
/// On failure the error message is printed to stdout and the exit status is
/// [`ExitStatus::Error`]. A successful run prints nothing.
pub fn run(args: Vec<String>) -> ExitStatus {
    let args = match ToolConfig::load(&process_env) {
        Ok(config) => config.merge_into(args, flag_takes_value),
        Err(e) => {
            eprintln!("Warning: {}", e);
            args
        }
    };

    let params = match parse_parameters(&args) {
        Ok(Ok(params)) => params,
        Ok(Err(e)) => return handle_error(e),
        Err(e) => {
            return match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    e.print().ok();
                    ExitStatus::Success
                }
                // usage errors are failures like any other: message on stdout
                _ => {
                    print!("{}", e.render());
                    ExitStatus::Error
                }
            };
        }
    };

    logging::init(params.verbose, params.log_format);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            println!("failed to start runtime: {}", e);
            return ExitStatus::Error;
        }
    };

    match runtime.block_on(execute(params)) {
        Ok(()) => ExitStatus::Success,
        Err(e) => handle_error(e),
    }
}

fn handle_error(error: PutLogsError) -> ExitStatus {
    tracing::debug!(error = ?error, "invocation failed");
    println!("{}", error);
    ExitStatus::Error
}

/// Run one invocation against the process environment
pub async fn execute(params: Parameters) -> Result<()> {
    execute_with(params, &process_env).await
}

/// Run one invocation: resolve messages, build the client, upload
pub async fn execute_with(params: Parameters, lookup: EnvLookup<'_>) -> Result<()> {
    let logs = resolve_logs(&params).await?;

    let config = ClientConfig::resolve_with(&params, lookup).await?;
    let client = CloudWatchLogsClient::new(config)?;

    upload(&client, &params.log_group, params.log_stream.as_deref(), logs).await?;
    Ok(())
}

/// Messages to upload: the logs file when given, else the inline arguments
pub async fn resolve_logs(params: &Parameters) -> Result<Vec<String>> {
    let logs = match &params.logs_file {
        Some(path) => {
            if !params.logs.is_empty() {
                tracing::info!(
                    ignored = params.logs.len(),
                    "--logs-file given, ignoring inline log arguments"
                );
            }
            load_log_events_file(path).await?
        }
        None => params.logs.clone(),
    };

    if logs.is_empty() {
        return Err(PutLogsError::NoLogs);
    }
    Ok(logs)
}

/// Name of the stream in `log_group` with the most recent event
pub async fn latest_log_stream(client: &CloudWatchLogsClient, log_group: &str) -> Result<String> {
    let response = client
        .describe_log_streams(&DescribeLogStreamsRequest::latest(log_group))
        .await?;

    let stream = response
        .log_streams
        .into_iter()
        .next()
        .ok_or_else(|| PutLogsError::NoStream { log_group: log_group.to_string() })?;

    tracing::info!(log_group, log_stream = %stream.log_stream_name, "using latest log stream");
    Ok(stream.log_stream_name)
}

/// Current upload sequence token of `log_stream`
///
/// `Ok(None)` when the stream has no token yet or was not found; in the
/// latter case the write itself reports the missing stream.
pub async fn upload_sequence_token(
    client: &CloudWatchLogsClient,
    log_group: &str,
    log_stream: &str,
) -> Result<Option<String>> {
    let mut request = DescribeLogStreamsRequest::with_prefix(log_group, log_stream);
    let mut seen_tokens = HashSet::new();

    loop {
        let response = client.describe_log_streams(&request).await?;

        if let Some(stream) = response
            .log_streams
            .into_iter()
            .find(|s| s.log_stream_name == log_stream)
        {
            return Ok(stream.upload_sequence_token);
        }

        match response.next_token {
            Some(token) if seen_tokens.insert(token.clone()) => {
                request.next_token = Some(token);
            }
            _ => {
                tracing::debug!(log_group, log_stream, "log stream not found by prefix lookup");
                return Ok(None);
            }
        }
    }
}

/// Put every message into one stream with a single `PutLogEvents` call
///
/// When `log_stream` is `None` the most recently written stream is used.
/// All events share one millisecond timestamp.
pub async fn upload(
    client: &CloudWatchLogsClient,
    log_group: &str,
    log_stream: Option<&str>,
    logs: Vec<String>,
) -> Result<PutLogEventsResponse> {
    let log_stream = match log_stream {
        Some(name) => name.to_string(),
        None => latest_log_stream(client, log_group).await?,
    };

    let sequence_token = upload_sequence_token(client, log_group, &log_stream).await?;
    let timestamp = chrono::Utc::now().timestamp_millis();
    let count = logs.len();

    let request = PutLogEventsRequest::new(log_group, &log_stream, logs, timestamp)
        .sequence_token(sequence_token);
    let response = client.put_log_events(&request).await?;

    if let Some(rejected) = response.rejected_log_events_info.as_ref().filter(|r| !r.is_empty()) {
        tracing::warn!(
            too_new_start = ?rejected.too_new_log_event_start_index,
            too_old_end = ?rejected.too_old_log_event_end_index,
            expired_end = ?rejected.expired_log_event_end_index,
            "some log events were rejected by CloudWatch Logs"
        );
    }

    tracing::info!(log_group, log_stream = %log_stream, events = count, "uploaded log events");
    Ok(response)
}
