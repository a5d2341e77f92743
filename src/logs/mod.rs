//! CloudWatch Logs: input normalization, wire types and the client

pub mod client;
pub mod entry;
pub mod normalizer;
pub mod types;

pub use client::CloudWatchLogsClient;
pub use entry::LogEntry;
pub use normalizer::{load_log_events_file, parse_log_events};
