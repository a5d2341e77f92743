//! CLI argument definitions using clap

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
The logs file holds a JSON array of strings and/or JSON objects:

  [{\"level\":\"info\",\"message\":\"Start Server\"}, \"[ERROR] Failed to Start Server\"]

Objects are uploaded as compact JSON text, strings as they are.";

/// awsputlogs - upload JSON and string logs to AWS CloudWatch Logs
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "awsputlogs", version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Args {
    /// The name of the log group to put logs to (required)
    #[arg(long = "log-group", value_name = "NAME")]
    pub log_group: Option<String>,

    /// The name of the log stream to put logs to. Defaults to the most
    /// recently written stream of the log group
    #[arg(long = "log-stream", value_name = "NAME")]
    pub log_stream: Option<String>,

    /// AWS region; overrides the region from the environment and config files
    #[arg(long = "region", value_name = "REGION")]
    pub region: Option<String>,

    /// Endpoint URL; overrides the default CloudWatch Logs endpoint
    #[arg(long = "endpoint-url", value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// JSON file holding the log events. Takes precedence over LOG arguments
    #[arg(long = "logs-file", value_name = "PATH")]
    pub logs_file: Option<PathBuf>,

    /// Shared config profile used for credentials and region. Defaults to
    /// $AWS_PROFILE, then "default"
    #[arg(long = "profile", value_name = "NAME")]
    pub profile: Option<String>,

    /// Increase diagnostic output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Format of diagnostic output
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log messages to upload, used when --logs-file is not given
    #[arg(value_name = "LOG")]
    pub logs: Vec<String>,
}

/// Output format of diagnostic logging
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines (default)
    #[default]
    Text,
    /// JSON Lines
    Json,
}

/// Whether `flag` (`--name` or `-x`, without `=value`) consumes the next
/// argument as its value
pub fn flag_takes_value(flag: &str) -> bool {
    let command = Args::command();
    let arg = match flag.strip_prefix("--") {
        Some(long) => command.get_arguments().find(|a| a.get_long() == Some(long)),
        None => {
            let mut chars = flag.strip_prefix('-').unwrap_or_default().chars();
            match (chars.next(), chars.next()) {
                (Some(short), None) => command.get_arguments().find(|a| a.get_short() == Some(short)),
                _ => None,
            }
        }
    };
    arg.is_some_and(|a| a.get_action().takes_values())
}
