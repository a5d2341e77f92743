//! Post-processing of parsed arguments
//!
//! Turns clap's [`Args`] into the validated [`Parameters`] value the
//! invocation flow runs on. Nothing here reads the process argument vector;
//! callers pass the arguments in.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use super::args::{Args, LogFormat};
use crate::errors::{PutLogsError, Result};

/// Validated invocation parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub log_group: String,
    pub log_stream: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub logs_file: Option<PathBuf>,
    pub profile: Option<String>,
    /// Inline log messages; ignored when `logs_file` is set
    pub logs: Vec<String>,
    pub verbose: u8,
    pub log_format: LogFormat,
}

/// Empty flag values count as "not given"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<Args> for Parameters {
    type Error = PutLogsError;

    fn try_from(args: Args) -> Result<Self> {
        let log_group = non_empty(args.log_group)
            .ok_or_else(|| PutLogsError::Argument("--log-group is required".to_string()))?;

        Ok(Self {
            log_group,
            log_stream: non_empty(args.log_stream),
            region: non_empty(args.region),
            endpoint_url: non_empty(args.endpoint_url),
            logs_file: args.logs_file.filter(|p| !p.as_os_str().is_empty()),
            profile: non_empty(args.profile),
            logs: args.logs,
            verbose: args.verbose,
            log_format: args.log_format,
        })
    }
}

/// Parse an argument vector (program name first) into [`Parameters`]
///
/// clap's own errors (unknown flag, `--help`, `--version`) are returned
/// untouched so the caller can print them the way clap intends.
pub fn parse_parameters<I, T>(args: I) -> std::result::Result<Result<Parameters>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args).map(Parameters::try_from)
}
