//! awsputlogs library interface
//!
//! Uploads plain-text and JSON log events to an AWS CloudWatch Logs stream.
//!
//! # Module Organization
//!
//! - [`cli`] - Command-line arguments and the validated [`cli::Parameters`]
//! - [`logs`] - Log events file normalization and the CloudWatch Logs client
//! - [`auth`] - AWS credentials and SigV4 signing
//! - [`config`] - Client and tool configuration
//! - [`core`] - The invocation flow
//! - [`errors`] - Error types (PutLogsError, Result)
//! - [`status`] - Exit status codes (ExitStatus)

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod logs;
pub mod status;
