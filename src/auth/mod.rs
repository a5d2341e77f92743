//! Authentication handling
//!
//! - AWS credentials from the environment or shared-config profiles
//! - AWS Signature Version 4 request signing

pub mod aws;
pub mod aws_config;

pub use aws::{sign_request, AwsCredentials};
pub use aws_config::SharedProfile;
