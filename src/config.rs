//! Configuration handling
//!
//! Two layers:
//! - [`ToolConfig`]: the optional `config.toml` of awsputlogs itself, whose
//!   `[defaults] options` are prepended to the command line.
//! - [`ClientConfig`]: region, endpoint and credentials for the CloudWatch
//!   Logs client, resolved from flags, environment and shared AWS profiles.

use std::path::PathBuf;

use url::Url;

use crate::auth::aws::AwsCredentials;
use crate::auth::aws_config::{self, SharedProfile};
use crate::cli::Parameters;
use crate::errors::{PutLogsError, RemoteError, Result};

/// Environment variable lookup, injectable so resolution can be tested
/// without touching the process environment
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Lookup backed by the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Region used when nothing else names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Signing name of CloudWatch Logs
pub const SERVICE_NAME: &str = "logs";

/// awsputlogs configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolConfig {
    pub path: Option<PathBuf>,
    pub default_options: Vec<String>,
}

impl ToolConfig {
    /// Load the configuration file (TOML format)
    ///
    /// A missing file is not an error; it yields the defaults.
    pub fn load(lookup: EnvLookup<'_>) -> Result<Self> {
        let Some(path) = Self::file_path(lookup) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| PutLogsError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let mut config = Self::parse(&content)?;
        config.path = Some(path);
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(content)
            .map_err(|e| PutLogsError::Config(format!("invalid config TOML: {}", e)))?;

        let default_options = value
            .get("defaults")
            .and_then(|d| d.get("options"))
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default();

        Ok(Self { path: None, default_options })
    }

    /// `AWSPUTLOGS_CONFIG`, else `<config dir>/awsputlogs/config.toml`
    fn file_path(lookup: EnvLookup<'_>) -> Option<PathBuf> {
        lookup("AWSPUTLOGS_CONFIG")
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|p| p.join("awsputlogs").join("config.toml")))
    }

    /// Insert the configured default flags right after the program name
    ///
    /// Only flags are taken: `--region=eu-west-1`, or `--region` followed by
    /// its value when `takes_value` says the flag has one. Other entries would
    /// turn into log messages, so they are dropped with a warning. Flags given
    /// on the command line come later and win.
    pub fn merge_into(&self, args: Vec<String>, takes_value: impl Fn(&str) -> bool) -> Vec<String> {
        let mut flags = Vec::new();
        let mut positional = Vec::new();
        let mut options = self.default_options.iter();

        while let Some(option) = options.next() {
            if !option.starts_with('-') {
                positional.push(option);
                continue;
            }
            flags.push(option.clone());
            if !option.contains('=') && takes_value(option) {
                flags.extend(options.next().cloned());
            }
        }

        if !positional.is_empty() {
            eprintln!("Warning: positional entries in default options are ignored: {:?}", positional);
            eprintln!("Only flags (starting with -) and their values can be used in default options.");
        }

        if flags.is_empty() {
            return args;
        }

        let mut args = args.into_iter();
        let mut merged: Vec<String> = args.next().into_iter().collect();
        merged.extend(flags);
        merged.extend(args);
        merged
    }
}

/// Everything needed to build a CloudWatch Logs client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub region: String,
    pub endpoint: Url,
    pub credentials: AwsCredentials,
}

impl ClientConfig {
    pub fn new(region: impl Into<String>, endpoint: Url, credentials: AwsCredentials) -> Self {
        Self { region: region.into(), endpoint, credentials }
    }

    /// Resolve from the flags, then `lookup` and the shared AWS files
    pub async fn resolve_with(params: &Parameters, lookup: EnvLookup<'_>) -> Result<Self> {
        let profile_name = params
            .profile
            .clone()
            .unwrap_or_else(|| aws_config::default_profile_name(lookup));
        let profile = aws_config::load_profile(&profile_name, lookup)?;
        if params.profile.is_some() && profile.is_none() {
            return Err(PutLogsError::Config(format!(
                "AWS profile '{}' not found in the shared config files",
                profile_name
            )));
        }

        let region = resolve_region(
            params.region.as_deref(),
            profile.as_ref(),
            params.profile.is_some(),
            lookup,
        );
        let endpoint = resolve_endpoint(params.endpoint_url.as_deref(), &region, lookup)?;
        let credentials =
            resolve_credentials(&profile_name, profile.as_ref(), &region, lookup).await?;

        tracing::debug!(
            region = %region,
            endpoint = %endpoint,
            profile = %profile_name,
            access_key_id = %credentials.access_key_id,
            "resolved client configuration"
        );

        Ok(Self { region, endpoint, credentials })
    }
}

/// `--region` > named profile > `AWS_REGION` > `AWS_DEFAULT_REGION` > default profile
///
/// A profile given with `--profile` ranks above the environment; the
/// implicit default profile ranks below it.
fn resolve_region(
    flag: Option<&str>,
    profile: Option<&SharedProfile>,
    profile_named: bool,
    lookup: EnvLookup<'_>,
) -> String {
    let non_empty = |v: &String| !v.is_empty();
    let profile_region = || profile.and_then(|p| p.region.clone()).filter(non_empty);

    flag.map(str::to_string)
        .or_else(|| profile_named.then(profile_region).flatten())
        .or_else(|| lookup("AWS_REGION").filter(non_empty))
        .or_else(|| lookup("AWS_DEFAULT_REGION").filter(non_empty))
        .or_else(profile_region)
        .unwrap_or_else(|| {
            tracing::debug!("no region configured, using {}", DEFAULT_REGION);
            DEFAULT_REGION.to_string()
        })
}

fn resolve_endpoint(flag: Option<&str>, region: &str, lookup: EnvLookup<'_>) -> Result<Url> {
    let explicit = flag
        .map(str::to_string)
        .or_else(|| lookup("AWS_ENDPOINT_URL_CLOUDWATCH_LOGS").filter(|v| !v.is_empty()))
        .or_else(|| lookup("AWS_ENDPOINT_URL").filter(|v| !v.is_empty()));

    match explicit {
        Some(raw) => parse_endpoint(&raw),
        None => parse_endpoint(&default_endpoint(region)),
    }
}

/// Public regional endpoint of CloudWatch Logs
pub fn default_endpoint(region: &str) -> String {
    if region.starts_with("cn-") {
        format!("https://logs.{}.amazonaws.com.cn", region)
    } else {
        format!("https://logs.{}.amazonaws.com", region)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let invalid = |message: String| RemoteError::InvalidEndpoint { endpoint: raw.to_string(), message };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid("expected an http or https URL with a host".to_string()).into());
    }
    Ok(url)
}

/// Environment keys > profile keys > `credential_process` > the SDK provider chain
async fn resolve_credentials(
    profile_name: &str,
    profile: Option<&SharedProfile>,
    region: &str,
    lookup: EnvLookup<'_>,
) -> Result<AwsCredentials> {
    if let Some(credentials) = AwsCredentials::from_env(lookup) {
        return Ok(credentials);
    }

    if let Some(profile) = profile {
        if let Some(credentials) = AwsCredentials::from_profile(profile).await? {
            return Ok(credentials);
        }
    }

    if provider_chain_applies(profile, lookup) {
        if let Some(credentials) = AwsCredentials::from_provider_chain(profile_name, region).await {
            return Ok(credentials);
        }
    }

    Err(PutLogsError::Auth(
        "no AWS credentials found. set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY or configure a profile"
            .to_string(),
    ))
}

/// Whether web identity, SSO, assume-role, container or instance credentials
/// could be available
fn provider_chain_applies(profile: Option<&SharedProfile>, lookup: EnvLookup<'_>) -> bool {
    let set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());
    let imds_disabled =
        lookup("AWS_EC2_METADATA_DISABLED").is_some_and(|v| v.eq_ignore_ascii_case("true"));

    set("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI")
        || set("AWS_CONTAINER_CREDENTIALS_FULL_URI")
        || set("AWS_WEB_IDENTITY_TOKEN_FILE")
        || profile.is_some_and(SharedProfile::has_delegated_credentials)
        || !imds_disabled
}
