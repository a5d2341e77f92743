//! AWS credentials and Signature Version 4 signing
//!
//! CloudWatch Logs requests are signed for the `logs` service with the
//! credentials resolved from the environment, a shared-config profile or,
//! failing those, the AWS SDK default provider chain.

use std::fmt;
use std::time::SystemTime;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use url::Url;

use super::aws_config::SharedProfile;
use crate::config::EnvLookup;
use crate::errors::{PutLogsError, Result};

/// Static or temporary AWS credentials
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    /// Credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`
    pub fn from_env(lookup: EnvLookup<'_>) -> Option<Self> {
        let access_key = lookup("AWS_ACCESS_KEY_ID").filter(|v| !v.is_empty())?;
        let secret_key = lookup("AWS_SECRET_ACCESS_KEY").filter(|v| !v.is_empty())?;
        let token = lookup("AWS_SESSION_TOKEN").filter(|v| !v.is_empty());
        Some(Self::new(access_key, secret_key).with_session_token(token))
    }

    /// Credentials from a shared-config profile
    ///
    /// Static keys win over `credential_process`. `Ok(None)` means the profile
    /// has neither.
    pub async fn from_profile(profile: &SharedProfile) -> Result<Option<Self>> {
        if let (Some(access_key), Some(secret_key)) =
            (&profile.access_key_id, &profile.secret_access_key)
        {
            return Ok(Some(
                Self::new(access_key, secret_key).with_session_token(profile.session_token.clone()),
            ));
        }

        match &profile.credential_process {
            Some(command) => Self::from_credential_process(command).await.map(Some),
            None => Ok(None),
        }
    }

    /// Credentials from the AWS SDK default provider chain
    ///
    /// Covers what the shared files alone cannot: web identity tokens, SSO,
    /// assume-role profiles, ECS container credentials and EC2 instance
    /// metadata. `None` when no provider yields credentials.
    pub async fn from_provider_chain(profile_name: &str, region: &str) -> Option<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile_name)
            .region(Region::new(region.to_string()))
            .load()
            .await;
        let provider = sdk_config.credentials_provider()?;

        match provider.provide_credentials().await {
            Ok(credentials) => {
                tracing::debug!(profile = profile_name, "credentials from the SDK provider chain");
                Some(
                    Self::new(credentials.access_key_id(), credentials.secret_access_key())
                        .with_session_token(credentials.session_token().map(str::to_string)),
                )
            }
            Err(e) => {
                tracing::debug!(error = %e, "SDK provider chain found no credentials");
                None
            }
        }
    }

    /// Run a `credential_process` command and read its JSON output
    async fn from_credential_process(command: &str) -> Result<Self> {
        let output = if cfg!(target_os = "windows") {
            tokio::process::Command::new("cmd").args(["/C", command]).output().await
        } else {
            tokio::process::Command::new("sh").args(["-c", command]).output().await
        }
        .map_err(|e| PutLogsError::Auth(format!("failed to run credential_process: {}", e)))?;

        if !output.status.success() {
            return Err(PutLogsError::Auth(format!(
                "credential_process failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_credential_process_output(&output.stdout)
    }
}

fn parse_credential_process_output(stdout: &[u8]) -> Result<AwsCredentials> {
    let json: serde_json::Value = serde_json::from_slice(stdout).map_err(|e| {
        PutLogsError::Auth(format!("failed to parse credential_process output: {}", e))
    })?;

    let field = |name: &str| json.get(name).and_then(|v| v.as_str()).map(str::to_string);
    let access_key = field("AccessKeyId").ok_or_else(|| {
        PutLogsError::Auth("credential_process output missing AccessKeyId".to_string())
    })?;
    let secret_key = field("SecretAccessKey").ok_or_else(|| {
        PutLogsError::Auth("credential_process output missing SecretAccessKey".to_string())
    })?;

    Ok(AwsCredentials::new(access_key, secret_key).with_session_token(field("SessionToken")))
}

/// Host header value for `url`; the port is kept only when it is not the scheme default
pub fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Sign a request and return the headers to add to it
///
/// `headers` must hold every header that will be sent and should be covered
/// by the signature (content type, target). The returned list contains
/// `host`, `x-amz-date`, `authorization` and, for temporary credentials,
/// `x-amz-security-token`.
#[allow(clippy::too_many_arguments)]
pub fn sign_request(
    credentials: &AwsCredentials,
    region: &str,
    service: &str,
    method: &str,
    url: &Url,
    headers: &[(&str, &str)],
    body: &[u8],
    time: SystemTime,
) -> Result<Vec<(String, String)>> {
    let host = host_header(url)
        .ok_or_else(|| PutLogsError::Config(format!("endpoint URL {} has no host", url)))?;

    let uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    let identity = Credentials::new(
        &credentials.access_key_id,
        &credentials.secret_access_key,
        credentials.session_token.clone(),
        None,
        "awsputlogs",
    )
    .into();

    let signing_params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(service)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| PutLogsError::Auth(format!("failed to build signing params: {}", e)))?;

    let mut signed_headers: Vec<(&str, &str)> = vec![("host", host.as_str())];
    signed_headers.extend(headers.iter().copied());

    let signable_request = SignableRequest::new(
        method,
        &uri,
        signed_headers.into_iter(),
        SignableBody::Bytes(body),
    )
    .map_err(|e| PutLogsError::Auth(format!("failed to create signable request: {}", e)))?;

    let (instructions, _signature) = sign(signable_request, &signing_params.into())
        .map_err(|e| PutLogsError::Auth(format!("failed to sign request: {}", e)))?
        .into_parts();

    let mut out = vec![("host".to_string(), host.clone())];
    out.extend(
        instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string())),
    );
    Ok(out)
}
