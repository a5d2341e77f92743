//! Shared AWS config and credentials files
//!
//! Reads the INI files the AWS CLI writes (`~/.aws/credentials` and
//! `~/.aws/config`, or the paths in `AWS_SHARED_CREDENTIALS_FILE` /
//! `AWS_CONFIG_FILE`) and merges one named profile out of them.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::EnvLookup;
use crate::errors::{PutLogsError, Result};

/// Key/value pairs of every section, keyed by profile name
type Sections = HashMap<String, HashMap<String, String>>;

/// The settings of one profile that matter for CloudWatch Logs access
#[derive(Clone, Default, PartialEq)]
pub struct SharedProfile {
    pub name: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub region: Option<String>,
    pub credential_process: Option<String>,
    pub role_arn: Option<String>,
    pub web_identity_token_file: Option<String>,
    pub sso_session: Option<String>,
    pub sso_start_url: Option<String>,
}

impl std::fmt::Debug for SharedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedProfile")
            .field("name", &self.name)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "[REDACTED]"))
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .field("region", &self.region)
            .field("credential_process", &self.credential_process)
            .field("role_arn", &self.role_arn)
            .field("sso_session", &self.sso_session)
            .finish()
    }
}

impl SharedProfile {
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Assume-role, web identity or SSO settings, which only the SDK provider chain resolves
    pub fn has_delegated_credentials(&self) -> bool {
        self.role_arn.is_some()
            || self.web_identity_token_file.is_some()
            || self.sso_session.is_some()
            || self.sso_start_url.is_some()
    }

    /// Fill unset fields from a section; values already present win
    fn merge(&mut self, section: &HashMap<String, String>) {
        let pick = |slot: &mut Option<String>, key: &str| {
            if slot.is_none() {
                *slot = section.get(key).cloned();
            }
        };
        pick(&mut self.access_key_id, "aws_access_key_id");
        pick(&mut self.secret_access_key, "aws_secret_access_key");
        pick(&mut self.session_token, "aws_session_token");
        pick(&mut self.region, "region");
        pick(&mut self.credential_process, "credential_process");
        pick(&mut self.role_arn, "role_arn");
        pick(&mut self.web_identity_token_file, "web_identity_token_file");
        pick(&mut self.sso_session, "sso_session");
        pick(&mut self.sso_start_url, "sso_start_url");
    }
}

/// Profile selected when `--profile` is not given
pub fn default_profile_name(lookup: EnvLookup<'_>) -> String {
    lookup("AWS_PROFILE")
        .or_else(|| lookup("AWS_DEFAULT_PROFILE"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

/// Load `name` from the shared files
///
/// Returns `Ok(None)` when neither file mentions the profile. The credentials
/// file takes precedence over the config file for keys present in both.
pub fn load_profile(name: &str, lookup: EnvLookup<'_>) -> Result<Option<SharedProfile>> {
    let credentials = read_sections(credentials_file_path(lookup), false)?;
    let config = read_sections(config_file_path(lookup), true)?;

    let sections: Vec<&HashMap<String, String>> =
        [credentials.get(name), config.get(name)].into_iter().flatten().collect();
    if sections.is_empty() {
        return Ok(None);
    }

    let mut profile = SharedProfile { name: name.to_string(), ..Default::default() };
    for section in sections {
        profile.merge(section);
    }
    Ok(Some(profile))
}

fn credentials_file_path(lookup: EnvLookup<'_>) -> Option<PathBuf> {
    lookup("AWS_SHARED_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".aws").join("credentials")))
}

fn config_file_path(lookup: EnvLookup<'_>) -> Option<PathBuf> {
    lookup("AWS_CONFIG_FILE")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".aws").join("config")))
}

fn read_sections(path: Option<PathBuf>, is_config_file: bool) -> Result<Sections> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(Sections::new());
    };

    let content = std::fs::read_to_string(&path).map_err(|e| {
        PutLogsError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    Ok(parse_sections(&content, is_config_file))
}

/// Parse INI content into per-profile sections
///
/// Config-file sections are named `[profile NAME]` except `[default]`;
/// other config sections (`sso-session`, `services`) are skipped.
fn parse_sections(content: &str, is_config_file: bool) -> Sections {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let header = header.trim();
            current = if !is_config_file || header == "default" {
                Some(header.to_string())
            } else {
                header.strip_prefix("profile ").map(|name| name.trim().to_string())
            };
            if let Some(name) = &current {
                sections.entry(name.clone()).or_default();
            }
            continue;
        }

        let (Some(name), Some((key, value))) = (&current, line.split_once('=')) else {
            continue;
        };
        if let Some(section) = sections.get_mut(name) {
            section.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    sections
}
