use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::protocol::CALCULATE_PATH;
use url::Url;

use crate::error::ClientError;

pub const SETTINGS_FILE: &str = "calculator.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub page_url: String,
    pub endpoint: String,
    pub request_color: bool,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            page_url: "http://127.0.0.1:8000/".into(),
            endpoint: CALCULATE_PATH.into(),
            request_color: false,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    page_url: Option<String>,
    endpoint: Option<String>,
    request_color: Option<bool>,
    request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    /// Resolves `endpoint` relative to `page_url`, the way a browser resolves
    /// a relative request path against the current document.
    pub fn endpoint_url(&self) -> Result<Url, ClientError> {
        let page = Url::parse(&self.page_url).map_err(|source| ClientError::InvalidPageUrl {
            url: self.page_url.clone(),
            source,
        })?;
        page.join(&self.endpoint)
            .map_err(|source| ClientError::InvalidEndpoint {
                page_url: self.page_url.clone(),
                endpoint: self.endpoint.clone(),
                source,
            })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    fn merge_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.page_url {
            self.page_url = v;
        }
        if let Some(v) = file_cfg.endpoint {
            self.endpoint = v;
        }
        if let Some(v) = file_cfg.request_color {
            self.request_color = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CALC_PAGE_URL") {
            self.page_url = v;
        }
        if let Some(v) = lookup("APP__PAGE_URL") {
            self.page_url = v;
        }

        if let Some(v) = lookup("APP__ENDPOINT") {
            self.endpoint = v;
        }

        if let Some(v) = lookup("APP__REQUEST_COLOR") {
            if let Some(parsed) = parse_flag(&v) {
                self.request_color = parsed;
            }
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                self.request_timeout_secs = Some(parsed);
            }
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Defaults, then `calculator.toml` from the working directory, then the
/// process environment. A missing or unreadable file is skipped.
pub fn load_settings() -> ClientSettings {
    let path = PathBuf::from(SETTINGS_FILE);
    let mut settings = ClientSettings::default();
    if path.exists() {
        match read_settings_file(&path) {
            Ok(file_cfg) => settings.merge_file(file_cfg),
            Err(err) => tracing::warn!("ignoring settings file: {err}"),
        }
    }
    settings.apply_env(|key| std::env::var(key).ok());
    settings
}

/// Strict variant used when the caller names a settings file explicitly.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ClientError> {
    let mut settings = ClientSettings::default();
    settings.merge_file(read_settings_file(path)?);
    settings.apply_env(env);
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<FileSettings, ClientError> {
    let raw = fs::read_to_string(path).map_err(|source| ClientError::ReadSettings {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ClientError::ParseSettings {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
