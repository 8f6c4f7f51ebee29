use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::{logging::DEFAULT_LOG_FILTER, MAX_UPLOAD_BYTES};

pub const DEFAULT_CONFIG_FILE: &str = "ecosort.toml";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub max_upload_bytes: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    max_upload_bytes: Option<u64>,
    log_filter: Option<String>,
}

/// Defaults, then `ecosort.toml` (or `config_path`), then environment overrides.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    config_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if let Some(file_cfg) = read_file_settings(&path, config_path.is_some()) {
        if let Some(v) = file_cfg.server_url {
            settings.server_url = v;
        }
        if let Some(v) = file_cfg.max_upload_bytes {
            settings.max_upload_bytes = v;
        }
        if let Some(v) = file_cfg.log_filter {
            settings.log_filter = v;
        }
    }

    if let Some(v) = env("ECOSORT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("APP__MAX_UPLOAD_BYTES") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.max_upload_bytes = parsed,
            Err(err) => warn!("ignoring APP__MAX_UPLOAD_BYTES={v:?}: {err}"),
        }
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }

    settings.server_url = normalize_server_url(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;

    Ok(settings)
}

fn read_file_settings(path: &Path, explicit: bool) -> Option<FileSettings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            if explicit {
                warn!("could not read config file '{}': {err}", path.display());
            }
            return None;
        }
    };

    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => Some(file_cfg),
        Err(err) => {
            warn!("ignoring malformed config file '{}': {err}", path.display());
            None
        }
    }
}

pub fn normalize_server_url(raw_server_url: &str) -> anyhow::Result<String> {
    let trimmed = raw_server_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(DEFAULT_SERVER_URL.to_string());
    }

    let parsed = Url::parse(trimmed)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("unsupported scheme '{}'", parsed.scheme());
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
