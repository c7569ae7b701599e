use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "validator.toml";
pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub scheme: String,
    /// `None` means "the machine we are running on".
    pub host: Option<String>,
    pub port: u16,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.into(),
            host: None,
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment overrides.
pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.scheme {
                    settings.scheme = v;
                }
                if let Some(v) = file_cfg.host {
                    settings.host = Some(v);
                }
                if let Some(v) = file_cfg.port {
                    settings.port = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs.filter(|secs| *secs > 0) {
                    settings.request_timeout = Duration::from_secs(v);
                }
            }
            Err(err) => {
                warn!(path = %file.display(), error = %err, "ignoring unreadable settings file");
            }
        }
    }

    let lookup = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .rev()
            .find_map(|key| env(*key))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(v) = lookup(&["VALIDATOR_SCHEME", "APP__SCHEME"]) {
        settings.scheme = v;
    }
    if let Some(v) = lookup(&["VALIDATOR_HOST", "APP__HOST"]) {
        settings.host = Some(v);
    }
    if let Some(v) = lookup(&["VALIDATOR_PORT", "APP__PORT"]) {
        if let Ok(parsed) = v.parse::<u16>() {
            settings.port = parsed;
        }
    }
    if let Some(v) = lookup(&["APP__REQUEST_TIMEOUT_SECS"]) {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout = Duration::from_secs(parsed),
            _ => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
