//! JSON configuration file and duration parsing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{
    ClientSettings, DEFAULT_APP_NAME, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT,
};
use crate::command::DEFAULT_KEY_DELAY;
use crate::error::{RemoteError, Result};
use crate::protocol::{Environment, TransportSecurity};
use crate::token::{FileTokenStore, TokenStore};
use crate::validator::KeyValidator;

const MAX_KEY_DELAY: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,

    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Falls back to 8002 (secure) or 8001 (insecure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub valid_keys: Vec<String>,

    /// Use the built-in Samsung key table when `valid_keys` is empty.
    #[serde(default)]
    pub restrict_to_known_keys: bool,

    #[serde(default = "default_key_delay", with = "duration_format")]
    pub key_delay: Duration,

    #[serde(default = "default_connect_timeout", with = "duration_format")]
    pub connect_timeout: Duration,

    #[serde(default = "default_handshake_timeout", with = "duration_format")]
    pub handshake_timeout: Duration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,

    #[serde(default)]
    pub verbose: bool,
}

fn default_secure() -> bool {
    true
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_key_delay() -> Duration {
    DEFAULT_KEY_DELAY
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_handshake_timeout() -> Duration {
    DEFAULT_HANDSHAKE_TIMEOUT
}

impl Config {
    /// A config for `host` with every other field at its default.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            secure: default_secure(),
            port: None,
            app_name: default_app_name(),
            environment: Environment::default(),
            valid_keys: Vec::new(),
            restrict_to_known_keys: false,
            key_delay: default_key_delay(),
            connect_timeout: default_connect_timeout(),
            handshake_timeout: default_handshake_timeout(),
            token_file: None,
            verbose: false,
        }
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| RemoteError::config_load(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| RemoteError::config_load(path, e.to_string()))
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| RemoteError::config_save(path, e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(RemoteError::config_validation("host cannot be empty"));
        }
        if host
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
        {
            return Err(RemoteError::config_validation(format!(
                "host '{}' must be a bare hostname or IP address",
                self.host
            )));
        }

        if self.port == Some(0) {
            return Err(RemoteError::config_validation("port must be greater than 0"));
        }

        if self.app_name.trim().is_empty() {
            return Err(RemoteError::config_validation("app_name cannot be empty"));
        }

        if self.key_delay > MAX_KEY_DELAY {
            return Err(RemoteError::config_validation(
                "key_delay cannot be longer than 1h",
            ));
        }

        if self.valid_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(RemoteError::config_validation(
                "valid_keys cannot contain empty entries",
            ));
        }

        Ok(())
    }

    pub fn security(&self) -> TransportSecurity {
        TransportSecurity::from_secure(self.secure)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.security().default_port())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::new(self.host.trim(), self.security())
            .with_port(self.port())
            .with_app_name(&self.app_name)
            .with_environment(self.environment)
            .with_timeouts(self.connect_timeout, self.handshake_timeout)
    }

    /// Explicit `valid_keys` win; otherwise the built-in table or no checks.
    pub fn key_validator(&self) -> KeyValidator {
        if !self.valid_keys.is_empty() {
            KeyValidator::new(&self.valid_keys)
        } else if self.restrict_to_known_keys {
            KeyValidator::samsung_default()
        } else {
            KeyValidator::allow_all()
        }
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(default_token_path)
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::new(FileTokenStore::new(self.token_path()))
    }
}

fn default_token_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("tvremote"))
        .unwrap_or_else(|| PathBuf::from("var/cache"))
        .join("tokens.json")
}

/// Parse `"500ms"`, `"1.5s"`, `"2m"`, `"1h"` or a bare millisecond count.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let value = input.trim().to_lowercase();
    if value.is_empty() {
        return Err(RemoteError::invalid_duration(input, "empty duration"));
    }

    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);

    if number.is_empty() {
        return Err(RemoteError::invalid_duration(input, "missing number"));
    }

    let amount: f64 = number
        .parse()
        .map_err(|_| RemoteError::invalid_duration(input, "not a number"))?;

    let nanos_per_unit = match unit.trim() {
        "" | "ms" => 1e6,
        "s" => 1e9,
        "m" => 60e9,
        "h" => 3600e9,
        other => {
            return Err(RemoteError::invalid_duration(
                input,
                format!("unknown unit '{other}'"),
            ))
        }
    };

    let nanos = (amount * nanos_per_unit).round();
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(RemoteError::invalid_duration(input, "duration too large"));
    }

    Ok(Duration::from_nanos(nanos as u64))
}

/// Render a duration in the form [`parse_duration`] reads back.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos % 1_000_000 != 0 {
        // Fractional milliseconds, e.g. "0.5ms".
        return format!("{}ms", nanos as f64 / 1e6);
    }

    let millis = duration.as_millis();
    if millis > 0 && millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

/// Serde adapter storing durations as human-readable strings.
pub mod duration_format {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
