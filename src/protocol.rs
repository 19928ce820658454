//! Wire format of the Samsung remote-control WebSocket channel.
//!
//! Covers the connection URL, the key-press envelope we send, and the
//! handshake event the TV answers with.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub const REMOTE_CHANNEL_PATH: &str = "/api/v2/channels/samsung.remote.control";
pub const HANDSHAKE_EVENT: &str = "ms.channel.connect";
pub const CONTROL_METHOD: &str = "ms.remote.control";
pub const REMOTE_TYPE: &str = "SendRemoteKey";

const KEY_PREFIX: &str = "KEY_";

/// Whether the channel runs over TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSecurity {
    #[default]
    Secure,
    Insecure,
}

impl TransportSecurity {
    pub fn from_secure(secure: bool) -> Self {
        if secure {
            Self::Secure
        } else {
            Self::Insecure
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Self::Secure => "wss",
            Self::Insecure => "ws",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Secure => 8002,
            Self::Insecure => 8001,
        }
    }
}

/// Deployment environment.
///
/// TVs present self-signed certificates, so `Dev` turns off certificate and
/// hostname verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    #[default]
    Prod,
}

impl Environment {
    pub fn relaxes_tls(self) -> bool {
        matches!(self, Self::Dev)
    }
}

/// Build the channel URL, with `&token=` only when a token is cached.
pub fn connection_url(
    security: TransportSecurity,
    host: &str,
    port: u16,
    app_name: &str,
    token: Option<&str>,
) -> String {
    let mut url = format!(
        "{}://{}:{}{}?name={}",
        security.scheme(),
        host,
        port,
        REMOTE_CHANNEL_PATH,
        BASE64.encode(app_name)
    );
    if let Some(token) = token {
        url.push_str("&token=");
        url.push_str(token);
    }
    url
}

#[derive(Serialize)]
struct KeyPressMessage<'a> {
    method: &'static str,
    params: KeyPressParams<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct KeyPressParams<'a> {
    cmd: &'static str,
    data_of_cmd: &'a str,
    option: bool,
    type_of_remote: &'static str,
}

/// Prefix `name` with `KEY_` unless it already carries it.
pub fn key_code(name: &str) -> String {
    if name.starts_with(KEY_PREFIX) {
        name.to_string()
    } else {
        format!("{KEY_PREFIX}{name}")
    }
}

/// Serialize the pretty-printed click envelope for one key.
pub fn key_press_message(name: &str) -> Result<String> {
    let code = key_code(name);
    let message = KeyPressMessage {
        method: CONTROL_METHOD,
        params: KeyPressParams {
            cmd: "Click",
            data_of_cmd: &code,
            option: false,
            type_of_remote: REMOTE_TYPE,
        },
    };
    Ok(serde_json::to_string_pretty(&message)?)
}

/// An event frame pushed by the TV.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl ChannelEvent {
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn is_handshake(&self) -> bool {
        self.event == HANDSHAKE_EVENT
    }

    /// The pairing token, if the event carries one.
    ///
    /// Some firmware sends the token as a JSON number. Non-string values are
    /// kept in their JSON text form rather than dropped; `null` counts as absent.
    pub fn token(&self) -> Option<String> {
        match self.data.get("token")? {
            Value::Null => None,
            Value::String(token) => Some(token.clone()),
            other => Some(other.to_string()),
        }
    }
}
