//! # tvremote
//!
//! Send remote-control key presses to Samsung TVs (2016 and later) over the
//! TV's WebSocket remote-control channel.
//!
//! ## Features
//!
//! - Queue one or more keys and send them with a pause after each press
//! - Pairing token cached on disk and reused, so the TV asks for approval once
//! - Optional allow-list of key names, with the Samsung key table built in
//! - Connect and handshake timeouts, plus a cancel handle for long sequences
//! - JSON configuration file support
//!
//! ## Example
//!
//! ```no_run
//! use tvremote::{Config, RemoteClient, DEFAULT_KEY_DELAY};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::new("192.168.1.20");
//! let mut client = RemoteClient::new(config.client_settings(), config.token_store())
//!     .with_validator(config.key_validator());
//!
//! // Keys go out last-queued first: this sends ENTER, then HOME.
//! client.send_keys(["home", "enter"], DEFAULT_KEY_DELAY).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Configuration can be provided via JSON files:
//!
//! ```json
//! {
//!   "host": "192.168.1.20",
//!   "secure": true,
//!   "app_name": "Living Room Remote",
//!   "key_delay": "500ms"
//! }
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod protocol;
pub mod token;
pub mod transport;
pub mod validator;

pub use client::{CancelHandle, ClientSettings, ClientState, RemoteClient};
pub use command::{CommandQueue, KeyCommand, DEFAULT_KEY_DELAY};
pub use config::Config;
pub use error::{RemoteError, Result};
pub use protocol::{Environment, TransportSecurity};
pub use token::{FileTokenStore, MemoryTokenStore, TokenCache, TokenStore, REMOTE_TOKEN_KEY};
pub use transport::{Connection, Connector, WsConnector};
pub use validator::{KeyValidator, SAMSUNG_KEYS};
