//! The remote-control client: queueing, handshake and paced dispatch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::command::{CommandQueue, KeyCommand};
use crate::error::{RemoteError, Result};
use crate::protocol::{self, ChannelEvent, Environment, TransportSecurity};
use crate::token::{TokenCache, TokenStore};
use crate::transport::{Connection, Connector, WsConnector};
use crate::validator::KeyValidator;

pub const DEFAULT_APP_NAME: &str = "Remote";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters, fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub host: String,
    pub port: u16,
    pub security: TransportSecurity,
    pub app_name: String,
    pub environment: Environment,
    /// Bound on connection establishment. Zero waits forever.
    pub connect_timeout: Duration,
    /// Bound on the wait for the handshake event. Zero waits forever.
    pub handshake_timeout: Duration,
}

impl ClientSettings {
    /// Settings for `host` with the conventional port for `security`.
    pub fn new(host: impl Into<String>, security: TransportSecurity) -> Self {
        Self {
            host: host.into(),
            port: security.default_port(),
            security,
            app_name: DEFAULT_APP_NAME.to_string(),
            environment: Environment::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, handshake: Duration) -> Self {
        self.connect_timeout = connect;
        self.handshake_timeout = handshake;
        self
    }
}

/// Where the client is in the connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Connecting,
    AwaitingHandshake,
    Dispatching,
    Closing,
    Closed,
    Failed,
}

/// Aborts the dispatch currently running on the client it came from.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<u64>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_modify(|generation| *generation += 1);
    }
}

/// Sends key presses to a Samsung TV over its remote-control channel.
///
/// Keys are queued, then [`send_queue`](Self::send_queue) connects, waits for
/// the handshake and sends one key at a time, pausing for each key's delay.
/// The most recently queued key is sent first.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tvremote::{ClientSettings, MemoryTokenStore, RemoteClient, TransportSecurity};
///
/// # async fn run() -> tvremote::Result<()> {
/// let settings = ClientSettings::new("10.0.0.5", TransportSecurity::Secure);
/// let mut client = RemoteClient::new(settings, Arc::new(MemoryTokenStore::new()));
/// client.send_key("home", tvremote::DEFAULT_KEY_DELAY).await?;
/// # Ok(())
/// # }
/// ```
pub struct RemoteClient {
    settings: ClientSettings,
    validator: KeyValidator,
    tokens: TokenCache,
    connector: Box<dyn Connector>,
    queue: CommandQueue,
    state: ClientState,
    cancel_sender: Arc<watch::Sender<u64>>,
    cancel_receiver: watch::Receiver<u64>,
}

impl RemoteClient {
    pub fn new(settings: ClientSettings, token_store: Arc<dyn TokenStore>) -> Self {
        let (cancel_sender, cancel_receiver) = watch::channel(0);
        Self {
            settings,
            validator: KeyValidator::allow_all(),
            tokens: TokenCache::new(token_store),
            connector: Box::new(WsConnector::new()),
            queue: CommandQueue::new(),
            state: ClientState::Idle,
            cancel_sender: Arc::new(cancel_sender),
            cancel_receiver,
        }
    }

    pub fn with_validator(mut self, validator: KeyValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Box::new(connector);
        self
    }

    pub fn host(&self) -> &str {
        &self.settings.host
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            sender: Arc::clone(&self.cancel_sender),
        }
    }

    /// Validate and queue a key press. The name is upper-cased.
    pub fn queue_key(&mut self, name: &str, delay: Duration) -> Result<()> {
        let name = name.trim().to_uppercase();
        if name.is_empty() || !self.validator.is_valid(&name) {
            return Err(RemoteError::invalid_command(name));
        }

        self.queue.push(KeyCommand::new(name, delay));
        Ok(())
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Drop anything pending and send exactly this key.
    pub async fn send_key(&mut self, name: &str, delay: Duration) -> Result<()> {
        self.clear_queue();
        self.queue_key(name, delay)?;
        self.send_queue().await
    }

    /// Drop anything pending and send `names`.
    ///
    /// Keys go out in reverse order: the last name is sent first.
    pub async fn send_keys<I, S>(&mut self, names: I, delay: Duration) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear_queue();
        for name in names {
            self.queue_key(name.as_ref(), delay)?;
        }
        self.send_queue().await
    }

    /// Connect, authenticate and drain the queue onto the connection.
    pub async fn send_queue(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            warn!("No keys to send");
            return Ok(());
        }

        // Only cancellations issued from here on abort this dispatch.
        let mut cancel = self.cancel_receiver.clone();
        drop(cancel.borrow_and_update());

        let result = self.dispatch(&mut cancel).await;
        if result.is_err() {
            self.queue.clear();
            self.state = ClientState::Failed;
        }
        result
    }

    async fn dispatch(&mut self, cancel: &mut watch::Receiver<u64>) -> Result<()> {
        let token = self.tokens.get()?;
        let url = protocol::connection_url(
            self.settings.security,
            &self.settings.host,
            self.settings.port,
            &self.settings.app_name,
            token.as_deref(),
        );

        debug!("Connecting to {}", url);
        self.state = ClientState::Connecting;

        let relax_tls = self.settings.environment.relaxes_tls();
        let connecting = self.connector.connect(&url, relax_tls);
        let connected = bounded(
            "connecting",
            self.settings.connect_timeout,
            cancel,
            connecting,
        )
        .await;
        let mut connection = match connected {
            Ok(connection) => connection,
            Err(e) => {
                error!("Could not connect: {}", e);
                return Err(e);
            }
        };

        self.state = ClientState::AwaitingHandshake;
        let handshake = bounded(
            "waiting for handshake",
            self.settings.handshake_timeout,
            cancel,
            connection.next_text(),
        )
        .await;
        let raw = match handshake {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                let e = RemoteError::connection(&url, "connection closed before handshake");
                error!("Could not connect: {}", e);
                return Err(e);
            }
            Err(e) => {
                if matches!(e, RemoteError::Cancelled) {
                    let _ = connection.close().await;
                }
                return Err(e);
            }
        };

        // Anything but a handshake abandons the socket without a close.
        accept_handshake(raw, &self.tokens)?;

        debug!("Connected");
        self.state = ClientState::Dispatching;

        while let Some(command) = self.queue.take_next() {
            debug!("Sending {}...", command.name());

            let message = protocol::key_press_message(command.name())?;
            if let Err(e) = connection.send_text(message).await {
                error!("Could not send {}: {}", command.name(), e);
                return Err(e);
            }

            let pause = watch_pause(&mut *connection, &url, command.delay(), &self.tokens);
            match bounded("pausing between keys", Duration::ZERO, cancel, pause).await {
                Ok(()) => {}
                Err(RemoteError::Cancelled) => {
                    let _ = connection.close().await;
                    return Err(RemoteError::Cancelled);
                }
                Err(e) => {
                    error!("Dispatch aborted after {}: {}", command.name(), e);
                    return Err(e);
                }
            }
        }

        debug!("Closing websocket");
        self.state = ClientState::Closing;
        if let Err(e) = connection.close().await {
            warn!("Closing websocket failed: {}", e);
        }
        self.state = ClientState::Closed;

        Ok(())
    }
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// Check that `raw` is the channel's handshake event and store any token it
/// carries.
fn accept_handshake(raw: String, tokens: &TokenCache) -> Result<()> {
    match ChannelEvent::parse(&raw) {
        Some(event) if event.is_handshake() => {
            if let Some(token) = event.token() {
                tokens.set(&token)?;
            }
            Ok(())
        }
        _ => {
            error!("Unknown message: {}", raw);
            Err(RemoteError::unexpected_message(raw))
        }
    }
}

/// Sleep for `delay` while reading whatever the TV pushes in the meantime.
///
/// A repeated handshake is accepted (and may refresh the token). Any other
/// event, or the peer closing the socket, ends the dispatch.
async fn watch_pause(
    connection: &mut dyn Connection,
    url: &str,
    delay: Duration,
    tokens: &TokenCache,
) -> Result<()> {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return Ok(()),
            frame = connection.next_text() => match frame? {
                Some(raw) => accept_handshake(raw, tokens)?,
                None => {
                    return Err(RemoteError::connection(url, "connection closed during dispatch"));
                }
            },
        }
    }
}

/// Run `fut`, giving up on timeout (unless `limit` is zero) or cancellation.
async fn bounded<T>(
    stage: &'static str,
    limit: Duration,
    cancel: &mut watch::Receiver<u64>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    let cancelled = async {
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let work = async {
        if limit.is_zero() {
            fut.await
        } else {
            tokio::time::timeout(limit, fut)
                .await
                .unwrap_or_else(|_| Err(RemoteError::timeout(stage, limit)))
        }
    };

    tokio::select! {
        _ = cancelled => {
            debug!("Cancelled while {}", stage);
            Err(RemoteError::Cancelled)
        }
        outcome = work => outcome,
    }
}
