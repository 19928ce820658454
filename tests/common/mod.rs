//! Scripted in-memory connector for driving `RemoteClient` without a TV.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tvremote::{Connection, Connector, RemoteError, Result};

/// How the fake TV answers once the socket is open.
#[derive(Debug, Clone)]
pub enum Handshake {
    /// Reply with this frame, then stay quiet.
    Reply(String),
    /// Never say anything.
    Silent,
    /// Close the socket straight away.
    Hangup,
}

impl Handshake {
    pub fn connect() -> Self {
        Self::Reply(r#"{"event":"ms.channel.connect","data":{}}"#.to_string())
    }

    pub fn connect_with_token(token: &str) -> Self {
        Self::Reply(format!(
            r#"{{"event":"ms.channel.connect","data":{{"clients":[],"id":"x","token":"{token}"}}}}"#
        ))
    }
}

/// A frame the fake TV pushes after its handshake reply.
#[derive(Debug, Clone)]
enum Followup {
    Frame(String),
    Hangup,
}

#[derive(Debug, Default)]
pub struct Log {
    /// (url, relax_tls) for every connection attempt.
    pub connects: Vec<(String, bool)>,
    pub sent: Vec<(Instant, String)>,
    pub closed_at: Option<Instant>,
}

impl Log {
    /// `DataOfCmd` of every sent frame, in wire order.
    pub fn sent_keys(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|(_, raw)| {
                let value: serde_json::Value = serde_json::from_str(raw).unwrap();
                value["params"]["DataOfCmd"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct MockConnector {
    log: Arc<Mutex<Log>>,
    handshake: Handshake,
    followups: Vec<(Duration, Followup)>,
    refuse: bool,
    fail_send_after: Option<usize>,
}

impl MockConnector {
    pub fn new(handshake: Handshake) -> Self {
        Self {
            log: Arc::new(Mutex::new(Log::default())),
            handshake,
            followups: Vec::new(),
            refuse: false,
            fail_send_after: None,
        }
    }

    /// Push `frame` once `after` has elapsed since the previous frame.
    pub fn then_frame(mut self, after: Duration, frame: &str) -> Self {
        self.followups.push((after, Followup::Frame(frame.to_string())));
        self
    }

    /// Close the socket once `after` has elapsed since the previous frame.
    pub fn then_hangup(mut self, after: Duration) -> Self {
        self.followups.push((after, Followup::Hangup));
        self
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new(Handshake::Silent)
        }
    }

    pub fn fail_send_after(mut self, sends: usize) -> Self {
        self.fail_send_after = Some(sends);
        self
    }

    pub fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str, relax_tls: bool) -> Result<Box<dyn Connection>> {
        self.log().connects.push((url.to_string(), relax_tls));
        if self.refuse {
            return Err(RemoteError::connection(url, "connection refused"));
        }

        Ok(Box::new(MockConnection {
            url: url.to_string(),
            log: Arc::clone(&self.log),
            handshake: Some(self.handshake.clone()),
            followups: self.followups.iter().cloned().collect(),
            pending_since: None,
            fail_send_after: self.fail_send_after,
        }))
    }
}

struct MockConnection {
    url: String,
    log: Arc<Mutex<Log>>,
    handshake: Option<Handshake>,
    followups: VecDeque<(Duration, Followup)>,
    /// When the wait for the next followup started; survives dropped reads.
    pending_since: Option<Instant>,
    fail_send_after: Option<usize>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn send_text(&mut self, text: String) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if self.fail_send_after.is_some_and(|limit| log.sent.len() >= limit) {
            return Err(RemoteError::connection(&self.url, "broken pipe"));
        }
        log.sent.push((Instant::now(), text));
        Ok(())
    }

    async fn next_text(&mut self) -> Result<Option<String>> {
        match self.handshake.take() {
            Some(Handshake::Reply(frame)) => {
                self.pending_since = Some(Instant::now());
                return Ok(Some(frame));
            }
            Some(Handshake::Hangup) => return Ok(None),
            Some(Handshake::Silent) => return std::future::pending().await,
            None => {}
        }

        let Some((after, _)) = self.followups.front().cloned() else {
            return std::future::pending().await;
        };
        let since = *self.pending_since.get_or_insert_with(Instant::now);
        tokio::time::sleep_until(since + after).await;

        self.pending_since = Some(Instant::now());
        match self.followups.pop_front() {
            Some((_, Followup::Frame(frame))) => Ok(Some(frame)),
            Some((_, Followup::Hangup)) | None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closed_at = Some(Instant::now());
        Ok(())
    }
}
