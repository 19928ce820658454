//! Key commands and the queue they wait in before dispatch.

use std::time::Duration;

/// Default pause after a key press before the next one is sent.
pub const DEFAULT_KEY_DELAY: Duration = Duration::from_secs(1);

/// A single key press waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCommand {
    name: String,
    delay: Duration,
}

impl KeyCommand {
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum wait after this command is sent before the next one goes out.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Ordered buffer of pending key presses.
///
/// Commands are taken from the back: the most recently pushed command is
/// dispatched first. Existing TV automations depend on that order, so it is
/// kept as-is.
#[derive(Debug, Default, Clone)]
pub struct CommandQueue {
    entries: Vec<KeyCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: KeyCommand) {
        self.entries.push(command);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove and return the most recently pushed command.
    pub fn take_next(&mut self) -> Option<KeyCommand> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
