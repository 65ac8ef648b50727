//! Application state and channel-based IPC for async operations.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

use fazantix_types::{ConfigResponse, ServerMessage};

/// Messages sent from async operations to the main UI thread.
#[derive(Debug)]
pub enum AppMessage {
    /// Config loaded from API
    ConfigLoaded(ConfigResponse),
    /// Config loading failed
    ConfigError(String),

    /// Decoded message pushed over the live connection
    Server(ServerMessage),

    /// Live connection state changed
    ConnectionStateChanged(ConnectionState),
}

/// Live connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Opening a fresh connection
    Connecting { attempt: u64 },
    /// Connected to backend
    Open,
    /// Connection lost, reconnect scheduled
    Closed { retry_in: Duration },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConnectionState::Connecting { .. } => "Connecting",
            ConnectionState::Open => "Connected",
            ConnectionState::Closed { .. } => "Disconnected",
        }
    }
}

/// Connectivity indicator driven by the logo color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// No connection has opened yet
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl Connectivity {
    /// Next indicator value after a connection state change. Connecting
    /// keeps whatever the indicator showed before.
    pub fn after(self, state: ConnectionState) -> Self {
        match state {
            ConnectionState::Open => Connectivity::Healthy,
            ConnectionState::Closed { .. } => Connectivity::Unhealthy,
            ConnectionState::Connecting { .. } => self,
        }
    }
}

/// Application state with channel-based communication.
pub struct AppStateChannels {
    /// Sender for app messages (cloned for each async operation)
    pub tx: Sender<AppMessage>,
    /// Receiver for app messages (owned by main UI thread)
    pub rx: Receiver<AppMessage>,
}

impl AppStateChannels {
    /// Create new application state channels.
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender for use in async operations.
    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }
}

impl Default for AppStateChannels {
    fn default() -> Self {
        Self::new()
    }
}
