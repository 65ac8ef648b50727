//! Live synchronization with the switcher backend.
//!
//! [`ReconnectMachine`] decides when to connect and when to wait; it holds
//! no I/O so the retry cadence can be driven step by step. The async driver
//! around it lives in [`crate::ws`].
//!
//! [`apply_server_message`] is the single place where pushed state reaches
//! the selection map and the telemetry read-outs.

use std::time::Duration;

use fazantix_types::{ServerMessage, SwitcherEvent};

use crate::selection::{SelectionError, SelectionMap};
use crate::state::ConnectionState;
use crate::telemetry::TelemetryReadouts;

/// Delay between a lost connection and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Errors of the live connection and of applying pushed state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("connection closed by server")]
    Closed,
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// What the driver has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    /// Open a fresh connection
    Connect { attempt: u64 },
    /// Wait, then report [`ReconnectMachine::on_timer_elapsed`]
    ScheduleReconnect(Duration),
    /// Nothing to do
    Idle,
}

/// Connection lifecycle: `Connecting -> Open -> Closed -> Connecting -> ...`
///
/// There is no terminal failure state and no backoff growth. At most one
/// reconnect timer is pending at any time.
#[derive(Debug, Clone)]
pub struct ReconnectMachine {
    delay: Duration,
    state: ConnectionState,
    attempts: u64,
    timer_pending: bool,
    stopped: bool,
}

impl ReconnectMachine {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: ConnectionState::Connecting { attempt: 0 },
            attempts: 0,
            timer_pending: false,
            stopped: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Connection attempts issued so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn pending_timers(&self) -> usize {
        usize::from(self.timer_pending)
    }

    pub fn start(&mut self) -> SyncCommand {
        self.stopped = false;
        self.timer_pending = false;
        self.connect()
    }

    pub fn on_open(&mut self) -> SyncCommand {
        if !self.stopped {
            self.state = ConnectionState::Open;
        }
        SyncCommand::Idle
    }

    /// The connection closed or could not be opened.
    pub fn on_closed(&mut self) -> SyncCommand {
        if self.stopped || self.timer_pending {
            return SyncCommand::Idle;
        }
        self.timer_pending = true;
        self.state = ConnectionState::Closed {
            retry_in: self.delay,
        };
        SyncCommand::ScheduleReconnect(self.delay)
    }

    pub fn on_timer_elapsed(&mut self) -> SyncCommand {
        if self.stopped || !self.timer_pending {
            return SyncCommand::Idle;
        }
        self.timer_pending = false;
        self.connect()
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        self.timer_pending = false;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn connect(&mut self) -> SyncCommand {
        self.attempts += 1;
        self.state = ConnectionState::Connecting {
            attempt: self.attempts,
        };
        SyncCommand::Connect {
            attempt: self.attempts,
        }
    }
}

impl Default for ReconnectMachine {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY)
    }
}

/// Mirror a pushed message into local state.
///
/// A `set-scene` clears every marker of the stage before activating the
/// named button; if that button does not exist the stage stays cleared and
/// the inconsistency is returned.
pub fn apply_server_message(
    message: &ServerMessage,
    selection: &mut SelectionMap,
    telemetry: &mut TelemetryReadouts,
) -> Result<(), SyncError> {
    match message {
        ServerMessage::Telemetry(stats) => {
            telemetry.apply(stats);
            Ok(())
        }
        ServerMessage::Event(SwitcherEvent::SetScene { stage, scene }) => {
            tracing::debug!(
                "Scene switched on {:?} stage {} to scene {}",
                selection.bus(stage),
                stage,
                scene
            );
            selection.apply_set_scene(stage, scene)?;
            Ok(())
        }
        ServerMessage::UnknownEvent(name) => {
            tracing::debug!("Ignoring unknown event '{}'", name);
            Ok(())
        }
        ServerMessage::Unrecognized => {
            tracing::warn!("Ignoring message with no recognized shape");
            Ok(())
        }
    }
}
