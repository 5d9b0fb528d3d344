//! Real-Time Channel
//!
//! Connection state machine for the push hub. The transport (a browser
//! WebSocket in the app) reports what happened; this module decides the
//! next state and how long to wait before the next reconnect attempt.
//!
//! ```text
//! Disconnected -> Connecting -> Connected
//! Connected -> Reconnecting -> Connected
//! any -> Disconnected (stop / unrecoverable failure)
//! ```

mod handlers;
pub mod protocol;

use std::time::Duration;

use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::SyncError;

pub use handlers::HubHandlers;
pub use protocol::{Handshake, HubEvent, HubFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }
}

/// Capped backoff keyed by consecutive failures.
/// Attempt `n` (1-based) waits `delays[n - 1]`, clamped to the last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    delays: Vec<Duration>,
}

impl Backoff {
    pub fn new(delays: Vec<Duration>) -> Self {
        let delays = if delays.is_empty() {
            ClientConfig::default().reconnect_delays()
        } else {
            delays
        };
        Self { delays }
    }

    pub fn delay(&self, failures: usize) -> Duration {
        let index = failures.saturating_sub(1).min(self.delays.len() - 1);
        self.delays[index]
    }
}

#[derive(Debug, Clone)]
pub struct HubChannel {
    state: ConnectionState,
    failures: usize,
    backoff: Backoff,
    last_error: Option<SyncError>,
    ever_connected: bool,
}

impl HubChannel {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            failures: 0,
            backoff: Backoff::new(config.reconnect_delays()),
            last_error: None,
            ever_connected: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    pub fn consecutive_failures(&self) -> usize {
        self.failures
    }

    /// Start connecting. A no-op (false) unless currently disconnected.
    pub fn request_connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        self.state = ConnectionState::Connecting;
        true
    }

    /// Reconnect timer elapsed. False if the channel was stopped meanwhile.
    pub fn begin_retry(&mut self) -> bool {
        self.state == ConnectionState::Reconnecting
    }

    /// Handshake completed. Returns true when this was a *re*connection,
    /// i.e. pushes may have been missed and the caller should resync.
    pub fn connected(&mut self) -> bool {
        if !matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Reconnecting
        ) {
            return false;
        }
        let resync = self.ever_connected;
        self.state = ConnectionState::Connected;
        self.failures = 0;
        self.last_error = None;
        self.ever_connected = true;
        info!(resync, "hub connected");
        resync
    }

    /// Transient drop or failed attempt. Returns the delay before the next
    /// attempt, or None when nothing should be retried.
    pub fn connection_lost(&mut self, error: SyncError) -> Option<Duration> {
        if self.state == ConnectionState::Disconnected {
            return None;
        }
        self.failures += 1;
        self.state = ConnectionState::Reconnecting;
        let delay = self.backoff.delay(self.failures);
        warn!(failures = self.failures, delay_ms = delay.as_millis() as u64, %error, "hub connection lost");
        self.last_error = Some(error);
        Some(delay)
    }

    /// Unrecoverable failure (refused handshake, non-reconnectable close)
    pub fn fail(&mut self, error: SyncError) {
        warn!(%error, "hub connection failed permanently");
        self.state = ConnectionState::Disconnected;
        self.failures = 0;
        self.last_error = Some(error);
    }

    /// Close record from the hub, before or after the handshake. A
    /// reconnectable close counts as a drop; any other close is terminal.
    pub fn closed(&mut self, error: SyncError, allow_reconnect: bool) -> Option<Duration> {
        if allow_reconnect {
            self.connection_lost(error)
        } else {
            self.fail(error);
            None
        }
    }

    /// Explicit stop or teardown
    pub fn stop(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.failures = 0;
    }
}
