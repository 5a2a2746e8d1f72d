//! Connection lifecycle and per-connection counters.

#![allow(clippy::redundant_pub_crate)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Lifecycle of a single WebSocket connection.
///
/// `Closed` is terminal for connections closed by the client; a connection
/// lost from the server side ends in `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No handshake has succeeded, or the server went away.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Upgrade accepted; frames can flow.
    Connected,
    /// Closed by the client.
    Closed,
}

impl ConnectionState {
    /// Returns true if frames can be sent.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if the connection is gone for good or never came up.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
        })
    }
}

/// Frame counters for the current connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Frames of any kind read from the server.
    pub frames_received: u64,
    /// Heartbeat pings written.
    pub pings_sent: u64,
    /// Pongs read back.
    pub pongs_received: u64,
}

impl ConnectionStats {
    /// Returns how many heartbeat pings have not been answered.
    #[must_use]
    pub fn unanswered_pings(&self) -> u64 {
        self.pings_sent.saturating_sub(self.pongs_received)
    }
}

/// State shared between the client handle and its background task.
#[derive(Debug)]
pub(crate) struct InternalState {
    pub state: ConnectionState,
    pub connected_at: Option<Instant>,
    pub stats: ConnectionStats,
}

impl InternalState {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            connected_at: None,
            stats: ConnectionStats::default(),
        }
    }

    /// Enters `Connected` and starts fresh counters.
    pub fn mark_connected(&mut self) {
        self.state = ConnectionState::Connected;
        self.connected_at = Some(Instant::now());
        self.stats = ConnectionStats::default();
    }

    pub fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.connected_at = None;
    }

    pub fn mark_closed(&mut self) {
        self.state = ConnectionState::Closed;
        self.connected_at = None;
    }

    pub fn record_message(&mut self) {
        self.stats.frames_received += 1;
    }

    pub fn record_ping(&mut self) {
        self.stats.pings_sent += 1;
    }

    pub fn record_pong(&mut self) {
        self.stats.pongs_received += 1;
    }

    /// Time since the handshake completed, while connected.
    pub fn uptime(&self) -> Option<Duration> {
        self.connected_at.map(|at| at.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_inactive());
    }

    #[test]
    fn test_reconnect_resets_counters() {
        let mut state = InternalState::new();
        assert!(state.uptime().is_none());

        state.mark_connected();
        state.record_message();
        state.record_message();
        assert_eq!(state.stats.frames_received, 2);
        assert!(state.uptime().is_some());

        state.mark_disconnected();
        assert!(state.uptime().is_none());

        state.mark_connected();
        assert_eq!(state.stats, ConnectionStats::default());
    }

    #[test]
    fn test_unanswered_pings() {
        let mut state = InternalState::new();
        state.mark_connected();

        state.record_ping();
        state.record_ping();
        state.record_pong();
        assert_eq!(state.stats.unanswered_pings(), 1);

        state.mark_closed();
        assert_eq!(state.state, ConnectionState::Closed);
    }
}
