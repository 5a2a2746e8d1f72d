//! Transport failures on the way to the Gremlin endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to open, keep or use the WebSocket to Neptune.
///
/// A rejected upgrade keeps the HTTP status so an IAM failure (403) can be
/// told apart from an overloaded or unreachable cluster.
///
/// ```
/// use neptune_core::error::NetworkError;
///
/// let error = NetworkError::HandshakeRejected {
///     status_code: 403,
///     reason: "Forbidden".to_string(),
/// };
/// assert!(error.is_auth_rejection());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// TCP connect or DNS resolution failed.
    #[error("[Network] Cannot reach endpoint: {reason}")]
    ConnectionFailed {
        /// Underlying I/O error text.
        reason: String,
    },

    /// The handshake did not finish within the connect timeout.
    #[error("[Network] Handshake timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured connect timeout.
        timeout_ms: u64,
    },

    /// Certificate or TLS negotiation failure on a `wss://` endpoint.
    #[error("[Network] TLS failure: {reason}")]
    Tls {
        /// TLS library error text.
        reason: String,
    },

    /// The server answered the upgrade with something other than 101.
    #[error("[Network] Upgrade refused with HTTP {status_code}: {reason}")]
    HandshakeRejected {
        /// HTTP status of the refusal.
        status_code: u16,
        /// Body or reason phrase.
        reason: String,
    },

    /// Protocol violation or write failure on an open socket.
    #[error("[Network] WebSocket failure: {reason}")]
    WebSocket {
        /// Transport error text.
        reason: String,
    },

    /// The socket is gone, or was never opened.
    #[error("[Network] Connection closed: {reason}")]
    ConnectionClosed {
        /// Close frame reason or local state.
        reason: String,
    },
}

impl NetworkError {
    /// Returns true if Neptune refused the signed handshake as unauthorized.
    #[must_use]
    pub const fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            Self::HandshakeRejected {
                status_code: 401 | 403,
                ..
            }
        )
    }

    /// Returns true if opening a new connection might succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Client errors on the upgrade and TLS failures are fatal.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::Tls { .. } => ErrorSeverity::Fatal,
            Self::HandshakeRejected { status_code, .. } if (400..500).contains(status_code) => {
                ErrorSeverity::Fatal
            }
            _ => ErrorSeverity::Recoverable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status_code: u16) -> NetworkError {
        NetworkError::HandshakeRejected {
            status_code,
            reason: String::new(),
        }
    }

    #[test]
    fn test_forbidden_upgrade_is_fatal() {
        let error = rejected(403);
        assert!(error.is_auth_rejection());
        assert!(!error.is_recoverable());
        assert!(error.to_string().contains("HTTP 403"));
    }

    #[test]
    fn test_server_side_refusal_is_recoverable() {
        let error = rejected(503);
        assert!(!error.is_auth_rejection());
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_transport_failures() {
        let unreachable = NetworkError::ConnectionFailed {
            reason: "Connection refused (os error 111)".to_string(),
        };
        assert!(unreachable.is_recoverable());
        assert!(unreachable.to_string().starts_with("[Network] Cannot reach endpoint"));

        let tls = NetworkError::Tls {
            reason: "invalid peer certificate".to_string(),
        };
        assert!(tls.severity().is_fatal());

        let timeout = NetworkError::Timeout { timeout_ms: 10_000 };
        assert_eq!(timeout.to_string(), "[Network] Handshake timed out after 10000ms");
    }
}
