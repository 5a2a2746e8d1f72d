//! Errors returned across the Neptune crates.
//!
//! [`NeptuneError`] wraps one of four domain errors:
//!
//! - [`NetworkError`]: reaching the endpoint and keeping the socket open
//! - [`ConfigError`]: settings files, environment and validation
//! - [`SigningError`]: building the SigV4 handshake headers
//! - [`GremlinError`]: request framing and server status codes
//!
//! ```
//! use neptune_core::error::{GremlinError, NeptuneError};
//!
//! let error: NeptuneError = GremlinError::Timeout { timeout_ms: 30_000 }.into();
//! assert_eq!(error.category(), "gremlin");
//! assert!(error.is_recoverable());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Whether trying again could change the outcome.
///
/// ```
/// use neptune_core::error::ErrorSeverity;
///
/// assert!(ErrorSeverity::Recoverable.is_recoverable());
/// assert_eq!(ErrorSeverity::Fatal.to_string(), "fatal");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Same input, same failure: bad settings, rejected credentials.
    Fatal,
    /// Transient: timeouts, dropped sockets, throttling.
    #[default]
    Recoverable,
}

impl ErrorSeverity {
    /// `true` for [`ErrorSeverity::Recoverable`].
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// `true` for [`ErrorSeverity::Fatal`].
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fatal => "fatal",
            Self::Recoverable => "recoverable",
        })
    }
}

mod config;
mod gremlin;
mod network;
mod signing;

pub use config::ConfigError;
pub use gremlin::GremlinError;
pub use network::NetworkError;
pub use signing::SigningError;

/// Any failure surfaced by the gateway or the CLI.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeptuneError {
    /// Transport failure.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Unusable settings.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Handshake headers could not be signed.
    #[error("{0}")]
    Signing(#[from] SigningError),

    /// Request rejected or answered with an error status.
    #[error("{0}")]
    Gremlin(#[from] GremlinError),
}

impl NeptuneError {
    /// Severity of the wrapped error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network(e) => e.severity(),
            Self::Config(e) => e.severity(),
            Self::Signing(e) => e.severity(),
            Self::Gremlin(e) => e.severity(),
        }
    }

    /// Whether a new attempt might succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Short domain name used as a log field.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::Signing(_) => "signing",
            Self::Gremlin(_) => "gremlin",
        }
    }

    /// The wrapped [`GremlinError`], if any.
    #[must_use]
    pub fn as_gremlin_error(&self) -> Option<&GremlinError> {
        match self {
            Self::Gremlin(e) => Some(e),
            _ => None,
        }
    }

    /// The wrapped [`NetworkError`], if any.
    #[must_use]
    pub fn as_network_error(&self) -> Option<&NetworkError> {
        match self {
            Self::Network(e) => Some(e),
            _ => None,
        }
    }
}

/// `Result` with [`NeptuneError`].
pub type Result<T> = std::result::Result<T, NeptuneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ErrorSeverity::Fatal).unwrap(), "\"fatal\"");
        assert_eq!(ErrorSeverity::default(), ErrorSeverity::Recoverable);
    }

    #[test]
    fn test_dropped_socket_is_recoverable() {
        let closed = NetworkError::ConnectionClosed {
            reason: "Stream ended".to_string(),
        };
        let err: NeptuneError = closed.clone().into();
        assert_eq!(err.category(), "network");
        assert_eq!(err.as_network_error(), Some(&closed));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_gremlin_error_conversion() {
        let gremlin_err = GremlinError::Response {
            status_code: 597,
            message: "No such property".to_string(),
            attributes: serde_json::Map::new(),
        };
        let err: NeptuneError = gremlin_err.clone().into();
        assert_eq!(err.category(), "gremlin");
        assert_eq!(err.as_gremlin_error(), Some(&gremlin_err));
        assert!(err.as_network_error().is_none());
    }

    #[test]
    fn test_signing_error_is_fatal() {
        let err: NeptuneError = SigningError::MissingHost {
            url: "file:///tmp".to_string(),
        }
        .into();
        assert_eq!(err.category(), "signing");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_config_error_conversion() {
        let err: NeptuneError = ConfigError::missing_field("endpoint").into();
        assert_eq!(err.category(), "config");
        assert!(err.to_string().contains("endpoint"));
    }
}
