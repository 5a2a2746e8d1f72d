//! Gremlin protocol error types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while talking the Gremlin Server protocol.
///
/// `Response` is the server-side failure of a submitted query. It carries the
/// Gremlin status code and the status attributes so callers can report them.
///
/// # Examples
///
/// ```
/// use neptune_core::error::GremlinError;
///
/// let error = GremlinError::Response {
///     status_code: 597,
///     message: "Script evaluation error".to_string(),
///     attributes: serde_json::Map::new(),
/// };
/// assert_eq!(error.status_code(), Some(597));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GremlinError {
    /// The server answered the request with an error status.
    #[error("[Gremlin] Server returned status {status_code}: {message}")]
    Response {
        /// Gremlin status code (e.g. 499, 597).
        status_code: u16,
        /// Status message from the server.
        message: String,
        /// Status attributes from the server.
        attributes: Map<String, Value>,
    },

    /// A request could not be serialized.
    #[error("[Gremlin] Serialization failed: {reason}")]
    Serialization {
        /// Serializer message.
        reason: String,
    },

    /// A response frame could not be understood.
    #[error("[Gremlin] Malformed response: {reason}")]
    MalformedResponse {
        /// Why the frame was rejected.
        reason: String,
    },

    /// No terminal response arrived within the request timeout.
    #[error("[Gremlin] Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The client is not connected.
    #[error("[Gremlin] Not connected: {reason}")]
    NotConnected {
        /// Why the client has no usable connection.
        reason: String,
    },
}

impl GremlinError {
    /// Returns the Gremlin status code for server responses.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the status attributes for server responses.
    #[must_use]
    pub fn status_attributes(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Response { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            // 500 server error, 598 server timeout
            Self::Response {
                status_code: 500 | 598,
                ..
            }
            | Self::Timeout { .. }
            | Self::NotConnected { .. } => ErrorSeverity::Recoverable,
            Self::Response { .. } | Self::Serialization { .. } | Self::MalformedResponse { .. } => {
                ErrorSeverity::Fatal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_accessors() {
        let mut attributes = Map::new();
        attributes.insert("exceptions".to_string(), Value::from(vec!["Boom"]));
        let error = GremlinError::Response {
            status_code: 499,
            message: "Invalid request".to_string(),
            attributes: attributes.clone(),
        };

        assert_eq!(error.status_code(), Some(499));
        assert_eq!(error.status_attributes(), Some(&attributes));
        assert!(error.severity().is_fatal());
        assert!(error.to_string().contains("499"));
    }

    #[test]
    fn test_server_timeout_is_recoverable() {
        let error = GremlinError::Response {
            status_code: 598,
            message: "Timeout".to_string(),
            attributes: Map::new(),
        };
        assert!(error.severity().is_recoverable());
    }

    #[test]
    fn test_non_response_errors_have_no_status() {
        let error = GremlinError::Timeout { timeout_ms: 100 };
        assert_eq!(error.status_code(), None);
        assert!(error.status_attributes().is_none());
    }
}
