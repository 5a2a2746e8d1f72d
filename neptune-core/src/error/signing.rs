//! Request signing error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or signing a request descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningError {
    /// The request URL could not be parsed.
    #[error("[Signing] Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The request URL has no host to sign.
    #[error("[Signing] URL '{url}' has no host")]
    MissingHost {
        /// The offending URL.
        url: String,
    },

    /// A header name or value cannot be carried on an HTTP request.
    #[error("[Signing] Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why the header was rejected.
        reason: String,
    },

    /// The HMAC could not be keyed.
    #[error("[Signing] Invalid signing key: {reason}")]
    InvalidKey {
        /// Reason reported by the MAC implementation.
        reason: String,
    },
}

impl SigningError {
    /// Returns the severity level of this error.
    ///
    /// Signing failures are deterministic, so retrying never helps.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        super::ErrorSeverity::Fatal
    }
}
