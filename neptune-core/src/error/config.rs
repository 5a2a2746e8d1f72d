//! Errors raised while loading or checking connection settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bad or absent settings.
///
/// ```
/// use neptune_core::error::ConfigError;
///
/// let error = ConfigError::missing_field_in_section("access_key_id", "credentials");
/// assert_eq!(
///     error.to_string(),
///     "[Config] Missing field 'access_key_id' in section 'credentials'"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// A value needed to sign or connect was never provided.
    #[error("[Config] Missing field '{field}'{}", section.as_ref().map(|s| format!(" in section '{s}'")).unwrap_or_default())]
    MissingField {
        /// Field name.
        field: String,
        /// Table the field belongs to, if any.
        section: Option<String>,
    },

    /// A value was provided but cannot be used.
    #[error("[Config] Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the field, e.g. `connection.port`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The settings file could not be opened.
    #[error("[Config] Failed to read file '{path}': {reason}")]
    FileReadError {
        /// File that was requested.
        path: String,
        /// I/O error text.
        reason: String,
    },

    /// The settings file or environment did not deserialize.
    #[error("[Config] Invalid format in '{path}': {reason}")]
    InvalidFormat {
        /// File name, or `environment` for env overrides.
        path: String,
        /// Parser error text.
        reason: String,
    },
}

impl ConfigError {
    /// Returns true unless the error is fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Every configuration error stops the program before it connects.
    #[must_use]
    pub const fn severity(&self) -> super::ErrorSeverity {
        super::ErrorSeverity::Fatal
    }

    /// Builds a [`ConfigError::MissingField`] with no section.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            section: None,
        }
    }

    /// Builds a [`ConfigError::MissingField`] inside `section`.
    #[must_use]
    pub fn missing_field_in_section(field: impl Into<String>, section: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            section: Some(section.into()),
        }
    }

    /// Builds a [`ConfigError::InvalidValue`].
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
