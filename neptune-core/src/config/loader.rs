//! Configuration loader supporting YAML, TOML and JSON.

use super::traits::{Configurable, Validatable};
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Settings file syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// `.toml`
    #[default]
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Maps a file extension (any case) to a format.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }

    fn deserialize<T: DeserializeOwned>(self, content: &str, origin: &str) -> Result<T, ConfigError> {
        let parsed = match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| ConfigError::InvalidFormat {
            path: origin.to_string(),
            reason: format!("{} parse error: {reason}", self.name()),
        })
    }
}

/// Reads settings from a file, a string or defaults.
///
/// Every source goes through the same tail: `<PREFIX>_*` environment
/// overrides when a prefix is set, then [`Validatable::validate`] unless it
/// was turned off.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: Option<String>,
    validate: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// No environment prefix, validation on.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            env_prefix: None,
            validate: true,
        }
    }

    /// Reads overrides from variables starting with `<prefix>_`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Turns the final validation step on or off.
    #[must_use]
    pub const fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Configured environment prefix.
    #[must_use]
    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Loads `path`, picking the parser from its extension.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidFormat`] for an unknown extension or bad syntax,
    /// [`ConfigError::FileReadError`] when the file cannot be read, or the
    /// validation error.
    pub fn load_file<T, P>(&self, path: P) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Configurable + Validatable,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let Some(format) = ConfigFormat::from_path(path) else {
            return Err(ConfigError::InvalidFormat {
                path: origin,
                reason: "Expected a .toml, .yaml, .yml or .json file".to_string(),
            });
        };

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: origin.clone(),
            reason: e.to_string(),
        })?;

        self.finish(format.deserialize(&content, &origin)?)
    }

    /// Loads settings from an in-memory document.
    ///
    /// # Errors
    ///
    /// Parse or validation failure.
    pub fn load_str<T>(&self, content: &str, format: ConfigFormat) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Configurable + Validatable,
    {
        self.finish(Self::parse_str(content, format)?)
    }

    /// Starts from `T::default()`; only the environment contributes.
    ///
    /// # Errors
    ///
    /// Validation failure.
    pub fn load_defaults<T>(&self) -> Result<T, ConfigError>
    where
        T: Default + Configurable + Validatable,
    {
        self.finish(T::default())
    }

    /// Deserializes only; no overrides, no validation.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidFormat`] on a syntax or shape mismatch.
    pub fn parse_str<T>(content: &str, format: ConfigFormat) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        format.deserialize(content, "<string>")
    }

    fn finish<T>(&self, mut config: T) -> Result<T, ConfigError>
    where
        T: Configurable + Validatable,
    {
        if let Some(prefix) = &self.env_prefix {
            config.apply_env_overrides(prefix);
        }
        if self.validate {
            config.validate()?;
        }
        Ok(config)
    }
}
