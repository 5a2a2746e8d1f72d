//! Hooks the loader calls on every settings type.

use crate::error::ConfigError;

/// A settings tree that can check itself after loading.
///
/// ```rust
/// use neptune_core::config::Validatable;
/// use neptune_core::error::ConfigError;
///
/// struct Listener {
///     port: u16,
/// }
///
/// impl Validatable for Listener {
///     fn validate(&self) -> Result<(), ConfigError> {
///         match self.port {
///             0 => Err(ConfigError::invalid_value("port", "Port cannot be 0")),
///             _ => Ok(()),
///         }
///     }
/// }
///
/// assert!(Listener { port: 0 }.validate().is_err());
/// assert!(Listener { port: 8182 }.validate().is_ok());
/// ```
pub trait Validatable {
    /// Reports the first problem found.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// A settings tree that reads `<PREFIX>_*` environment variables.
pub trait Configurable: Sized {
    /// Overwrites fields from whichever variables are set.
    fn apply_env_overrides(&mut self, prefix: &str);

    /// Every variable [`Configurable::apply_env_overrides`] consults.
    fn env_var_names(prefix: &str) -> Vec<String>;
}
