//! Configuration management module.
//!
//! - YAML, TOML and JSON configuration file formats
//! - Validation with descriptive error messages
//! - Environment variable overrides for endpoints and credentials
//!
//! # Example
//!
//! ```rust,ignore
//! use neptune_core::config::{ConfigLoader, NeptuneConfig};
//!
//! let config: NeptuneConfig = ConfigLoader::new()
//!     .with_env_prefix("NEPTUNE")
//!     .load_file("neptune.toml")?;
//! ```

mod loader;
mod neptune_config;
mod traits;
pub mod validation;

pub use loader::{ConfigFormat, ConfigLoader};
pub use neptune_config::{
    ClientConfig, ConnectionConfig, CredentialsConfig, LoggingConfig, NeptuneConfig,
    SerializerKind,
};
pub use traits::{Configurable, Validatable};
pub use validation::{EnvOverride, ValidationContext, ValidationResult, Validator};
