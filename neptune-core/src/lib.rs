//! Types shared by the Neptune gateway and CLI.
//!
//! [`types`] holds the cluster [`Endpoint`](types::Endpoint) and the AWS
//! credential pair, [`config`] loads `neptune.toml` (or YAML/JSON) with
//! `NEPTUNE_*` and `AWS_*` environment overrides, and [`error`] defines the
//! error tree every crate returns.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]

/// Endpoint and credentials
pub mod types;

/// Error tree
pub mod error;

/// Settings loading and validation
pub mod config;

/// Common imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{NeptuneError, Result};
    pub use crate::types::*;
}
