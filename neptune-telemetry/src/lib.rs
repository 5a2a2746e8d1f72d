//! Log setup for the `neptune` binary.
//!
//! [`logging::init_logging`] installs a `tracing` subscriber writing pretty or
//! JSON lines to stderr and, optionally, a rolling file. Every writer goes
//! through [`masking::SensitiveDataMasker`], so access keys, session tokens
//! and SigV4 signatures never reach a log sink in clear text. Query results
//! are printed on stdout and are not affected.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Subscriber setup
pub mod logging;

/// Credential redaction
pub mod masking;

/// Named spans for connect, sign and query
pub mod spans;

/// Common imports
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat, LogOutput, init_logging};
    pub use crate::masking::{SecretKind, SensitiveDataMasker};
    pub use crate::spans::*;
}
