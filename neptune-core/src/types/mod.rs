//! Credential and endpoint types.

mod credentials;
mod endpoint;

pub use credentials::{Credentials, SecretString};
pub use endpoint::{DEFAULT_GREMLIN_PORT, Endpoint};
