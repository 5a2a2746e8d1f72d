//! Gremlin endpoint addresses.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Default Gremlin Server / Neptune port.
pub const DEFAULT_GREMLIN_PORT: u16 = 8182;

/// A `host:port` pair such as `mycluster.cluster-abc.us-east-1.neptune.amazonaws.com:8182`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from its parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses `host[:port]`, falling back to `default_port` when no port is given.
    ///
    /// Bracketed IPv6 literals (`[::1]:8182`) are accepted.
    ///
    /// # Example
    ///
    /// ```
    /// use neptune_core::types::Endpoint;
    ///
    /// let ep = Endpoint::parse("db.example.com", 8182).unwrap();
    /// assert_eq!(ep.authority(), "db.example.com:8182");
    /// ```
    pub fn parse(input: &str, default_port: u16) -> Result<Self, ConfigError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ConfigError::missing_field("endpoint"));
        }
        if input.contains("://") || input.contains('/') {
            return Err(ConfigError::invalid_value(
                "endpoint",
                format!("'{input}' must be a bare host[:port] without scheme or path"),
            ));
        }

        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, after) = rest.split_once(']').ok_or_else(|| {
                ConfigError::invalid_value("endpoint", format!("unterminated IPv6 literal in '{input}'"))
            })?;
            let port = match after.strip_prefix(':') {
                Some(port) => Some(port),
                None if after.is_empty() => None,
                None => {
                    return Err(ConfigError::invalid_value(
                        "endpoint",
                        format!("unexpected characters after IPv6 literal in '{input}'"),
                    ));
                }
            };
            (format!("[{host}]"), port)
        } else {
            match input.split_once(':') {
                Some((host, port)) => (host.to_string(), Some(port)),
                None => (input.to_string(), None),
            }
        };

        if host.is_empty() || host == "[]" {
            return Err(ConfigError::invalid_value(
                "endpoint",
                format!("'{input}' has an empty host"),
            ));
        }

        let port = match port {
            Some(port) => port.parse::<u16>().ok().filter(|p| *p != 0).ok_or_else(|| {
                ConfigError::invalid_value("endpoint", format!("invalid port '{port}'"))
            })?,
            None => default_port,
        };

        Ok(Self { host, port })
    }

    /// Returns the host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns `host:port`, the value carried in the `host` header.
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, DEFAULT_GREMLIN_PORT)
    }
}
