//! Transport settings for one WebSocket connection.

use std::fmt;
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Where to connect, how long to wait, and what to put on the upgrade request.
///
/// `Debug` prints header names only; the values are usually a SigV4
/// signature and a session token.
#[derive(Clone)]
pub struct WebSocketConfig {
    /// `ws://` or `wss://` URL.
    pub url: String,
    /// Upper bound on TCP connect plus upgrade.
    pub connect_timeout: Duration,
    /// Period of client pings while connected.
    pub heartbeat_interval: Duration,
    /// Whether pings are sent at all.
    pub auto_ping: bool,
    /// Name used in log lines.
    pub label: String,
    /// Extra upgrade headers, sent in this order.
    pub headers: Vec<(String, String)>,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            auto_ping: true,
            label: String::new(),
            headers: Vec::new(),
        }
    }
}

impl fmt::Debug for WebSocketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("WebSocketConfig")
            .field("url", &self.url)
            .field("connect_timeout", &self.connect_timeout)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("auto_ping", &self.auto_ping)
            .field("label", &self.label)
            .field("headers", &header_names)
            .finish()
    }
}

impl WebSocketConfig {
    /// Starts from the defaults: 10s connect timeout, 30s heartbeat.
    #[must_use]
    pub fn builder() -> WebSocketConfigBuilder {
        WebSocketConfigBuilder::default()
    }

    /// Upper bound on TCP connect plus upgrade.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Period of client pings.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }
}

/// Fluent construction of a [`WebSocketConfig`].
#[derive(Debug, Default)]
pub struct WebSocketConfigBuilder {
    config: WebSocketConfig,
}

impl WebSocketConfigBuilder {
    /// Target URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Connect plus upgrade timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Ping period.
    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    /// Turns client pings on or off.
    #[must_use]
    pub const fn auto_ping(mut self, enabled: bool) -> Self {
        self.config.auto_ping = enabled;
        self
    }

    /// Log label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    /// Appends one upgrade header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    /// Appends upgrade headers in iteration order.
    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.config
            .headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> WebSocketConfig {
        self.config
    }
}
