//! Top-level configuration for the Neptune client.

use super::traits::{Configurable, Validatable};
use super::validation::{EnvOverride, ValidationContext, Validator};
use crate::error::ConfigError;
use crate::types::{Credentials, DEFAULT_GREMLIN_PORT, Endpoint, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure.
///
/// # Example
///
/// ```toml
/// [connection]
/// endpoint = "mycluster.cluster-abc.us-east-1.neptune.amazonaws.com:8182"
/// region = "us-east-1"
///
/// [credentials]
/// access_key_id = "AKIDEXAMPLE"
/// secret_access_key = "..."
///
/// [client]
/// request_timeout_ms = 30000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeptuneConfig {
    /// Where to connect and how to sign.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Signing credentials.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Gremlin client behaviour.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Validatable for NeptuneConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();

        ctx.within("connection", |ctx| self.connection.validate_with_context(ctx));
        ctx.within("credentials", |ctx| self.credentials.validate_with_context(ctx));
        ctx.within("client", |ctx| self.client.validate_with_context(ctx));
        ctx.within("logging", |ctx| self.logging.validate_with_context(ctx));

        ctx.into_result()
    }
}

impl Configurable for NeptuneConfig {
    /// `NEPTUNE_ENDPOINT=db:8182` overrides `connection.endpoint`,
    /// `NEPTUNE_ACCESS_KEY_ID` (or `AWS_ACCESS_KEY_ID`) overrides the access key, and so on.
    fn apply_env_overrides(&mut self, prefix: &str) {
        self.connection.apply_env_overrides(prefix);
        self.credentials.apply_env_overrides(prefix);
        self.client.apply_env_overrides(prefix);
        EnvOverride::apply_string(&format!("{prefix}_LOG_LEVEL"), &mut self.logging.level);
        EnvOverride::apply_string(&format!("{prefix}_LOG_FORMAT"), &mut self.logging.format);
    }

    fn env_var_names(prefix: &str) -> Vec<String> {
        [
            "ENDPOINT",
            "PORT",
            "REGION",
            "SERVICE",
            "USE_TLS",
            "ELB_ENDPOINT",
            "ACCESS_KEY_ID",
            "SECRET_ACCESS_KEY",
            "SESSION_TOKEN",
            "CONNECT_TIMEOUT_MS",
            "REQUEST_TIMEOUT_MS",
            "HEARTBEAT_INTERVAL_MS",
            "LOG_LEVEL",
            "LOG_FORMAT",
        ]
        .iter()
        .map(|name| format!("{prefix}_{name}"))
        .chain(
            ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY", "AWS_SESSION_TOKEN"]
                .map(String::from),
        )
        .collect()
    }
}

impl NeptuneConfig {
    /// Returns the Neptune cluster endpoint (the signed `host`).
    pub fn neptune_endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::parse(&self.connection.endpoint, self.connection.port)
    }

    /// Returns the endpoint the socket actually connects to.
    ///
    /// This is the load balancer when one is configured, otherwise the cluster.
    pub fn connect_endpoint(&self) -> Result<Endpoint, ConfigError> {
        match self.connection.elb_endpoint.as_deref() {
            Some(elb) if !elb.trim().is_empty() => {
                let port = self.neptune_endpoint()?.port();
                Endpoint::parse(elb, port).map_err(|e| match e {
                    ConfigError::InvalidValue { reason, .. } => {
                        ConfigError::invalid_value("connection.elb_endpoint", reason)
                    }
                    other => other,
                })
            }
            _ => self.neptune_endpoint(),
        }
    }

    /// Returns the URL that is signed: `http(s)://<cluster>/gremlin`.
    pub fn signing_url(&self) -> Result<String, ConfigError> {
        let scheme = if self.connection.use_tls { "https" } else { "http" };
        Ok(format!(
            "{scheme}://{}{}",
            self.neptune_endpoint()?.authority(),
            self.connection.path
        ))
    }

    /// Returns the WebSocket URL: `ws(s)://<connect endpoint>/gremlin`.
    pub fn websocket_url(&self) -> Result<String, ConfigError> {
        let scheme = if self.connection.use_tls { "wss" } else { "ws" };
        Ok(format!(
            "{scheme}://{}{}",
            self.connect_endpoint()?.authority(),
            self.connection.path
        ))
    }
}

/// Connection target and signing scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Cluster endpoint as `host[:port]`.
    #[serde(default)]
    pub endpoint: String,

    /// Port used when `endpoint` carries none.
    #[serde(default = "default_port")]
    pub port: u16,

    /// AWS region of the cluster.
    #[serde(default = "default_region")]
    pub region: String,

    /// Signing service name.
    #[serde(default = "default_service")]
    pub service: String,

    /// Gremlin path on the server.
    #[serde(default = "default_path")]
    pub path: String,

    /// Use `wss://` instead of `ws://`.
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,

    /// Load balancer in front of the cluster, as `host[:port]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elb_endpoint: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_GREMLIN_PORT
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_service() -> String {
    "neptune-db".to_string()
}

fn default_path() -> String {
    "/gremlin".to_string()
}

fn default_use_tls() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            port: default_port(),
            region: default_region(),
            service: default_service(),
            path: default_path(),
            use_tls: default_use_tls(),
            elb_endpoint: None,
        }
    }
}

impl ConnectionConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .non_empty("endpoint", &self.endpoint)
            .port("port", self.port)
            .non_empty("region", &self.region)
            .non_empty("service", &self.service)
            .check("path", self.path.starts_with('/'), "Path must start with '/'");

        if !self.endpoint.trim().is_empty()
            && let Err(e) = Endpoint::parse(&self.endpoint, self.port)
        {
            ctx.add_error(ctx.invalid_value("endpoint", e.to_string()));
        }

        if let Some(elb) = &self.elb_endpoint
            && !elb.trim().is_empty()
            && let Err(e) = Endpoint::parse(elb, self.port)
        {
            ctx.add_error(ctx.invalid_value("elb_endpoint", e.to_string()));
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_ENDPOINT"), &mut self.endpoint);
        EnvOverride::apply_number(&format!("{prefix}_PORT"), &mut self.port);
        EnvOverride::apply_string(&format!("{prefix}_REGION"), &mut self.region);
        EnvOverride::apply_string(&format!("{prefix}_SERVICE"), &mut self.service);
        EnvOverride::apply_bool(&format!("{prefix}_USE_TLS"), &mut self.use_tls);
        EnvOverride::apply_optional_string(
            &format!("{prefix}_ELB_ENDPOINT"),
            &mut self.elb_endpoint,
        );
    }
}

/// Signing credentials.
///
/// Secrets are read from files or the environment but never written back out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Access key id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// Secret access key.
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<SecretString>,

    /// Session token for temporary credentials.
    #[serde(default, skip_serializing)]
    pub session_token: Option<SecretString>,
}

impl CredentialsConfig {
    /// Builds signing credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` when either key is absent.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let access_key_id = self
            .access_key_id
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::missing_field_in_section("access_key_id", "credentials"))?;
        let secret = self
            .secret_access_key
            .as_ref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ConfigError::missing_field_in_section("secret_access_key", "credentials")
            })?;

        let mut credentials = Credentials::new(access_key_id, secret.clone());
        if let Some(token) = self.session_token.as_ref().filter(|t| !t.is_empty()) {
            credentials = credentials.with_session_token(token.clone());
        }
        Ok(credentials)
    }

    /// Returns whether both keys are configured.
    #[must_use]
    pub fn has_auth(&self) -> bool {
        self.credentials().is_ok()
    }

    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        // A half-configured pair is always a mistake; a missing pair is reported at connect time.
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            let field = if self.access_key_id.is_some() {
                "secret_access_key"
            } else {
                "access_key_id"
            };
            ctx.add_error(ctx.missing_field(field));
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        if let Some(key) = EnvOverride::first_set(&[
            &format!("{prefix}_ACCESS_KEY_ID"),
            "AWS_ACCESS_KEY_ID",
        ]) {
            self.access_key_id = Some(key);
        }
        if let Some(secret) = EnvOverride::first_set(&[
            &format!("{prefix}_SECRET_ACCESS_KEY"),
            "AWS_SECRET_ACCESS_KEY",
        ]) {
            self.secret_access_key = Some(SecretString::new(secret));
        }
        if let Some(token) = EnvOverride::first_set(&[
            &format!("{prefix}_SESSION_TOKEN"),
            "AWS_SESSION_TOKEN",
        ]) {
            self.session_token = Some(SecretString::new(token));
        }
    }
}

/// Response serializer negotiated with the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializerKind {
    /// GraphSON 3.0, typed JSON.
    #[default]
    GraphsonV3,
    /// GraphSON 1.0, untyped JSON.
    GraphsonV1,
}

/// Gremlin client behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Time allowed for a query to complete, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Ping interval in milliseconds.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Serializer used for requests and responses.
    #[serde(default)]
    pub serializer: SerializerKind,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            serializer: SerializerKind::default(),
        }
    }
}

impl ClientConfig {
    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the heartbeat interval as a Duration.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .positive_ms("connect_timeout_ms", self.connect_timeout_ms)
            .positive_ms("request_timeout_ms", self.request_timeout_ms)
            .positive_ms("heartbeat_interval_ms", self.heartbeat_interval_ms);
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_number(
            &format!("{prefix}_CONNECT_TIMEOUT_MS"),
            &mut self.connect_timeout_ms,
        );
        EnvOverride::apply_number(
            &format!("{prefix}_REQUEST_TIMEOUT_MS"),
            &mut self.request_timeout_ms,
        );
        EnvOverride::apply_number(
            &format!("{prefix}_HEARTBEAT_INTERVAL_MS"),
            &mut self.heartbeat_interval_ms,
        );
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for log files; stderr only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .one_of("level", &self.level, &["trace", "debug", "info", "warn", "error"])
            .one_of("format", &self.format, &["json", "pretty"]);
    }
}
