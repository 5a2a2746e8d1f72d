//! Signed Gremlin sessions against Amazon Neptune.
//!
//! Neptune with IAM authentication expects the WebSocket upgrade to carry the
//! headers of a SigV4-signed `GET /gremlin`. The request is signed for the
//! cluster endpoint, and its `host`, `x-amz-date` and `Authorization` values
//! are replayed on the handshake. When a load balancer fronts the cluster the
//! socket goes to the load balancer but `host` stays the cluster endpoint, so
//! the signature still matches what Neptune sees.

use chrono::{DateTime, Utc};
use neptune_core::config::NeptuneConfig;
use neptune_core::error::NeptuneError;
use neptune_core::types::Endpoint;
use serde_json::{Map, Value};
use tracing::info;

use crate::gremlin::{GremlinClient, GremlinConfig, ResultSet, Serializer};
use crate::sigv4::{HttpRequest, RequestSigner, SignedHeaders};
use crate::ws::WebSocketConfig;

const CONNECTION_LABEL: &str = "neptune";

/// Signs the Gremlin handshake request for `config` at the current time.
///
/// # Errors
///
/// Returns `NeptuneError::Config` when the endpoint or credentials are
/// missing, and `NeptuneError::Signing` when signing fails.
pub fn signed_headers(config: &NeptuneConfig) -> Result<SignedHeaders, NeptuneError> {
    signed_headers_at(config, Utc::now())
}

/// Signs the Gremlin handshake request for `config` at `time`.
///
/// # Errors
///
/// See [`signed_headers`].
pub fn signed_headers_at(
    config: &NeptuneConfig,
    time: DateTime<Utc>,
) -> Result<SignedHeaders, NeptuneError> {
    let credentials = config.credentials.credentials()?;
    let request = HttpRequest::get(&config.signing_url()?)?;

    let headers = RequestSigner::new(credentials).sign_at(
        &request,
        &config.connection.service,
        &config.connection.region,
        time,
    )?;
    Ok(headers)
}

/// Builds the Gremlin client settings that replay `headers` on the handshake.
///
/// # Errors
///
/// Returns `NeptuneError::Config` when an endpoint is invalid.
pub fn gremlin_config(
    config: &NeptuneConfig,
    headers: &SignedHeaders,
) -> Result<GremlinConfig, NeptuneError> {
    let websocket = WebSocketConfig::builder()
        .url(config.websocket_url()?)
        .label(CONNECTION_LABEL)
        .connect_timeout(config.client.connect_timeout())
        .heartbeat_interval(config.client.heartbeat_interval())
        .headers(headers.pairs())
        .build();

    Ok(GremlinConfig::new(websocket)
        .with_serializer(Serializer::from(config.client.serializer))
        .with_request_timeout(config.client.request_timeout()))
}

/// An authenticated Gremlin connection to a Neptune cluster.
pub struct NeptuneSession {
    client: GremlinClient,
    endpoint: Endpoint,
    connect_endpoint: Endpoint,
}

impl NeptuneSession {
    /// Signs the handshake and connects.
    ///
    /// # Errors
    ///
    /// Returns `NeptuneError::Config` or `NeptuneError::Signing` if the
    /// handshake cannot be prepared and `NeptuneError::Network` if the
    /// connection is refused.
    pub async fn connect(config: &NeptuneConfig) -> Result<Self, NeptuneError> {
        let headers = signed_headers(config)?;
        Self::connect_with_headers(config, &headers).await
    }

    /// Connects replaying already signed headers.
    ///
    /// # Errors
    ///
    /// See [`NeptuneSession::connect`].
    pub async fn connect_with_headers(
        config: &NeptuneConfig,
        headers: &SignedHeaders,
    ) -> Result<Self, NeptuneError> {
        let endpoint = config.neptune_endpoint()?;
        let connect_endpoint = config.connect_endpoint()?;
        let gremlin = gremlin_config(config, headers)?;

        info!(
            endpoint = %endpoint,
            connect_to = %connect_endpoint,
            region = %config.connection.region,
            serializer = gremlin.serializer.mime_type(),
            "Connecting to Neptune"
        );

        let client = GremlinClient::connect(gremlin).await?;

        Ok(Self {
            client,
            endpoint,
            connect_endpoint,
        })
    }

    /// Returns the cluster endpoint the handshake was signed for.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the endpoint the socket is connected to.
    #[must_use]
    pub fn connect_endpoint(&self) -> &Endpoint {
        &self.connect_endpoint
    }

    /// Returns the underlying Gremlin client.
    #[must_use]
    pub fn client(&self) -> &GremlinClient {
        &self.client
    }

    /// Evaluates `gremlin` and waits for all of its results.
    ///
    /// # Errors
    ///
    /// Returns `NeptuneError::Gremlin`; a server-side failure is
    /// `GremlinError::Response` carrying the status code and attributes.
    pub async fn submit(&self, gremlin: &str) -> Result<ResultSet, NeptuneError> {
        Ok(self.client.submit(gremlin).await?)
    }

    /// Evaluates `gremlin` with parameter bindings.
    ///
    /// # Errors
    ///
    /// See [`NeptuneSession::submit`].
    pub async fn submit_with_bindings(
        &self,
        gremlin: &str,
        bindings: Map<String, Value>,
    ) -> Result<ResultSet, NeptuneError> {
        Ok(self.client.submit_with_bindings(gremlin, bindings).await?)
    }

    /// Closes the connection.
    pub async fn close(&mut self) {
        self.client.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gremlin::testing::{GremlinTestServer, response};
    use chrono::TimeZone;
    use neptune_core::error::{ConfigError, GremlinError};
    use neptune_core::types::SecretString;
    use serde_json::json;

    fn config(endpoint: &str) -> NeptuneConfig {
        let mut config = NeptuneConfig::default();
        config.connection.endpoint = endpoint.to_string();
        config.connection.region = "us-west-2".to_string();
        config.connection.use_tls = false;
        config.credentials.access_key_id = Some("AKIDEXAMPLE".to_string());
        config.credentials.secret_access_key = Some(SecretString::new(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        ));
        config
    }

    #[test]
    fn test_signed_headers_for_cluster() {
        let time = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let headers = signed_headers_at(&config("localhost:8182"), time).unwrap();

        assert_eq!(headers.host, "localhost:8182");
        assert_eq!(headers.amz_date, "20200101T000000Z");
        assert_eq!(
            headers.signature(),
            Some("6c7d8c08e317307ff8fe1833a4f3ab99f5009c0e7b1b9d1843b9fa14f5a747d6")
        );
    }

    #[test]
    fn test_signed_headers_require_credentials() {
        let mut config = config("localhost:8182");
        config.credentials.secret_access_key = None;

        let err = signed_headers(&config).unwrap_err();
        assert!(matches!(
            err,
            NeptuneError::Config(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_gremlin_config_carries_headers() {
        let config = config("localhost:8182");
        let headers = signed_headers(&config).unwrap();
        let gremlin = gremlin_config(&config, &headers).unwrap();

        assert_eq!(gremlin.websocket.url, "ws://localhost:8182/gremlin");
        assert_eq!(gremlin.serializer, Serializer::GraphSonV3);
        let names: Vec<&str> = gremlin
            .websocket
            .headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, ["host", "x-amz-date", "Authorization"]);
    }

    #[tokio::test]
    async fn test_handshake_replays_signed_headers() {
        let server =
            GremlinTestServer::spawn(|id, _| vec![response(id, 200, json!([4]), json!({}))]).await;
        let config = config(&server.addr.to_string());
        let headers = signed_headers(&config).unwrap();

        let mut session = NeptuneSession::connect_with_headers(&config, &headers)
            .await
            .unwrap();
        let results = session.submit("g.V().count()").await.unwrap();
        assert_eq!(results.rows(), &[json!(4)]);

        assert_eq!(server.header("host").as_deref(), Some(headers.host.as_str()));
        assert_eq!(server.header_count("host"), 1);
        assert_eq!(
            server.header("x-amz-date").as_deref(),
            Some(headers.amz_date.as_str())
        );
        assert_eq!(
            server.header("authorization").as_deref(),
            Some(headers.authorization.as_str())
        );
        session.close().await;
    }

    #[tokio::test]
    async fn test_load_balancer_keeps_cluster_host() {
        let server =
            GremlinTestServer::spawn(|id, _| vec![response(id, 204, json!(null), json!({}))]).await;
        let port = server.addr.port();

        let mut config = config(&format!("db.cluster-abc.us-west-2.neptune.amazonaws.com:{port}"));
        config.connection.elb_endpoint = Some("127.0.0.1".to_string());

        let session = NeptuneSession::connect(&config).await.unwrap();
        assert_eq!(session.connect_endpoint().host(), "127.0.0.1");
        assert_eq!(session.connect_endpoint().port(), port);
        session.submit("g.V().drop()").await.unwrap();

        assert_eq!(
            server.header("host"),
            Some(format!("db.cluster-abc.us-west-2.neptune.amazonaws.com:{port}"))
        );
    }

    #[tokio::test]
    async fn test_response_error_surfaces_status() {
        let server = GremlinTestServer::spawn(|id, _| {
            vec![response(id, 499, json!(null), json!({"code": "InvalidParameterException"}))]
        })
        .await;
        let session = NeptuneSession::connect(&config(&server.addr.to_string()))
            .await
            .unwrap();

        let err = session.submit("g.V(").await.unwrap_err();
        let gremlin = err.as_gremlin_error().unwrap();
        assert!(matches!(gremlin, GremlinError::Response { status_code: 499, .. }));
        assert_eq!(
            gremlin.status_attributes().unwrap()["code"],
            "InvalidParameterException"
        );
    }
}
