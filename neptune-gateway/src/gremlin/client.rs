//! Gremlin client over a single WebSocket connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use neptune_core::error::{GremlinError, NetworkError};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::message::{RequestMessage, ResponseMessage, status};
use super::result::ResultSet;
use super::serializer::Serializer;
use crate::ws::{WebSocketCallback, WebSocketClient, WebSocketConfig, WebSocketMessage};

type ResponseSender = mpsc::UnboundedSender<Result<ResponseMessage, GremlinError>>;
type ResponseReceiver = mpsc::UnboundedReceiver<Result<ResponseMessage, GremlinError>>;
type PendingRequests = Arc<Mutex<HashMap<Uuid, ResponseSender>>>;

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Gremlin client settings.
#[derive(Debug, Clone)]
pub struct GremlinConfig {
    /// Transport settings, including handshake headers.
    pub websocket: WebSocketConfig,
    /// Wire format.
    pub serializer: Serializer,
    /// Time allowed for a request to reach a terminal status.
    pub request_timeout: Duration,
}

impl GremlinConfig {
    /// Creates settings with the default serializer and timeout.
    #[must_use]
    pub fn new(websocket: WebSocketConfig) -> Self {
        Self {
            websocket,
            serializer: Serializer::default(),
            request_timeout: default_request_timeout(),
        }
    }

    /// Sets the serializer.
    #[must_use]
    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Hands each response frame to the request waiting for it.
struct ResponseRouter {
    serializer: Serializer,
    pending: PendingRequests,
}

impl ResponseRouter {
    fn fail_all(&self, error: &GremlinError) {
        for (_, tx) in self.pending.lock().drain() {
            let _ = tx.send(Err(error.clone()));
        }
    }
}

#[async_trait]
impl WebSocketCallback for ResponseRouter {
    async fn on_message(&self, message: WebSocketMessage) {
        let Some(data) = message.data() else {
            return;
        };

        let response = match self.serializer.deserialize_response(data) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Undecodable response frame");
                self.fail_all(&e);
                return;
            }
        };

        let Some(request_id) = response.request_id else {
            let code = response.status.code;
            warn!(code, message = %response.status.message, "Response without request id");
            // Server-side request rejections carry no id.
            if status::is_error(code) {
                self.fail_all(&GremlinError::Response {
                    status_code: code,
                    message: response.status.message,
                    attributes: response.status.attributes,
                });
            }
            return;
        };

        let sender = self.pending.lock().get(&request_id).cloned();
        match sender {
            Some(tx) => {
                let _ = tx.send(Ok(response));
            }
            None => warn!(%request_id, "Response for unknown request"),
        }
    }

    async fn on_disconnected(&self, reason: Option<String>) {
        let reason = reason.unwrap_or_else(|| "Connection closed".to_string());
        self.fail_all(&GremlinError::NotConnected { reason });
    }

    async fn on_error(&self, error: NetworkError) {
        warn!(error = %error, "Gremlin transport error");
    }
}

/// Submits Gremlin scripts and collects their results.
///
/// Requests may be submitted one after another over the same connection;
/// responses are matched to requests by id.
pub struct GremlinClient {
    ws: WebSocketClient,
    serializer: Serializer,
    request_timeout: Duration,
    pending: PendingRequests,
}

impl GremlinClient {
    /// Opens the connection.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the WebSocket handshake fails.
    pub async fn connect(config: GremlinConfig) -> Result<Self, NetworkError> {
        let pending: PendingRequests = Arc::new(Mutex::new(HashMap::new()));

        let mut ws = WebSocketClient::new(config.websocket);
        ws.set_callback(Arc::new(ResponseRouter {
            serializer: config.serializer,
            pending: Arc::clone(&pending),
        }));
        ws.connect().await?;

        Ok(Self {
            ws,
            serializer: config.serializer,
            request_timeout: config.request_timeout,
            pending,
        })
    }

    /// Returns whether the connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ws.is_connected()
    }

    /// Returns the wire format in use.
    #[must_use]
    pub fn serializer(&self) -> Serializer {
        self.serializer
    }

    /// Evaluates `gremlin` and waits for all of its results.
    ///
    /// # Errors
    ///
    /// Returns `GremlinError::Response` when the server reports an error
    /// status, `GremlinError::Timeout` when no terminal status arrives in
    /// time, and `GremlinError::NotConnected` when the connection is gone.
    pub async fn submit(&self, gremlin: &str) -> Result<ResultSet, GremlinError> {
        self.submit_request(RequestMessage::eval(gremlin)).await
    }

    /// Evaluates `gremlin` with parameter bindings.
    ///
    /// # Errors
    ///
    /// See [`GremlinClient::submit`].
    pub async fn submit_with_bindings(
        &self,
        gremlin: &str,
        bindings: Map<String, Value>,
    ) -> Result<ResultSet, GremlinError> {
        self.submit_request(RequestMessage::eval(gremlin).with_bindings(bindings))
            .await
    }

    /// Sends `request` and waits for its terminal response.
    ///
    /// # Errors
    ///
    /// See [`GremlinClient::submit`].
    pub async fn submit_request(&self, request: RequestMessage) -> Result<ResultSet, GremlinError> {
        if !self.ws.is_connected() {
            return Err(GremlinError::NotConnected {
                reason: format!("connection is {}", self.ws.state()),
            });
        }

        let request_id = request.request_id;
        let frame = self.serializer.serialize_request(&request)?;

        let (tx, rx) = mpsc::unbounded_channel();
        self.pending.lock().insert(request_id, tx);

        debug!(%request_id, gremlin = %request.args.gremlin, "Submitting request");
        let started = Instant::now();

        let outcome = match self.ws.send_binary(frame).await {
            Ok(()) => timeout(self.request_timeout, collect_responses(request_id, rx))
                .await
                .unwrap_or_else(|_| {
                    Err(GremlinError::Timeout {
                        timeout_ms: u64::try_from(self.request_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    })
                }),
            Err(e) => Err(GremlinError::NotConnected {
                reason: e.to_string(),
            }),
        };

        self.pending.lock().remove(&request_id);

        match &outcome {
            Ok(results) => debug!(
                %request_id,
                rows = results.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "Request completed"
            ),
            Err(e) => warn!(%request_id, error = %e, "Request failed"),
        }

        outcome
    }

    /// Closes the connection. Requests still waiting fail with `NotConnected`.
    pub async fn close(&mut self) {
        self.ws.disconnect().await;
    }
}

async fn collect_responses(
    request_id: Uuid,
    mut rx: ResponseReceiver,
) -> Result<ResultSet, GremlinError> {
    let mut rows = Vec::new();

    while let Some(frame) = rx.recv().await {
        let response = frame?;
        let code = response.status.code;

        if status::is_error(code) {
            return Err(GremlinError::Response {
                status_code: code,
                message: response.status.message,
                attributes: response.status.attributes,
            });
        }

        let attributes = response.status.attributes.clone();
        rows.extend(response.into_rows());

        if status::is_terminal_success(code) {
            return Ok(ResultSet::new(request_id, code, rows, attributes));
        }
        trace!(%request_id, rows = rows.len(), "Partial content received");
    }

    Err(GremlinError::NotConnected {
        reason: "connection closed before the response completed".to_string(),
    })
}
