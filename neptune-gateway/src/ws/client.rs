//! Single-connection WebSocket client.

#![allow(clippy::future_not_send)]

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use neptune_core::error::NetworkError;
use parking_lot::RwLock;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tokio_tungstenite::tungstenite::Error as TungsteniteError;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::Message as Frame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

use super::config::WebSocketConfig;
use super::message::WebSocketMessage;
use super::state::{ConnectionState, ConnectionStats, InternalState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Frame>;

const OUTBOUND_QUEUE: usize = 100;

/// Selects ring as the process-wide TLS crypto provider unless one is set.
fn install_crypto_provider() {
    // Err means a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Receives events from the background connection task.
#[async_trait]
pub trait WebSocketCallback: Send + Sync {
    /// A text or binary frame arrived.
    async fn on_message(&self, message: WebSocketMessage);

    /// The upgrade succeeded.
    async fn on_connected(&self) {}

    /// The connection is gone; no further frames will arrive.
    async fn on_disconnected(&self, reason: Option<String>);

    /// A read or write failed; `on_disconnected` follows.
    async fn on_error(&self, error: NetworkError);
}

/// One WebSocket connection with custom upgrade headers and a heartbeat.
///
/// Frames are written by a spawned task fed through a bounded queue, so
/// `send` only waits for queue space. Once the connection drops, the client
/// stays disconnected.
pub struct WebSocketClient {
    config: WebSocketConfig,
    state: Arc<RwLock<InternalState>>,
    callback: Option<Arc<dyn WebSocketCallback>>,
    outbound: Option<mpsc::Sender<WebSocketMessage>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl WebSocketClient {
    /// Creates a disconnected client.
    #[must_use]
    pub fn new(config: WebSocketConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(InternalState::new())),
            callback: None,
            outbound: None,
            shutdown: None,
        }
    }

    /// Routes connection events to `callback`. Set before `connect`.
    pub fn set_callback(&mut self, callback: Arc<dyn WebSocketCallback>) {
        self.callback = Some(callback);
    }

    /// Settings this client was built with.
    #[must_use]
    pub fn config(&self) -> &WebSocketConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.read().state
    }

    /// True while frames can be sent.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Frame counters for the current connection.
    #[must_use]
    pub fn stats(&self) -> ConnectionStats {
        self.state.read().stats
    }

    /// Time since the upgrade completed, while connected.
    #[must_use]
    pub fn uptime(&self) -> Option<Duration> {
        self.state.read().uptime()
    }

    /// Builds the upgrade request for the configured URL and headers.
    ///
    /// Configured headers replace generated ones with the same name, so a
    /// configured `host` wins over the URL authority.
    ///
    /// # Errors
    ///
    /// `NetworkError::ConnectionFailed` for an unparsable URL, header name or
    /// header value.
    pub fn handshake_request(&self) -> Result<Request, NetworkError> {
        let invalid = |reason: String| NetworkError::ConnectionFailed { reason };

        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| invalid(format!("Invalid WebSocket URL '{}': {e}", self.config.url)))?;

        for (name, value) in &self.config.headers {
            let name_bytes = name.as_bytes();
            let header = HeaderName::from_bytes(name_bytes)
                .map_err(|e| invalid(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| invalid(format!("Invalid value for header '{name}': {e}")))?;
            request.headers_mut().insert(header, value);
        }

        Ok(request)
    }

    /// Performs the upgrade and starts the background task.
    ///
    /// Does nothing when already connected.
    ///
    /// # Errors
    ///
    /// `Timeout` when the connect timeout elapses, `HandshakeRejected` for a
    /// non-101 answer, otherwise `Tls` or `ConnectionFailed`.
    pub async fn connect(&mut self) -> Result<(), NetworkError> {
        if self.is_connected() {
            return Ok(());
        }

        let request = self.handshake_request()?;
        if self.config.url.starts_with("wss://") {
            install_crypto_provider();
        }
        self.state.write().state = ConnectionState::Connecting;

        let stream = match timeout(self.config.connect_timeout(), connect_async(request)).await {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => return Err(self.connect_failed(upgrade_error(e))),
            Err(_elapsed) => {
                let timeout_ms = u64::try_from(self.config.connect_timeout().as_millis())
                    .unwrap_or(u64::MAX);
                return Err(self.connect_failed(NetworkError::Timeout { timeout_ms }));
            }
        };

        self.state.write().mark_connected();
        self.spawn_task(stream);

        if let Some(callback) = &self.callback {
            callback.on_connected().await;
        }
        info!(label = %self.config.label, url = %self.config.url, "WebSocket connected");
        Ok(())
    }

    fn connect_failed(&self, error: NetworkError) -> NetworkError {
        self.state.write().mark_disconnected();
        warn!(
            label = %self.config.label,
            url = %self.config.url,
            error = %error,
            "WebSocket connection failed"
        );
        error
    }

    /// Sends a close frame and stops the background task.
    pub async fn disconnect(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.outbound = None;
        self.state.write().mark_closed();

        if let Some(callback) = &self.callback {
            callback
                .on_disconnected(Some("Client disconnected".to_string()))
                .await;
        }
        info!(label = %self.config.label, "WebSocket disconnected");
    }

    /// Queues a frame for the background task.
    ///
    /// # Errors
    ///
    /// `ConnectionClosed` when not connected or the task has exited.
    pub async fn send(&self, message: WebSocketMessage) -> Result<(), NetworkError> {
        let Some(outbound) = &self.outbound else {
            return Err(NetworkError::ConnectionClosed {
                reason: format!("connection is {}", self.state()),
            });
        };
        outbound
            .send(message)
            .await
            .map_err(|_| NetworkError::ConnectionClosed {
                reason: "connection task has stopped".to_string(),
            })
    }

    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// See [`WebSocketClient::send`].
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), NetworkError> {
        self.send(WebSocketMessage::text(text)).await
    }

    /// Queues a binary frame.
    ///
    /// # Errors
    ///
    /// See [`WebSocketClient::send`].
    pub async fn send_binary(&self, data: impl Into<Vec<u8>>) -> Result<(), NetworkError> {
        self.send(WebSocketMessage::binary(data)).await
    }

    fn spawn_task(&mut self, stream: WsStream) {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.outbound = Some(outbound_tx);
        self.shutdown = Some(shutdown_tx);

        let (sink, source) = stream.split();
        let task = ConnectionTask {
            sink,
            state: Arc::clone(&self.state),
            callback: self.callback.clone(),
        };
        tokio::spawn(task.run(source, outbound_rx, shutdown_rx, self.config.clone()));
    }
}

/// Maps a failed upgrade to the error callers act on.
fn upgrade_error(error: TungsteniteError) -> NetworkError {
    match error {
        TungsteniteError::Http(response) => {
            let status = response.status();
            let body = response
                .body()
                .as_deref()
                .map(|b| String::from_utf8_lossy(b).trim().to_string())
                .filter(|b| !b.is_empty());
            NetworkError::HandshakeRejected {
                status_code: status.as_u16(),
                reason: body.unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                }),
            }
        }
        TungsteniteError::Tls(e) => NetworkError::Tls {
            reason: e.to_string(),
        },
        other => NetworkError::ConnectionFailed {
            reason: other.to_string(),
        },
    }
}

/// Owns the write half of an open connection.
struct ConnectionTask {
    sink: WsSink,
    state: Arc<RwLock<InternalState>>,
    callback: Option<Arc<dyn WebSocketCallback>>,
}

impl ConnectionTask {
    async fn run(
        mut self,
        mut source: futures::stream::SplitStream<WsStream>,
        mut outbound: mpsc::Receiver<WebSocketMessage>,
        mut shutdown: oneshot::Receiver<()>,
        config: WebSocketConfig,
    ) {
        let period = config.heartbeat_interval();
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let flow = tokio::select! {
                _ = &mut shutdown => {
                    debug!(label = %config.label, "Closing connection");
                    let _ = self.sink.close().await;
                    ControlFlow::Break(())
                }
                Some(message) = outbound.recv() => self.write(message).await,
                incoming = source.next() => self.read(incoming).await,
                _ = heartbeat.tick(), if config.auto_ping => self.ping().await,
            };
            if flow.is_break() {
                break;
            }
        }
    }

    async fn write(&mut self, message: WebSocketMessage) -> ControlFlow<()> {
        let Err(e) = self.sink.send(Frame::from(message)).await else {
            return ControlFlow::Continue(());
        };
        error!(error = %e, "Failed to write frame");
        if let Some(cb) = &self.callback {
            cb.on_error(NetworkError::WebSocket {
                reason: e.to_string(),
            })
            .await;
        }
        self.lost(format!("write failed: {e}")).await
    }

    async fn read(
        &mut self,
        incoming: Option<Result<Frame, TungsteniteError>>,
    ) -> ControlFlow<()> {
        let frame = match incoming {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                error!(error = %e, "WebSocket read failed");
                if let Some(cb) = &self.callback {
                    cb.on_error(NetworkError::WebSocket {
                        reason: e.to_string(),
                    })
                    .await;
                }
                return self.lost(e.to_string()).await;
            }
            None => return self.lost("Stream ended".to_string()).await,
        };

        self.state.write().record_message();
        match WebSocketMessage::from_frame(frame) {
            None => {}
            Some(WebSocketMessage::Pong(_)) => {
                self.state.write().record_pong();
                debug!("Pong received");
            }
            Some(WebSocketMessage::Ping(payload)) => {
                if let Err(e) = self.sink.send(Frame::Pong(payload)).await {
                    warn!(error = %e, "Failed to answer ping");
                }
            }
            Some(WebSocketMessage::Close(reason)) => {
                info!(?reason, "Server sent close frame");
                let reason = reason.map_or_else(
                    || "Server closed connection".to_string(),
                    |r| r.to_string(),
                );
                return self.lost(reason).await;
            }
            Some(data) => {
                if let Some(cb) = &self.callback {
                    cb.on_message(data).await;
                }
            }
        }
        ControlFlow::Continue(())
    }

    async fn ping(&mut self) -> ControlFlow<()> {
        self.state.write().record_ping();
        match self.sink.send(Frame::Ping(Vec::new())).await {
            Ok(()) => debug!("Ping sent"),
            Err(e) => warn!(error = %e, "Failed to send ping"),
        }
        ControlFlow::Continue(())
    }

    async fn lost(&self, reason: String) -> ControlFlow<()> {
        info!(%reason, "WebSocket connection lost");
        self.state.write().mark_disconnected();
        if let Some(cb) = &self.callback {
            cb.on_disconnected(Some(reason)).await;
        }
        ControlFlow::Break(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Response};
    use tokio_tungstenite::tungstenite::http::StatusCode;

    struct Collector {
        tx: mpsc::UnboundedSender<WebSocketMessage>,
    }

    #[async_trait]
    impl WebSocketCallback for Collector {
        async fn on_message(&self, message: WebSocketMessage) {
            let _ = self.tx.send(message);
        }

        async fn on_disconnected(&self, _reason: Option<String>) {}

        async fn on_error(&self, _error: NetworkError) {}
    }

    #[test]
    fn test_handshake_request_headers() {
        let config = WebSocketConfig::builder()
            .url("wss://elb.example.com:8182/gremlin")
            .header("host", "db.example.com:8182")
            .header("x-amz-date", "20200101T000000Z")
            .header("Authorization", "AWS4-HMAC-SHA256 Signature=abc")
            .build();

        let request = WebSocketClient::new(config).handshake_request().unwrap();
        let headers = request.headers();
        assert_eq!(headers.get_all("host").iter().count(), 1);
        assert_eq!(headers["host"], "db.example.com:8182");
        assert_eq!(headers["x-amz-date"], "20200101T000000Z");
        assert_eq!(headers["authorization"], "AWS4-HMAC-SHA256 Signature=abc");
        assert_eq!(request.uri().host(), Some("elb.example.com"));
    }

    #[test]
    fn test_handshake_request_rejects_bad_header() {
        let config = WebSocketConfig::builder()
            .url("ws://localhost:8182/gremlin")
            .header("bad header", "value")
            .build();

        let err = WebSocketClient::new(config).handshake_request().unwrap_err();
        assert!(matches!(err, NetworkError::ConnectionFailed { .. }));
    }

    #[tokio::test]
    async fn test_send_before_connect() {
        let client = WebSocketClient::new(WebSocketConfig::default());
        let err = client.send_text("g.V()").await.unwrap_err();
        assert_eq!(
            err,
            NetworkError::ConnectionClosed {
                reason: "connection is disconnected".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_connect_sends_headers_and_echoes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut seen = None;
            let callback = |request: &Request, response: Response| {
                seen = request
                    .headers()
                    .get("x-amz-date")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Ok::<Response, ErrorResponse>(response)
            };
            let mut ws = accept_hdr_async(stream, callback).await.unwrap();
            if let Some(Ok(msg)) = ws.next().await {
                ws.send(msg).await.unwrap();
            }
            // Hold the socket open until the client has checked its state.
            let _ = done_rx.await;
            seen
        });

        let config = WebSocketConfig::builder()
            .url(format!("ws://{addr}/gremlin"))
            .header("x-amz-date", "20200101T000000Z")
            .build();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut client = WebSocketClient::new(config);
        client.set_callback(Arc::new(Collector { tx }));

        client.connect().await.unwrap();
        assert!(client.is_connected());

        client.send_binary(vec![7, 8, 9]).await.unwrap();
        let echoed = rx.recv().await.unwrap();
        assert_eq!(echoed, WebSocketMessage::binary(vec![7, 8, 9]));
        assert_eq!(client.stats().frames_received, 1);
        assert!(client.uptime().is_some());
        assert!(client.is_connected());

        done_tx.send(()).unwrap();
        assert_eq!(server.await.unwrap().as_deref(), Some("20200101T000000Z"));
        client.disconnect().await;
        assert_eq!(client.state(), ConnectionState::Closed);
    }

    struct Lifecycle {
        tx: mpsc::UnboundedSender<&'static str>,
    }

    #[async_trait]
    impl WebSocketCallback for Lifecycle {
        async fn on_message(&self, _message: WebSocketMessage) {}

        async fn on_disconnected(&self, _reason: Option<String>) {
            let _ = self.tx.send("disconnected");
        }

        async fn on_error(&self, _error: NetworkError) {
            let _ = self.tx.send("error");
        }
    }

    #[tokio::test]
    async fn test_write_failure_drops_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            // Never reads, so the client's close frame goes unanswered.
            let _ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let _ = done_rx.await;
        });

        let config = WebSocketConfig::builder()
            .url(format!("ws://{addr}/gremlin"))
            .build();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut client = WebSocketClient::new(config);
        client.set_callback(Arc::new(Lifecycle { tx }));
        client.connect().await.unwrap();

        // Tungstenite refuses data frames once a close frame has been sent.
        client.send(WebSocketMessage::Close(None)).await.unwrap();
        client.send_text("g.V()").await.unwrap();

        assert_eq!(rx.recv().await, Some("error"));
        assert_eq!(rx.recv().await, Some("disconnected"));
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(client.uptime().is_none());

        done_tx.send(()).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let callback = |_: &Request, _: Response| {
                let mut response = ErrorResponse::new(Some("Missing Authentication Token".to_string()));
                *response.status_mut() = StatusCode::FORBIDDEN;
                Err(response)
            };
            let _ = accept_hdr_async(stream, callback).await;
        });

        let config = WebSocketConfig::builder()
            .url(format!("ws://{addr}/gremlin"))
            .build();
        let mut client = WebSocketClient::new(config);

        let err = client.connect().await.unwrap_err();
        assert!(matches!(
            err,
            NetworkError::HandshakeRejected {
                status_code: 403,
                ..
            }
        ));
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }
}
