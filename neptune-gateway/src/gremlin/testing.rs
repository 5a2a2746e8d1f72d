//! In-process Gremlin Server stand-in for tests.
//!
//! Compiled for this crate's own tests and, behind the `testing` feature,
//! for downstream crates that drive a session end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderMap;

/// Accepts one connection, records the handshake headers and answers each
/// request frame with whatever `respond` returns.
pub struct GremlinTestServer {
    /// Loopback address the server listens on.
    pub addr: SocketAddr,
    headers: Arc<Mutex<Option<HeaderMap>>>,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    _task: JoinHandle<()>,
}

impl GremlinTestServer {
    /// Binds a loopback port and serves a single client in the background.
    ///
    /// `respond` receives the request id and the decoded request body.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound or a request frame is not
    /// `[mime length][mime][json]`.
    pub async fn spawn<F>(respond: F) -> Self
    where
        F: Fn(&str, &Value) -> Vec<Value> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let headers = Arc::new(Mutex::new(None));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen_headers = Arc::clone(&headers);
        let seen_requests = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let callback = move |request: &Request, response: Response| {
                *seen_headers.lock() = Some(request.headers().clone());
                Ok::<Response, ErrorResponse>(response)
            };
            let Ok(mut ws) = accept_hdr_async(stream, callback).await else {
                return;
            };

            while let Some(Ok(message)) = ws.next().await {
                let frame = match message {
                    Message::Binary(frame) => frame,
                    Message::Close(_) => break,
                    _ => continue,
                };

                let mime_len = usize::from(frame[0]);
                let mime = String::from_utf8_lossy(&frame[1..=mime_len]).to_string();
                let request: Value = serde_json::from_slice(&frame[1 + mime_len..]).unwrap();
                seen_requests.lock().push((mime, request.clone()));

                for reply in respond(&request_id(&request), &request) {
                    if ws.send(Message::Text(reply.to_string())).await.is_err() {
                        return;
                    }
                }
            }
        });

        Self {
            addr,
            headers,
            requests,
            _task: task,
        }
    }

    /// `ws://` URL of the Gremlin endpoint.
    pub fn url(&self) -> String {
        format!("ws://{}/gremlin", self.addr)
    }

    /// Value of a handshake header, once a client has connected.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .lock()
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Number of times a handshake header was sent.
    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .lock()
            .as_ref()
            .map_or(0, |h| h.get_all(name).iter().count())
    }

    /// Returns `(mime type, request body)` for each request received.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }
}

/// Reads the request id from a plain or GraphSON 3.0 request.
pub fn request_id(request: &Value) -> String {
    let id = &request["requestId"];
    id.get("@value")
        .unwrap_or(id)
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Builds a plain JSON response frame.
pub fn response(request_id: &str, code: u16, data: Value, attributes: Value) -> Value {
    json!({
        "requestId": request_id,
        "status": {"code": code, "message": "", "attributes": attributes},
        "result": {"data": data, "meta": {}}
    })
}
