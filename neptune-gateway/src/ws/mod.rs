//! WebSocket transport under the Gremlin client.
//!
//! [`WebSocketClient`] opens one connection with caller-supplied upgrade
//! headers (the signed SigV4 set for Neptune), answers server pings, sends
//! its own heartbeat pings and hands data frames to a [`WebSocketCallback`].
//! A dropped connection is reported through the callback and is not
//! re-established.
//!
//! ```ignore
//! let config = WebSocketConfig::builder()
//!     .url("wss://db.cluster-abc.us-east-1.neptune.amazonaws.com:8182/gremlin")
//!     .headers(signed.pairs())
//!     .build();
//!
//! let mut client = WebSocketClient::new(config);
//! client.set_callback(Arc::new(router));
//! client.connect().await?;
//! client.send_binary(frame).await?;
//! ```

mod client;
mod config;
mod message;
mod state;

pub use client::{WebSocketCallback, WebSocketClient};
pub use config::{WebSocketConfig, WebSocketConfigBuilder};
pub use message::{CloseReason, WebSocketMessage};
pub use state::{ConnectionState, ConnectionStats};
