//! # Neptune Gateway
//!
//! Network communication with Amazon Neptune over IAM-authenticated
//! WebSockets.
//!
//! This crate provides:
//! - AWS Signature Version 4 signing of the Gremlin handshake request
//! - WebSocket client that replays signed headers on the upgrade
//! - Gremlin Server protocol client with GraphSON serializers
//!
//! # Architecture
//!
//! The gateway module is organized into:
//! - `sigv4` - request canonicalization and signing
//! - `ws` - WebSocket client infrastructure
//! - `gremlin` - request/response protocol on top of `ws`
//! - `neptune` - signed sessions built from `NeptuneConfig`
//! - `queries` - the sample traversal script
//!
//! # Example
//!
//! ```ignore
//! use neptune_core::config::NeptuneConfig;
//! use neptune_gateway::neptune::NeptuneSession;
//!
//! let config: NeptuneConfig = load_config()?;
//! let session = NeptuneSession::connect(&config).await?;
//! let results = session.submit("g.V().limit(1).valueMap(true)").await?;
//! ```

#![warn(missing_docs)]
#![allow(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::cargo)]
#![allow(clippy::nursery)]

/// AWS Signature Version 4 signing
pub mod sigv4;

/// WebSocket client infrastructure
pub mod ws;

/// Gremlin Server protocol client
pub mod gremlin;

/// Signed Neptune sessions
pub mod neptune;

/// Sample Gremlin queries
pub mod queries;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::gremlin::{GremlinClient, GremlinConfig, ResultSet, Serializer};
    pub use crate::neptune::{NeptuneSession, gremlin_config, signed_headers};
    pub use crate::queries::{SampleQuery, sample_queries};
    pub use crate::sigv4::{HttpRequest, RequestSigner, SignedHeaders};
    pub use crate::ws::{
        WebSocketCallback, WebSocketClient, WebSocketConfig, WebSocketConfigBuilder,
        WebSocketMessage,
    };
}
