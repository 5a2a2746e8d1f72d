//! Gremlin Server protocol client.
//!
//! Scripts are sent as `eval` requests in a binary frame prefixed with the
//! serializer mime type. Responses come back as JSON frames tagged with the
//! request id; a request is finished by a 200 or 204 status, a 206 status
//! means more batches follow, and anything else is an error.
//!
//! # Example
//!
//! ```ignore
//! use neptune_gateway::gremlin::{GremlinClient, GremlinConfig};
//! use neptune_gateway::ws::WebSocketConfig;
//!
//! let websocket = WebSocketConfig::builder()
//!     .url("ws://localhost:8182/gremlin")
//!     .build();
//! let client = GremlinClient::connect(GremlinConfig::new(websocket)).await?;
//! let results = client.submit("g.V().count()").await?;
//! ```

mod client;
mod message;
mod result;
mod serializer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{GremlinClient, GremlinConfig};
pub use message::{RequestArgs, RequestMessage, ResponseMessage, ResponseResult, ResponseStatus, status};
pub use result::ResultSet;
pub use serializer::{Serializer, decode_graphson_v3, encode_graphson_v3};
