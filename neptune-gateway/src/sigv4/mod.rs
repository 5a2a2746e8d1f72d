//! AWS Signature Version 4 request signing.
//!
//! Neptune authenticates a WebSocket upgrade by checking a SigV4 signature
//! computed over a plain `GET /gremlin` request. This module signs such a
//! request descriptor and hands back the headers to replay on the handshake.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use neptune_core::types::Credentials;
//! use neptune_gateway::sigv4::{HttpRequest, RequestSigner};
//!
//! let signer = RequestSigner::new(Credentials::new("AKIDEXAMPLE", "secret"));
//! let request = HttpRequest::get("https://db.example.com:8182/gremlin").unwrap();
//! let time = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//!
//! let headers = signer.sign_at(&request, "neptune-db", "us-east-1", time).unwrap();
//! assert_eq!(headers.host, "db.example.com:8182");
//! assert!(headers.authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20200101/"));
//! ```

mod canonical;
mod request;
mod signer;

pub use canonical::{
    EMPTY_PAYLOAD_SHA256, canonical_headers, canonical_query, canonical_request, canonical_uri,
    sha256_hex, string_to_sign, uri_encode,
};
pub use request::HttpRequest;
pub use signer::{ALGORITHM, RequestSigner, SignedHeaders, derive_signing_key};
