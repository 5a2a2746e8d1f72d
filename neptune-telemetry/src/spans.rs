//! Span definitions for tracing.
//!
//! Provides pre-defined spans for the client's operations:
//! - Connecting to a cluster
//! - Signing the handshake
//! - Running a Gremlin query

use tracing::{Span, info_span};

/// Create a span for establishing a Neptune connection.
///
/// # Example
///
/// ```
/// use neptune_telemetry::spans::connection_span;
///
/// let span = connection_span("db.cluster.neptune.amazonaws.com:8182", "us-east-1");
/// let _guard = span.enter();
/// // ... connect
/// ```
#[must_use]
pub fn connection_span(endpoint: &str, region: &str) -> Span {
    info_span!(
        "neptune.connect",
        endpoint = %endpoint,
        region = %region
    )
}

/// Create a span for signing a request.
#[must_use]
pub fn signing_span(service: &str, region: &str) -> Span {
    info_span!(
        "sigv4.sign",
        service = %service,
        region = %region
    )
}

/// Create a span for one query submission.
///
/// # Example
///
/// ```
/// use neptune_telemetry::spans::query_span;
///
/// let span = query_span("AddVertex 1", 3);
/// let _guard = span.enter();
/// // ... submit
/// ```
#[must_use]
pub fn query_span(label: &str, index: usize) -> Span {
    info_span!(
        "gremlin.query",
        label = %label,
        index = index
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_create() {
        // Without a subscriber the spans are disabled but must not panic.
        let _ = connection_span("localhost:8182", "us-east-1");
        let _ = signing_span("neptune-db", "us-east-1");
        let span = query_span("Cleanup", 0);
        let _guard = span.enter();
    }
}
