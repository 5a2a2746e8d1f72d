//! Runs the sample graph script.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{Instrument, info, warn};

use neptune_core::config::NeptuneConfig;
use neptune_gateway::neptune::NeptuneSession;
use neptune_gateway::queries::{SampleQuery, sample_queries};
use neptune_telemetry::spans::{connection_span, query_span};

use super::output::{print_outcome, print_query};

/// Connect and run every sample query in order.
///
/// # Errors
///
/// Returns error on the first query that fails, after reporting it.
pub async fn execute(config: &NeptuneConfig) -> Result<()> {
    let mut session = connect(config).await?;

    let outcome = run_queries(&session, sample_queries(), &mut io::stdout()).await;
    session.close().await;

    if outcome.is_ok() {
        info!(queries = sample_queries().len(), "Sample script completed");
    }
    outcome
}

/// Opens a signed session inside a connection span.
pub(crate) async fn connect(config: &NeptuneConfig) -> Result<NeptuneSession> {
    let span = connection_span(&config.connection.endpoint, &config.connection.region);
    NeptuneSession::connect(config)
        .instrument(span)
        .await
        .context("Failed to connect to Neptune")
}

/// Submits `queries` one at a time, writing each outcome to `out`.
///
/// The next query is only sent once the previous one has completed.
pub(crate) async fn run_queries<W: Write>(
    session: &NeptuneSession,
    queries: &[SampleQuery],
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Get List of Node Labels:")?;

    for (index, query) in queries.iter().enumerate() {
        print_query(out, query.label, query.gremlin)?;

        let outcome = session
            .submit(query.gremlin)
            .instrument(query_span(query.label, index))
            .await;
        print_outcome(out, &outcome)?;
        if let Err(e) = &outcome {
            warn!(
                query = query.label,
                category = e.category(),
                severity = %e.severity(),
                "Query failed"
            );
        }
        outcome.with_context(|| format!("Query '{}' failed", query.label))?;
    }

    Ok(())
}
