//! Submits a single Gremlin query.

use std::io;

use anyhow::{Context, Result, anyhow};
use clap::{ArgGroup, Args};
use serde_json::{Map, Value};
use tracing::Instrument;

use neptune_core::config::NeptuneConfig;
use neptune_gateway::queries;
use neptune_telemetry::spans::query_span;

use super::output::{print_outcome, print_query};
use super::run::connect;

const LABEL: &str = "query";

/// Arguments for the query command
#[derive(Args)]
#[command(group(ArgGroup::new("script").required(true).args(["gremlin", "sample"])))]
pub struct QueryArgs {
    /// Gremlin query text, e.g. "g.V().limit(1)"
    pub gremlin: Option<String>,

    /// Run one of the sample queries by label, e.g. "CountEdges"
    #[arg(long)]
    pub sample: Option<String>,

    /// Parameter binding as NAME=VALUE; VALUE is JSON or a plain string
    #[arg(long = "bind", value_name = "NAME=VALUE", value_parser = parse_binding)]
    pub bindings: Vec<(String, Value)>,
}

impl QueryArgs {
    /// Returns the label and script to submit.
    fn script(&self) -> Result<(&str, &str)> {
        match (&self.sample, &self.gremlin) {
            (Some(label), _) => queries::find(label)
                .map(|q| (q.label, q.gremlin))
                .ok_or_else(|| anyhow!("Unknown sample query '{label}'")),
            (None, Some(gremlin)) => Ok((LABEL, gremlin.as_str())),
            (None, None) => Err(anyhow!("No query given")),
        }
    }

    fn binding_map(&self) -> Map<String, Value> {
        self.bindings.iter().cloned().collect()
    }
}

fn parse_binding(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("binding name is empty in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// Connect, run the selected query and print its outcome.
///
/// # Errors
///
/// Returns error if the sample label is unknown, or the connection or the
/// query fails.
pub async fn execute(config: &NeptuneConfig, args: &QueryArgs) -> Result<()> {
    let (label, gremlin) = args.script()?;
    let mut session = connect(config).await?;
    let mut out = io::stdout();

    print_query(&mut out, label, gremlin)?;
    let outcome = if args.bindings.is_empty() {
        session.submit(gremlin).instrument(query_span(label, 0)).await
    } else {
        session
            .submit_with_bindings(gremlin, args.binding_map())
            .instrument(query_span(label, 0))
            .await
    };
    session.close().await;

    print_outcome(&mut out, &outcome)?;
    outcome.context("Query failed")?;
    Ok(())
}
