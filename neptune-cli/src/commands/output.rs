//! Console output for query results and request errors.

use std::io::{self, Write};

use neptune_core::error::{GremlinError, NeptuneError};
use neptune_gateway::gremlin::ResultSet;
use serde_json::{Map, Value};

/// Writes the header line printed before a query runs.
pub fn print_query<W: Write>(out: &mut W, label: &str, gremlin: &str) -> io::Result<()> {
    writeln!(out, "Running this query: {label}: {gremlin}")
}

/// Writes the outcome of one query.
///
/// Rows are printed one JSON document per line, followed by the status
/// attributes. A server error prints `Request Error!`, the status code and
/// the attributes; other failures print nothing and are left to the caller.
pub fn print_outcome<W: Write>(
    out: &mut W,
    outcome: &Result<ResultSet, NeptuneError>,
) -> io::Result<()> {
    match outcome {
        Ok(results) => print_result_set(out, results),
        Err(error) => match error.as_gremlin_error() {
            Some(gremlin @ GremlinError::Response { .. }) => print_request_error(out, gremlin),
            _ => Ok(()),
        },
    }
}

/// Writes rows and status attributes of a successful query.
pub fn print_result_set<W: Write>(out: &mut W, results: &ResultSet) -> io::Result<()> {
    if !results.is_empty() {
        writeln!(out, "\tResult:")?;
        for row in results {
            writeln!(out, "\t{row}")?;
        }
        writeln!(out)?;
    }

    print_status_attributes(out, results.status_attributes())?;
    writeln!(out)
}

/// Writes a server-side query failure.
pub fn print_request_error<W: Write>(out: &mut W, error: &GremlinError) -> io::Result<()> {
    writeln!(out, "\tRequest Error!")?;
    if let Some(code) = error.status_code() {
        writeln!(out, "\tStatusCode: {code}")?;
    }
    if let Some(attributes) = error.status_attributes() {
        print_status_attributes(out, attributes)?;
    }
    Ok(())
}

/// Writes one `\t<key>: <json>` line per attribute.
pub fn print_status_attributes<W: Write>(
    out: &mut W,
    attributes: &Map<String, Value>,
) -> io::Result<()> {
    for (key, value) in attributes {
        writeln!(out, "\t{key}: {value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neptune_core::error::NetworkError;
    use serde_json::json;

    fn render(outcome: &Result<ResultSet, NeptuneError>) -> String {
        let mut out = Vec::new();
        print_outcome(&mut out, outcome).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn attributes(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_rows_then_attributes() {
        let results = ResultSet::new(
            Default::default(),
            200,
            vec![json!({"id": "1", "label": "person"}), json!(2)],
            attributes(json!({"host": "/10.0.0.1:8182"})),
        );

        assert_eq!(
            render(&Ok(results)),
            "\tResult:\n\t{\"id\":\"1\",\"label\":\"person\"}\n\t2\n\n\thost: \"/10.0.0.1:8182\"\n\n"
        );
    }

    #[test]
    fn test_empty_result_prints_blank_line() {
        let results = ResultSet::new(Default::default(), 204, Vec::new(), Map::new());
        assert_eq!(render(&Ok(results)), "\n");
    }

    #[test]
    fn test_request_error() {
        let error = NeptuneError::from(GremlinError::Response {
            status_code: 597,
            message: "Script evaluation error".to_string(),
            attributes: attributes(json!({"code": "MalformedQueryException"})),
        });

        assert_eq!(
            render(&Err(error)),
            "\tRequest Error!\n\tStatusCode: 597\n\tcode: \"MalformedQueryException\"\n"
        );
    }

    #[test]
    fn test_transport_error_prints_nothing() {
        let error = NeptuneError::from(NetworkError::ConnectionClosed {
            reason: "reset".to_string(),
        });
        assert_eq!(render(&Err(error)), "");
    }

    #[test]
    fn test_print_query() {
        let mut out = Vec::new();
        print_query(&mut out, "Cleanup", "g.V().drop()").unwrap();
        assert_eq!(out, b"Running this query: Cleanup: g.V().drop()\n");
    }
}
