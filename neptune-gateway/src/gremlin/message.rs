//! Gremlin Server request and response messages.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Gremlin Server status codes the client acts on.
pub mod status {
    /// The request completed and this is the last batch.
    pub const SUCCESS: u16 = 200;
    /// The request completed with no result.
    pub const NO_CONTENT: u16 = 204;
    /// More batches follow for this request.
    pub const PARTIAL_CONTENT: u16 = 206;

    /// Returns whether `code` ends a successful request.
    #[must_use]
    pub fn is_terminal_success(code: u16) -> bool {
        matches!(code, SUCCESS | NO_CONTENT)
    }

    /// Returns whether `code` is an error.
    #[must_use]
    pub fn is_error(code: u16) -> bool {
        !matches!(code, SUCCESS | NO_CONTENT | PARTIAL_CONTENT)
    }
}

const EVAL_OP: &str = "eval";
const GREMLIN_GROOVY: &str = "gremlin-groovy";

/// A script evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    /// Correlates responses with this request.
    pub request_id: Uuid,
    /// Operation, always `eval` here.
    pub op: String,
    /// Op processor; empty selects the default session-less processor.
    pub processor: String,
    /// Operation arguments.
    pub args: RequestArgs,
}

/// Arguments of an `eval` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestArgs {
    /// Script to evaluate.
    pub gremlin: String,
    /// Script language.
    pub language: String,
    /// Script parameter bindings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Map<String, Value>>,
}

impl RequestMessage {
    /// Creates an `eval` request for `gremlin` with a fresh request id.
    #[must_use]
    pub fn eval(gremlin: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            op: EVAL_OP.to_string(),
            processor: String::new(),
            args: RequestArgs {
                gremlin: gremlin.into(),
                language: GREMLIN_GROOVY.to_string(),
                bindings: None,
            },
        }
    }

    /// Sets the parameter bindings.
    #[must_use]
    pub fn with_bindings(mut self, bindings: Map<String, Value>) -> Self {
        self.args.bindings = Some(bindings);
        self
    }
}

/// Status part of a response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseStatus {
    /// Gremlin status code.
    pub code: u16,
    /// Human readable message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Server supplied attributes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Map<String, Value>,
}

/// Result part of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseResult {
    /// Rows of this batch.
    #[serde(default)]
    pub data: Value,
    /// Result metadata.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Map<String, Value>,
}

/// One response frame. A request may receive several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    /// Id of the request this answers; absent for some server errors.
    #[serde(default)]
    pub request_id: Option<Uuid>,
    /// Status.
    pub status: ResponseStatus,
    /// Result batch.
    #[serde(default)]
    pub result: ResponseResult,
}

impl ResponseMessage {
    /// Returns the rows carried by this frame.
    ///
    /// A list is spread into rows, `null` yields none and any other value is
    /// a single row.
    #[must_use]
    pub fn into_rows(self) -> Vec<Value> {
        match self.result.data {
            Value::Null => Vec::new(),
            Value::Array(rows) => rows,
            other => vec![other],
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
