//! GraphSON serializers and WebSocket framing.

use neptune_core::config::SerializerKind;
use neptune_core::error::GremlinError;
use serde_json::{Map, Value, json};

use super::message::{RequestMessage, ResponseMessage};

const GRAPHSON_V3_MIME: &str = "application/vnd.gremlin-v3.0+json";
const GRAPHSON_V1_MIME: &str = "application/vnd.gremlin-v1.0+json";

const TYPE_KEY: &str = "@type";
const VALUE_KEY: &str = "@value";

/// Wire format for requests and responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Serializer {
    /// GraphSON 3.0: every non-trivial value carries a `@type` wrapper.
    #[default]
    GraphSonV3,
    /// GraphSON 1.0: untyped JSON.
    GraphSonV1,
}

impl From<SerializerKind> for Serializer {
    fn from(kind: SerializerKind) -> Self {
        match kind {
            SerializerKind::GraphsonV3 => Self::GraphSonV3,
            SerializerKind::GraphsonV1 => Self::GraphSonV1,
        }
    }
}

impl Serializer {
    /// Returns the mime type announced in each request frame.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::GraphSonV3 => GRAPHSON_V3_MIME,
            Self::GraphSonV1 => GRAPHSON_V1_MIME,
        }
    }

    /// Encodes a request as `[mime length][mime][json]`.
    ///
    /// # Errors
    ///
    /// Returns `GremlinError::Serialization` if the request cannot be encoded.
    pub fn serialize_request(&self, request: &RequestMessage) -> Result<Vec<u8>, GremlinError> {
        let mut value = serde_json::to_value(request).map_err(|e| GremlinError::Serialization {
            reason: e.to_string(),
        })?;

        if *self == Self::GraphSonV3 {
            value["requestId"] = typed("g:UUID", Value::String(request.request_id.to_string()));
            if let Some(bindings) = value
                .get_mut("args")
                .and_then(|args| args.get_mut("bindings"))
            {
                *bindings = encode_graphson_v3_map(std::mem::take(bindings));
            }
        }

        let json = serde_json::to_vec(&value).map_err(|e| GremlinError::Serialization {
            reason: e.to_string(),
        })?;

        let mime = self.mime_type().as_bytes();
        let mime_len = u8::try_from(mime.len()).map_err(|_| GremlinError::Serialization {
            reason: format!("mime type '{}' is too long", self.mime_type()),
        })?;

        let mut frame = Vec::with_capacity(1 + mime.len() + json.len());
        frame.push(mime_len);
        frame.extend_from_slice(mime);
        frame.extend_from_slice(&json);
        Ok(frame)
    }

    /// Decodes a response frame into plain JSON.
    ///
    /// # Errors
    ///
    /// Returns `GremlinError::MalformedResponse` if the frame is not a
    /// Gremlin response.
    pub fn deserialize_response(&self, data: &[u8]) -> Result<ResponseMessage, GremlinError> {
        let raw: Value = serde_json::from_slice(data).map_err(|e| GremlinError::MalformedResponse {
            reason: format!("invalid JSON: {e}"),
        })?;

        let value = match self {
            Self::GraphSonV3 => decode_graphson_v3(raw),
            Self::GraphSonV1 => raw,
        };

        serde_json::from_value(value).map_err(|e| GremlinError::MalformedResponse {
            reason: e.to_string(),
        })
    }
}

fn typed(type_name: &str, value: Value) -> Value {
    json!({ TYPE_KEY: type_name, VALUE_KEY: value })
}

/// Encodes plain JSON as GraphSON 3.0.
///
/// Integers become `g:Int32` or `g:Int64` by range, other numbers `g:Double`,
/// arrays `g:List` and objects `g:Map`. Strings, booleans and null are
/// unchanged.
#[must_use]
pub fn encode_graphson_v3(value: Value) -> Value {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i32::try_from(i).is_ok() {
                    typed("g:Int32", Value::Number(n))
                } else {
                    typed("g:Int64", Value::Number(n))
                }
            } else {
                typed("g:Double", Value::Number(n))
            }
        }
        Value::Array(items) => typed(
            "g:List",
            Value::Array(items.into_iter().map(encode_graphson_v3).collect()),
        ),
        Value::Object(map) => typed("g:Map", flatten_map(map)),
        other => other,
    }
}

fn encode_graphson_v3_map(value: Value) -> Value {
    match value {
        Value::Object(map) => typed("g:Map", flatten_map(map)),
        other => encode_graphson_v3(other),
    }
}

fn flatten_map(map: Map<String, Value>) -> Value {
    let mut flat = Vec::with_capacity(map.len() * 2);
    for (key, value) in map {
        flat.push(Value::String(key));
        flat.push(encode_graphson_v3(value));
    }
    Value::Array(flat)
}

/// Decodes GraphSON 3.0 into plain JSON.
///
/// Collections become arrays, `g:Map` becomes an object keyed by the
/// stringified keys, scalar wrappers are unwrapped. Vertices and edges keep
/// their fields and gain a `type` of `vertex` or `edge`. Unknown types are
/// unwrapped to their decoded value.
#[must_use]
pub fn decode_graphson_v3(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(decode_graphson_v3).collect()),
        Value::Object(mut map) => {
            if map.len() == 2
                && let Some(Value::String(type_name)) = map.get(TYPE_KEY).cloned()
                && let Some(inner) = map.remove(VALUE_KEY)
            {
                decode_typed(&type_name, inner)
            } else {
                Value::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, decode_graphson_v3(v)))
                        .collect(),
                )
            }
        }
        other => other,
    }
}

fn decode_typed(type_name: &str, inner: Value) -> Value {
    match type_name {
        "g:List" | "g:Set" | "g:BulkSet" => match inner {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(decode_graphson_v3).collect())
            }
            other => decode_graphson_v3(other),
        },
        "g:Map" => match inner {
            Value::Array(items) => decode_flat_map(items),
            other => decode_graphson_v3(other),
        },
        "g:Vertex" => tag_element(decode_graphson_v3(inner), "vertex"),
        "g:Edge" => tag_element(decode_graphson_v3(inner), "edge"),
        _ => decode_graphson_v3(inner),
    }
}

fn decode_flat_map(items: Vec<Value>) -> Value {
    let mut map = Map::new();
    let mut iter = items.into_iter();
    while let Some(key) = iter.next() {
        let value = iter.next().map_or(Value::Null, decode_graphson_v3);
        let key = match decode_graphson_v3(key) {
            Value::String(s) => s,
            other => other.to_string(),
        };
        map.insert(key, value);
    }
    Value::Object(map)
}

fn tag_element(value: Value, element_type: &str) -> Value {
    match value {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::String(element_type.to_string()));
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_frame(frame: &[u8]) -> (&str, Value) {
        let len = usize::from(frame[0]);
        let mime = std::str::from_utf8(&frame[1..=len]).unwrap();
        let body = serde_json::from_slice(&frame[1 + len..]).unwrap();
        (mime, body)
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(
            Serializer::GraphSonV3.mime_type(),
            "application/vnd.gremlin-v3.0+json"
        );
        assert_eq!(
            Serializer::GraphSonV1.mime_type(),
            "application/vnd.gremlin-v1.0+json"
        );
        assert_eq!(Serializer::from(SerializerKind::GraphsonV1), Serializer::GraphSonV1);
    }

    #[test]
    fn test_v3_request_frame() {
        let request = RequestMessage::eval("g.V().count()");
        let frame = Serializer::GraphSonV3.serialize_request(&request).unwrap();
        let (mime, body) = split_frame(&frame);

        assert_eq!(frame[0], 33);
        assert_eq!(mime, "application/vnd.gremlin-v3.0+json");
        assert_eq!(body["requestId"]["@type"], "g:UUID");
        assert_eq!(body["requestId"]["@value"], request.request_id.to_string());
        assert_eq!(body["args"]["gremlin"], "g.V().count()");
    }

    #[test]
    fn test_v3_request_bindings() {
        let mut bindings = Map::new();
        bindings.insert("age".to_string(), json!(40));
        let request = RequestMessage::eval("g.V().has('age', gt(age))").with_bindings(bindings);

        let frame = Serializer::GraphSonV3.serialize_request(&request).unwrap();
        let (_, body) = split_frame(&frame);
        assert_eq!(
            body["args"]["bindings"],
            json!({"@type": "g:Map", "@value": ["age", {"@type": "g:Int32", "@value": 40}]})
        );
    }

    #[test]
    fn test_v1_request_frame() {
        let request = RequestMessage::eval("g.V()");
        let frame = Serializer::GraphSonV1.serialize_request(&request).unwrap();
        let (mime, body) = split_frame(&frame);

        assert_eq!(mime, "application/vnd.gremlin-v1.0+json");
        assert_eq!(body["requestId"], request.request_id.to_string());
    }

    #[test]
    fn test_encode_numbers() {
        assert_eq!(encode_graphson_v3(json!(7))["@type"], "g:Int32");
        assert_eq!(encode_graphson_v3(json!(10_000_000_000_i64))["@type"], "g:Int64");
        assert_eq!(encode_graphson_v3(json!(1.5))["@type"], "g:Double");
        assert_eq!(encode_graphson_v3(json!("x")), json!("x"));
    }

    #[test]
    fn test_decode_collections_and_scalars() {
        let decoded = decode_graphson_v3(json!({
            "@type": "g:List",
            "@value": [
                {"@type": "g:Int64", "@value": 6},
                {"@type": "g:Double", "@value": 1.5},
                {"@type": "g:Set", "@value": ["a", "b"]},
                {"@type": "g:UUID", "@value": "41d2e28a-20a4-4ab0-b379-d810dede3786"}
            ]
        }));
        assert_eq!(
            decoded,
            json!([6, 1.5, ["a", "b"], "41d2e28a-20a4-4ab0-b379-d810dede3786"])
        );
    }

    #[test]
    fn test_decode_map_with_typed_keys() {
        let decoded = decode_graphson_v3(json!({
            "@type": "g:Map",
            "@value": [
                {"@type": "g:T", "@value": "id"}, "thomas",
                {"@type": "g:T", "@value": "label"}, "person",
                {"@type": "g:Int32", "@value": 1}, "one"
            ]
        }));
        assert_eq!(decoded, json!({"id": "thomas", "label": "person", "1": "one"}));
    }

    #[test]
    fn test_decode_vertex() {
        let decoded = decode_graphson_v3(json!({
            "@type": "g:Vertex",
            "@value": {
                "id": "thomas",
                "label": "person",
                "properties": {
                    "age": [{
                        "@type": "g:VertexProperty",
                        "@value": {
                            "id": {"@type": "g:Int64", "@value": 12},
                            "value": {"@type": "g:Int32", "@value": 44},
                            "label": "age"
                        }
                    }]
                }
            }
        }));
        assert_eq!(decoded["type"], "vertex");
        assert_eq!(decoded["id"], "thomas");
        assert_eq!(decoded["properties"]["age"][0]["value"], 44);
        assert_eq!(decoded["properties"]["age"][0]["id"], 12);
    }

    #[test]
    fn test_decode_path() {
        let decoded = decode_graphson_v3(json!({
            "@type": "g:Path",
            "@value": {
                "labels": {"@type": "g:List", "@value": [{"@type": "g:Set", "@value": []}]},
                "objects": {"@type": "g:List", "@value": [
                    {"@type": "g:Vertex", "@value": {"id": "thomas", "label": "person"}}
                ]}
            }
        }));
        assert_eq!(decoded["labels"], json!([[]]));
        assert_eq!(decoded["objects"][0]["id"], "thomas");
    }

    #[test]
    fn test_plain_object_with_type_field_is_kept() {
        let value = json!({"@type": "custom", "@value": 1, "extra": true});
        assert_eq!(decode_graphson_v3(value.clone()), value);
    }

    #[test]
    fn test_deserialize_v3_response() {
        let frame = json!({
            "requestId": "41d2e28a-20a4-4ab0-b379-d810dede3786",
            "status": {
                "message": "",
                "code": 200,
                "attributes": {"@type": "g:Map", "@value": ["host", "/10.0.0.1:8182"]}
            },
            "result": {
                "data": {"@type": "g:List", "@value": [{"@type": "g:Int64", "@value": 4}]},
                "meta": {"@type": "g:Map", "@value": []}
            }
        });
        let response = Serializer::GraphSonV3
            .deserialize_response(frame.to_string().as_bytes())
            .unwrap();

        assert_eq!(response.status.code, 200);
        assert_eq!(response.status.attributes["host"], "/10.0.0.1:8182");
        assert_eq!(response.into_rows(), vec![json!(4)]);
    }

    #[test]
    fn test_deserialize_garbage() {
        let err = Serializer::GraphSonV3
            .deserialize_response(b"not json")
            .unwrap_err();
        assert!(matches!(err, GremlinError::MalformedResponse { .. }));

        let err = Serializer::GraphSonV1
            .deserialize_response(b"{\"status\": {}}")
            .unwrap_err();
        assert!(matches!(err, GremlinError::MalformedResponse { .. }));
    }
}
