//! Canonical request construction.

use std::collections::BTreeMap;
use std::fmt::Write;

use sha2::{Digest, Sha256};
use url::form_urlencoded;

use super::request::HttpRequest;
use super::signer::ALGORITHM;

/// SHA-256 of the empty payload, hex encoded.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Returns the lower-case hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
///
/// `/` is left alone unless `encode_slash` is set.
#[must_use]
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            b'/' if !encode_slash => out.push('/'),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Canonical URI: the path with every segment URI-encoded, `/` when empty.
#[must_use]
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        uri_encode(path, false)
    }
}

/// Canonical query string: encoded pairs sorted by name, then value.
#[must_use]
pub fn canonical_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(name, value)| (uri_encode(&name, true), uri_encode(&value, true)))
        .collect();
    pairs.sort();

    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical header block and the `;`-joined signed header list.
///
/// Every line of the block, including the last, ends in `\n`.
#[must_use]
pub fn canonical_headers(headers: &[(String, String)]) -> (String, String) {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        grouped
            .entry(name.trim().to_lowercase())
            .or_default()
            .push(value.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    let mut block = String::new();
    for (name, values) in &grouped {
        let _ = writeln!(block, "{name}:{}", values.join(","));
    }
    let signed = grouped.keys().cloned().collect::<Vec<_>>().join(";");

    (block, signed)
}

/// Builds the canonical request for `request` with the given payload hash.
#[must_use]
pub fn canonical_request(request: &HttpRequest, payload_hash: &str) -> String {
    let url = request.url();
    let (headers, signed_headers) = canonical_headers(request.headers());
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method(),
        canonical_uri(url.path()),
        canonical_query(url.query().unwrap_or_default()),
        headers,
        signed_headers,
        payload_hash
    )
}

/// Builds the string to sign.
#[must_use]
pub fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_empty_payload_hash() {
        assert_eq!(sha256_hex(b""), EMPTY_PAYLOAD_SHA256);
    }

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("abc-_.~XYZ019", true), "abc-_.~XYZ019");
        assert_eq!(uri_encode("a b/c", false), "a%20b/c");
        assert_eq!(uri_encode("a b/c", true), "a%20b%2Fc");
        assert_eq!(uri_encode("é", true), "%C3%A9");
    }

    #[test]
    fn test_canonical_uri() {
        assert_eq!(canonical_uri(""), "/");
        assert_eq!(canonical_uri("/"), "/");
        assert_eq!(canonical_uri("/gremlin"), "/gremlin");
        assert_eq!(canonical_uri("/a%20b"), "/a%2520b");
    }

    #[test]
    fn test_canonical_query() {
        assert_eq!(canonical_query(""), "");
        assert_eq!(canonical_query("b=2&a=1"), "a=1&b=2");
        assert_eq!(canonical_query("a=2&a=1"), "a=1&a=2");
        assert_eq!(canonical_query("flag"), "flag=");
        assert_eq!(canonical_query("q=a%20b"), "q=a%20b");
    }

    #[test]
    fn test_canonical_headers() {
        let (block, signed) = canonical_headers(&[
            h("X-Amz-Date", "20150830T123600Z"),
            h("Host", "example.amazonaws.com"),
            h("My-Header", "  a   b  "),
            h("my-header", "c"),
        ]);
        assert_eq!(
            block,
            "host:example.amazonaws.com\nmy-header:a b,c\nx-amz-date:20150830T123600Z\n"
        );
        assert_eq!(signed, "host;my-header;x-amz-date");
    }

    #[test]
    fn test_canonical_request_get_vanilla() {
        let request = HttpRequest::get("https://example.amazonaws.com/")
            .unwrap()
            .header("Host", "example.amazonaws.com")
            .header("X-Amz-Date", "20150830T123600Z");

        let canonical = canonical_request(&request, EMPTY_PAYLOAD_SHA256);
        assert_eq!(
            canonical,
            "GET\n/\n\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\nhost;x-amz-date\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(canonical.as_bytes()),
            "bb579772317eb040ac9ed261061d46c1f17a8133879d6129b6e1c25292927e63"
        );
    }

    #[test]
    fn test_string_to_sign() {
        let sts = string_to_sign(
            "20150830T123600Z",
            "20150830/us-east-1/service/aws4_request",
            "GET\n/\n\nhost:example.amazonaws.com\nx-amz-date:20150830T123600Z\n\nhost;x-amz-date\n\
             e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        );
        assert_eq!(
            sts,
            "AWS4-HMAC-SHA256\n20150830T123600Z\n20150830/us-east-1/service/aws4_request\n\
             bb579772317eb040ac9ed261061d46c1f17a8133879d6129b6e1c25292927e63"
        );
    }
}
