//! HTTP request descriptor used as signing input.

use neptune_core::error::SigningError;
use url::Url;

/// A request to be signed.
///
/// Only what SigV4 looks at is kept: method, URL, headers and payload.
/// Nothing is ever sent with this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    url: Url,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a request descriptor.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::InvalidUrl` if the URL does not parse and
    /// `SigningError::MissingHost` if it has no host.
    pub fn new(method: impl Into<String>, url: &str) -> Result<Self, SigningError> {
        let parsed = Url::parse(url).map_err(|e| SigningError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(SigningError::MissingHost {
                url: url.to_string(),
            });
        }

        Ok(Self {
            method: method.into().to_uppercase(),
            url: parsed,
            headers: Vec::new(),
            body: Vec::new(),
        })
    }

    /// Creates a `GET` request descriptor.
    ///
    /// # Errors
    ///
    /// See [`HttpRequest::new`].
    pub fn get(url: &str) -> Result<Self, SigningError> {
        Self::new("GET", url)
    }

    /// Adds a header. Repeated names are kept and joined when signing.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a header, replacing any existing value under the same name.
    #[must_use]
    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Returns the last value of a header (any case).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets the payload.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the upper-cased method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the parsed URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.body
    }

    /// Returns whether a header with this name (any case) is present.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Returns the value for the `host` header: the URL host, plus the port
    /// when it is not the scheme default.
    #[must_use]
    pub fn host_header(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}
