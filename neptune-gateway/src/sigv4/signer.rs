//! SigV4 signer.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use neptune_core::error::SigningError;
use neptune_core::types::Credentials;
use sha2::Sha256;
use tracing::debug;

use super::canonical::{canonical_headers, canonical_request, sha256_hex, string_to_sign};
use super::request::HttpRequest;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const DATE_FORMAT: &str = "%Y%m%d";
const TERMINATOR: &str = "aws4_request";

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| SigningError::InvalidKey {
        reason: format!("Failed to create HMAC: {e}"),
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derives the SigV4 signing key for one day, region and service.
///
/// # Errors
///
/// Returns `SigningError::InvalidKey` if the HMAC cannot be keyed.
pub fn derive_signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, TERMINATOR.as_bytes())
}

/// Headers produced by signing, ready to be replayed on another request.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of the signed `host` header.
    pub host: String,
    /// Value of `x-amz-date`.
    pub amz_date: String,
    /// Value of `Authorization`.
    pub authorization: String,
    /// Value of `x-amz-security-token`, for temporary credentials.
    pub security_token: Option<String>,
}

impl SignedHeaders {
    /// Returns the headers as `(name, value)` pairs in a fixed order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("host", self.host.as_str()),
            ("x-amz-date", self.amz_date.as_str()),
            ("Authorization", self.authorization.as_str()),
        ];
        if let Some(token) = &self.security_token {
            pairs.push(("x-amz-security-token", token.as_str()));
        }
        pairs
    }

    /// Returns the `Signature=` component of the authorization header.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.authorization
            .rsplit_once("Signature=")
            .map(|(_, signature)| signature)
    }
}

impl fmt::Debug for SignedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedHeaders")
            .field("host", &self.host)
            .field("amz_date", &self.amz_date)
            .field("authorization", &"****")
            .field("security_token", &self.security_token.as_ref().map(|_| "****"))
            .finish()
    }
}

/// Signs request descriptors with one set of credentials.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    /// Creates a new request signer.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Returns the signing credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Signs `request` for `service` in `region` at the current time.
    ///
    /// # Errors
    ///
    /// Returns `SigningError` if the signing key cannot be derived.
    pub fn sign(
        &self,
        request: &HttpRequest,
        service: &str,
        region: &str,
    ) -> Result<SignedHeaders, SigningError> {
        self.sign_at(request, service, region, Utc::now())
    }

    /// Signs `request` for `service` in `region` at `time`.
    ///
    /// `host` is added from the URL unless the descriptor already carries one.
    /// `x-amz-date` is always set from `time`.
    ///
    /// # Errors
    ///
    /// Returns `SigningError` if the signing key cannot be derived.
    pub fn sign_at(
        &self,
        request: &HttpRequest,
        service: &str,
        region: &str,
        time: DateTime<Utc>,
    ) -> Result<SignedHeaders, SigningError> {
        let amz_date = time.format(AMZ_DATE_FORMAT).to_string();
        let date = time.format(DATE_FORMAT).to_string();

        let mut signable = request.clone();
        if !signable.has_header("host") {
            let host = signable.host_header();
            signable = signable.header("host", host);
        }
        signable = signable.set_header("x-amz-date", amz_date.clone());
        if let Some(token) = self.credentials.session_token() {
            signable = signable.set_header("x-amz-security-token", token);
        }

        let host = signable.header_value("host").unwrap_or_default().to_string();
        let payload_hash = sha256_hex(signable.payload());
        let canonical = canonical_request(&signable, &payload_hash);
        let (_, signed_header_names) = canonical_headers(signable.headers());

        let scope = format!("{date}/{region}/{service}/{TERMINATOR}");
        let to_sign = string_to_sign(&amz_date, &scope, &canonical);
        let key = derive_signing_key(
            self.credentials.secret_access_key(),
            &date,
            region,
            service,
        )?;
        let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes())?);

        debug!(
            scope = %scope,
            signed_headers = %signed_header_names,
            "Request signed"
        );

        Ok(SignedHeaders {
            host,
            amz_date,
            authorization: format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_header_names}, Signature={signature}",
                self.credentials.access_key_id()
            ),
            security_token: self.credentials.session_token().map(str::to_string),
        })
    }
}
