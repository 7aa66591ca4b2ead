//! HMAC-SHA512 signatures for expiring links to private objects.
//!
//! The signed payload is the compact JSON document
//! `{"expireAt":"<unix secs>","requestURI":"<path?query>"}` with keys in sorted
//! order, where the request URI never includes the `signature` parameter. The
//! digest travels base64url-encoded without padding in the `signature` query
//! parameter.
//!
//! Verification walks a fixed sequence and stops at the first failure:
//! parse (`Malformed`), expiry (`Expired`), recompute, constant-time compare
//! (`SignatureMismatch`).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::{fmt, time::Duration};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha512 = Hmac<Sha512>;

pub const EXPIRE_AT_PARAM: &str = "expireAt";
pub const SIGNATURE_PARAM: &str = "signature";

#[derive(Debug, Error)]
#[error("signing secret must not be empty")]
pub struct InvalidSecret;

/// Shared HMAC secret, held as a keyed MAC ready to be cloned per signature.
/// `Debug` never prints it.
#[derive(Clone)]
pub struct SigningKey(HmacSha512);

impl SigningKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, InvalidSecret> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(InvalidSecret);
        }
        HmacSha512::new_from_slice(secret)
            .map(Self)
            .map_err(|_| InvalidSecret)
    }

    fn mac(&self) -> HmacSha512 {
        self.0.clone()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// The value that gets signed. Exists only while a signature is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlRequest<'a> {
    pub expire_at: u64,
    pub request_uri: &'a str,
}

impl SignedUrlRequest<'_> {
    /// Canonical JSON encoding shared by generator and verifier.
    pub fn canonical_json(&self) -> String {
        // serde_json's default map is a BTreeMap, so keys come out sorted and
        // `Display` emits no whitespace.
        serde_json::json!({
            "expireAt": self.expire_at.to_string(),
            "requestURI": self.request_uri,
        })
        .to_string()
    }

    fn digest(&self, key: &SigningKey) -> Vec<u8> {
        let mut mac = key.mac();
        mac.update(self.canonical_json().as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// `base64url(HMAC-SHA512(secret, canonical_json))`, unpadded.
    pub fn sign(&self, key: &SigningKey) -> String {
        URL_SAFE_NO_PAD.encode(self.digest(key))
    }
}

/// Why a signed link was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed signed url: {0}")]
    Malformed(&'static str),
    #[error("signed url has expired")]
    Expired,
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Checks signed links presented to the private route.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: SigningKey,
    leeway_secs: u64,
}

impl SignatureVerifier {
    /// `leeway` is added to `expireAt` before the expiry comparison to absorb
    /// clock skew between the issuing and the verifying host.
    pub fn new(key: SigningKey, leeway: Duration) -> Self {
        Self {
            key,
            leeway_secs: leeway.as_secs(),
        }
    }

    /// Verify `path` and raw `query` (as received, percent-encoding intact)
    /// against the current wall clock.
    pub fn verify(&self, path: &str, query: Option<&str>) -> Result<(), VerifyError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        self.verify_at(path, query, now)
    }

    pub fn verify_at(
        &self,
        path: &str,
        query: Option<&str>,
        now: u64,
    ) -> Result<(), VerifyError> {
        let parsed = ParsedQuery::parse(query.unwrap_or(""))?;

        if now > parsed.expire_at.saturating_add(self.leeway_secs) {
            return Err(VerifyError::Expired);
        }

        let request_uri = if parsed.unsigned.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, parsed.unsigned.join("&"))
        };
        let expected = SignedUrlRequest {
            expire_at: parsed.expire_at,
            request_uri: &request_uri,
        }
        .digest(&self.key);

        let provided = URL_SAFE_NO_PAD
            .decode(parsed.signature)
            .map_err(|_| VerifyError::SignatureMismatch)?;

        if bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            Ok(())
        } else {
            Err(VerifyError::SignatureMismatch)
        }
    }
}

/// Query string split into the signature and everything that was signed.
struct ParsedQuery<'a> {
    expire_at: u64,
    signature: &'a str,
    /// Every pair except `signature`, in received order.
    unsigned: Vec<&'a str>,
}

impl<'a> ParsedQuery<'a> {
    fn parse(query: &'a str) -> Result<Self, VerifyError> {
        let mut expire_at = None;
        let mut signature = None;
        let mut unsigned = Vec::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            match name {
                SIGNATURE_PARAM => {
                    if signature.replace(value).is_some() {
                        return Err(VerifyError::Malformed("repeated signature"));
                    }
                    continue;
                }
                EXPIRE_AT_PARAM => {
                    if expire_at.is_some() {
                        return Err(VerifyError::Malformed("repeated expireAt"));
                    }
                    let parsed = value
                        .parse::<u64>()
                        .map_err(|_| VerifyError::Malformed("expireAt is not a number"))?;
                    expire_at = Some(parsed);
                }
                _ => {}
            }
            unsigned.push(pair);
        }

        Ok(Self {
            expire_at: expire_at.ok_or(VerifyError::Malformed("missing expireAt"))?,
            signature: signature.ok_or(VerifyError::Malformed("missing signature"))?,
            unsigned,
        })
    }
}
