//! Signed-URL builder handed to the storage backend by the HTTP layer.

use crate::{
    models::{BaseUrl, ObjectKey},
    services::{
        signature::{EXPIRE_AT_PARAM, SIGNATURE_PARAM, SignedUrlRequest, SigningKey},
        storage::{SignedUrlBuilder, SignerError},
    },
};
use chrono::Utc;
use std::{path::Path, time::Duration};
use tracing::debug;
use url::Position;

/// Issues links of the form `{base}/{key}?expireAt=<secs>&signature=<sig>`.
///
/// `base` is the endpoint the private route is mounted on, e.g.
/// `http://localhost:3000/private`. Only the path and query take part in the
/// signature, since that is all the verifying server sees in the request line.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    key: SigningKey,
    base: BaseUrl,
}

impl UrlSigner {
    pub fn new(key: SigningKey, base: BaseUrl) -> Self {
        Self { key, base }
    }

    /// Sign `key` for `ttl` as if the current time were `now` (unix seconds).
    pub fn sign_at(
        &self,
        key: &ObjectKey,
        ttl: Duration,
        now: u64,
    ) -> Result<String, SignerError> {
        // Sub-second remainders round up so a non-zero ttl never yields a link
        // that expires at the moment it is issued.
        let expire_at = ttl
            .as_secs()
            .checked_add(u64::from(ttl.subsec_nanos() > 0))
            .and_then(|ttl_secs| now.checked_add(ttl_secs))
            .ok_or(SignerError::TtlOutOfRange)?;

        let mut url = self.base.join_key(key);
        url.query_pairs_mut()
            .append_pair(EXPIRE_AT_PARAM, &expire_at.to_string());
        let signature = SignedUrlRequest {
            expire_at,
            request_uri: &url[Position::BeforePath..],
        }
        .sign(&self.key);
        url.query_pairs_mut().append_pair(SIGNATURE_PARAM, &signature);

        Ok(url.into())
    }
}

impl SignedUrlBuilder for UrlSigner {
    fn build(
        &self,
        absolute_path: &Path,
        key: &ObjectKey,
        ttl: Duration,
    ) -> Result<String, SignerError> {
        if ttl.is_zero() {
            return Err(SignerError::Failed("ttl must be positive".into()));
        }
        let now = u64::try_from(Utc::now().timestamp())
            .map_err(|_| SignerError::Failed("system clock is before the unix epoch".into()))?;
        debug!(
            "signing {} (file {}) for {}s",
            key,
            absolute_path.display(),
            ttl.as_secs()
        );
        self.sign_at(key, ttl, now)
    }
}
