//! Storage backends and the signed-URL machinery shared with the HTTP layer.

pub mod key_locks;
pub mod local_storage;
pub mod signature;
pub mod storage;
pub mod url_signer;

use crate::config::{AppConfig, Backend};
use local_storage::LocalStorage;
use signature::SigningKey;
use std::sync::Arc;
use storage::{Storage, StorageError, StorageResult};
use url_signer::UrlSigner;

/// Build the backend selected by `cfg`.
///
/// Only the local filesystem backend exists; `s3` and `oss` are accepted by the
/// configuration but refuse to start.
pub async fn open_storage(cfg: &AppConfig, key: SigningKey) -> StorageResult<Arc<dyn Storage>> {
    match cfg.backend {
        Backend::Local => {
            let signer = UrlSigner::new(key, cfg.signed_base_url.clone());
            let storage = LocalStorage::new(
                &cfg.public_dir,
                &cfg.private_dir,
                cfg.public_base_url.clone(),
                Arc::new(signer),
            )
            .await
            .map_err(StorageError::Write)?;
            Ok(Arc::new(storage))
        }
        other => Err(StorageError::Unsupported(other.to_string())),
    }
}
