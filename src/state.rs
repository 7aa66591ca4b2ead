//! Shared state handed to every handler.

use crate::services::{signature::SignatureVerifier, storage::Storage};
use std::{sync::Arc, time::Duration};

/// Ttl for links issued without an explicit `ttl` query parameter.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct AppState {
    /// Backend holding the objects. Handlers only see the trait.
    pub storage: Arc<dyn Storage>,

    /// Checks links presented to the private route; keyed with the same
    /// secret as the backend's URL builder.
    pub verifier: SignatureVerifier,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, verifier: SignatureVerifier) -> Self {
        Self { storage, verifier }
    }
}
