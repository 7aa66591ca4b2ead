//! Defines routes for object storage and signed-link access.
//!
//! ## Structure
//! - **Management endpoints**
//!   - `PUT    /objects/{*key}?visibility=` — upload object (private by default)
//!   - `DELETE /objects/{*key}` — delete object
//!   - `GET    /urls/{*key}?ttl=` — permanent or signed URL for an object
//!
//! - **File endpoints**
//!   - `GET    /public/{*key}` — download a public object
//!   - `GET    /private/{*key}?expireAt=&signature=` — download a private object,
//!     guarded by `require_signed_url`
//!
//! The wildcard `*key` allows nested keys like `photos/2025/img.jpg`.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        object_handlers::{
            delete_object, get_private_object, get_public_object, object_url, upload_object,
        },
    },
    middleware::require_signed_url,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, put},
};

/// Build the application router.
///
/// The signature check is a route layer on the private route only, so
/// unmatched paths still answer 404 rather than a signature error.
pub fn routes(state: AppState) -> Router {
    let private = Router::new()
        .route("/private/{*key}", get(get_private_object))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_signed_url,
        ));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/objects/{*key}", put(upload_object).delete(delete_object))
        .route("/urls/{*key}", get(object_url))
        .route("/public/{*key}", get(get_public_object))
        .merge(private)
        .with_state(state)
}
