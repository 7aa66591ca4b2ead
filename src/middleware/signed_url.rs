use crate::{errors::AppError, state::AppState};
use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::Response,
};

/// Middleware that admits a request only if it carries a valid, unexpired
/// signed link.
///
/// The full request line is checked as received, so the URI is taken from
/// `OriginalUri` when the route is mounted under a nested router.
pub async fn require_signed_url(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let uri = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(original)) => original.clone(),
        None => request.uri().clone(),
    };
    state.verifier.verify(uri.path(), uri.query())?;

    Ok(next.run(request).await)
}
