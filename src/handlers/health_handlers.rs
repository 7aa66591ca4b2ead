//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that round-trips a probe object through storage

use crate::{
    models::{ObjectKey, Visibility},
    services::storage::StorageError,
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use futures::{StreamExt, stream};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

const PROBE_CONTENT: &[u8] = b"readyz";

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Writes, reads back and deletes a probe object under each visibility.
/// HTTP 200 when every check passes, HTTP 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = HashMap::new();
    for visibility in Visibility::ALL {
        let error = probe(&state, visibility).await.err();
        checks.insert(
            visibility.as_str(),
            CheckStatus {
                ok: error.is_none(),
                error,
            },
        );
    }

    let overall_ok = checks.values().all(|check| check.ok);
    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

async fn probe(state: &AppState, visibility: Visibility) -> Result<(), String> {
    let key = ObjectKey::parse(format!(".readyz-{}", Uuid::new_v4()))
        .map_err(|e| e.to_string())?;
    let data = stream::iter([Ok(Bytes::from_static(PROBE_CONTENT))]).boxed();
    state
        .storage
        .put(&key, data, visibility)
        .await
        .map_err(|e| format!("could not write probe: {}", e))?;

    let read = async {
        let mut stream = state.storage.get(&key).await?;
        let mut content = Vec::new();
        while let Some(chunk) = stream.next().await {
            content.extend_from_slice(&chunk.map_err(StorageError::Read)?);
        }
        Ok::<_, StorageError>(content)
    }
    .await;

    // best-effort cleanup before reporting
    let cleanup = state.storage.delete(&key).await;

    match read {
        Ok(content) if content == PROBE_CONTENT => {}
        Ok(_) => return Err("probe content mismatch".into()),
        Err(e) => return Err(format!("could not read probe: {}", e)),
    }
    cleanup.map_err(|e| format!("could not remove probe: {}", e))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
