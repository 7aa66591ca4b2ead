//! HTTP handlers for object operations.
//! Streams object bodies in both directions and delegates storage concerns to
//! the `Storage` held in `AppState`.

use crate::{
    errors::AppError,
    models::{ObjectKey, Visibility},
    services::storage::StorageError,
    state::{AppState, DEFAULT_LINK_TTL},
};
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::{io, time::Duration};

/// Query params accepted by `PUT /objects/{*key}`.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub visibility: Option<Visibility>,
}

/// Query params accepted by `GET /urls/{*key}`.
#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    /// Link lifetime in seconds; private objects only.
    pub ttl: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ObjectResponse {
    pub key: ObjectKey,
    pub visibility: Visibility,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub key: ObjectKey,
    pub visibility: Visibility,
    pub url: String,
    /// Seconds until a temporary link expires; absent for permanent URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// Upload an object to `/objects/{*key}`. Objects are private unless
/// `?visibility=public` is given.
pub async fn upload_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(q): Query<UploadQuery>,
    body: Body,
) -> Result<Json<ObjectResponse>, AppError> {
    let key = ObjectKey::parse(key)?;
    let visibility = q.visibility.unwrap_or(Visibility::Private);

    let stream = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(io::Error::other))
        .boxed();
    state.storage.put(&key, stream, visibility).await?;

    Ok(Json(ObjectResponse { key, visibility }))
}

/// DELETE `/objects/{*key}` from whichever root holds it.
pub async fn delete_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = ObjectKey::parse(key)?;
    state.storage.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/urls/{*key}` — permanent URL for public objects, a signed link for
/// private ones.
pub async fn object_url(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(q): Query<UrlQuery>,
) -> Result<Json<UrlResponse>, AppError> {
    let key = ObjectKey::parse(key)?;
    let visibility = state.storage.visibility(&key).await?;

    let (url, expires_in) = match visibility {
        Visibility::PublicRead => (state.storage.url(&key).await?, None),
        Visibility::Private => {
            let ttl = q.ttl.map(Duration::from_secs).unwrap_or(DEFAULT_LINK_TTL);
            let url = state.storage.temporary_url(&key, ttl).await?;
            (url, Some(ttl.as_secs()))
        }
    };

    Ok(Json(UrlResponse {
        key,
        visibility,
        url,
        expires_in,
    }))
}

/// GET `/public/{*key}` — download a public object.
pub async fn get_public_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    serve_object(&state, key, Visibility::PublicRead).await
}

/// GET `/private/{*key}` — download a private object. Only reachable through
/// the signed-link middleware.
pub async fn get_private_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    serve_object(&state, key, Visibility::Private).await
}

/// Stream the object if it is held under `visibility`; anything else looks
/// exactly like a missing object.
async fn serve_object(
    state: &AppState,
    raw_key: String,
    visibility: Visibility,
) -> Result<Response, AppError> {
    let key = ObjectKey::parse(raw_key)?;
    let not_found = || AppError::not_found(format!("object `{}` not found", key));

    match state.storage.visibility(&key).await {
        Ok(found) if found == visibility => {}
        Ok(_) | Err(StorageError::NotFound(_)) => return Err(not_found()),
        Err(err) => return Err(err.into()),
    }
    let stream = match state.storage.get(&key).await {
        Ok(stream) => stream,
        Err(StorageError::NotFound(_)) => return Err(not_found()),
        Err(err) => return Err(err.into()),
    };

    let mut response = Body::from_stream(stream).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    let disposition = format!("inline; filename=\"{}\"", key.file_name().escape_default());
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if visibility == Visibility::Private {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    }
    Ok(response)
}
