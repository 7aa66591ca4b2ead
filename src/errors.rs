use crate::{
    models::InvalidKey,
    services::{signature::VerifyError, storage::StorageError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<InvalidKey> for AppError {
    fn from(err: InvalidKey) -> Self {
        AppError::bad_request(format!("invalid object key: {}", err))
    }
}

/// I/O and signer failures are logged in full but answered generically, so
/// filesystem paths never reach the client.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(inner) => inner.into(),
            StorageError::NotFound(key) => {
                AppError::not_found(format!("object `{}` not found", key))
            }
            StorageError::NotApplicable { .. } => {
                AppError::new(StatusCode::CONFLICT, err.to_string())
            }
            StorageError::InvalidArgument(_) => AppError::bad_request(err.to_string()),
            StorageError::Unsupported(_) => {
                AppError::new(StatusCode::NOT_IMPLEMENTED, err.to_string())
            }
            StorageError::Write(_) | StorageError::Read(_) | StorageError::Signer(_) => {
                error!("storage failure: {}", err);
                AppError::internal("storage failure")
            }
        }
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        warn!("rejected signed url: {}", err);
        let status = match err {
            VerifyError::Malformed(_) => StatusCode::BAD_REQUEST,
            VerifyError::Expired => StatusCode::GONE,
            VerifyError::SignatureMismatch => StatusCode::FORBIDDEN,
        };
        AppError::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn verification_failures_map_to_statuses() {
        assert_eq!(
            AppError::from(VerifyError::Malformed("missing expireAt")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::from(VerifyError::Expired).status, StatusCode::GONE);
        assert_eq!(
            AppError::from(VerifyError::SignatureMismatch).status,
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn io_failures_do_not_leak_paths() {
        let err = StorageError::Read(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "/srv/private/secret.txt: permission denied",
        ));
        let app = AppError::from(err);
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!app.message.contains("/srv"));
    }

    #[test]
    fn storage_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(StorageError::NotFound("a".into())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StorageError::InvalidKey(InvalidKey::BadSegment)).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StorageError::InvalidArgument("ttl".into())).status,
            StatusCode::BAD_REQUEST
        );
    }
}
