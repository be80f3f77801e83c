use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;

/// ApiError
///
/// The error taxonomy of the HTTP surface. Every handler failure collapses into
/// one of these variants; dependency errors (database, identity provider) are
/// logged where they are converted and surface to the client only as the generic
/// `Internal` variant, so no internal detail leaks into responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No resolvable caller identity on a route that requires one.
    #[error("Unauthorized")]
    Unauthorized,
    /// The caller is authenticated but does not own the referenced resource.
    #[error("Forbidden")]
    Forbidden,
    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A required path identifier was missing or empty.
    #[error("Missing ID")]
    MissingId,
    /// Unexpected dependency failure. Details live in the logs, not the response.
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MissingId => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {err:?}");
        ApiError::Internal
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        tracing::error!("identity provider error: {err}");
        ApiError::Internal
    }
}
