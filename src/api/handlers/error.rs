//! Mapping of authentication failures onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::AuthError;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Response wrapper so handlers can `?` on [`AuthError`].
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

/// An unreadable request body is reported as a validation failure carrying
/// the extractor's reason (bad syntax, missing field, wrong content type).
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AuthError::Validation(rejection.body_text()))
    }
}

#[must_use]
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::BadCredentials
        | AuthError::MissingCredential
        | AuthError::UnsupportedCredential
        | AuthError::MalformedToken
        | AuthError::InvalidSignature
        | AuthError::Expired
        | AuthError::UnknownAccount => StatusCode::UNAUTHORIZED,
        AuthError::AccountLocked => StatusCode::FORBIDDEN,
        AuthError::AccountNotFound => StatusCode::NOT_FOUND,
        AuthError::UsernameTaken => StatusCode::CONFLICT,
        AuthError::Directory(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match &self.0 {
            AuthError::Directory(err) => {
                error!("User directory failure: {err:?}");
                "internal server error".to_string()
            }
            AuthError::Internal(detail) => {
                error!("Internal auth failure: {detail}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.0.kind().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
