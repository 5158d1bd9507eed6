use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::error::{ApiError, ErrorBody};
use crate::auth::{session::SignUp, AuthState};

#[utoipa::path(
    post,
    path = "/sign-up",
    request_body = SignUp,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "Username already exists", body = ErrorBody)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn sign_up(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<SignUp>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    auth_state.sessions().sign_up(&request).await?;

    Ok(StatusCode::CREATED)
}
