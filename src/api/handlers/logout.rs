use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::error::{ApiError, ErrorBody};
use crate::auth::{require_auth, AuthState};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/logout",
    params(
        ("Authorization" = String, Header, description = "Identity token")
    ),
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Account locked", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn logout_get(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    logout(&headers, &auth_state).await
}

#[utoipa::path(
    post,
    path = "/logout",
    params(
        ("Authorization" = String, Header, description = "Identity token")
    ),
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Account locked", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn logout_post(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    logout(&headers, &auth_state).await
}

#[instrument(skip_all)]
async fn logout(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<(StatusCode, Json<LogoutResponse>), ApiError> {
    let principal = require_auth(headers, auth_state).await?;
    auth_state.sessions().logout(principal);

    Ok((
        StatusCode::OK,
        Json(LogoutResponse {
            message: "logged out".to_string(),
        }),
    ))
}
