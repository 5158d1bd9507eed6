use axum::{extract::Extension, http::HeaderMap, response::Json};
use std::sync::Arc;
use tracing::instrument;

use super::error::{ApiError, ErrorBody};
use crate::auth::{require_auth, AuthState, Principal};

#[utoipa::path(
    get,
    path = "/me",
    params(
        ("Authorization" = String, Header, description = "Identity token")
    ),
    responses(
        (status = 200, description = "Authenticated principal", body = Principal),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Account locked", body = ErrorBody)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn me(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<Principal>, ApiError> {
    let principal = require_auth(&headers, &auth_state).await?;
    Ok(Json(principal))
}
