use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{
        header::{ACCESS_CONTROL_EXPOSE_HEADERS, AUTHORIZATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::instrument;

use super::error::{ApiError, ErrorBody};
use crate::auth::{
    session::{Credentials, PublicProfile},
    AuthError, AuthState,
};

#[utoipa::path(
    post,
    path = "/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Logged in; token in the Authorization header", body = PublicProfile,
            headers(("Authorization" = String, description = "Identity token"))),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Incorrect password", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(credentials) = payload?;
    credentials.validate()?;

    let outcome = auth_state.sessions().login(&credentials).await?;

    let token = HeaderValue::from_str(&outcome.token)
        .map_err(|err| AuthError::Internal(format!("token is not a valid header value: {err}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, token);
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Authorization"),
    );

    Ok((StatusCode::OK, headers, Json(outcome.profile)))
}
