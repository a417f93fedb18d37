//! Registration and login handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::auth_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth
        .register(&payload.username, &payload.password)
        .await
        .map_err(auth_to_api)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { id: user.id })))
}

pub async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .auth
        .login(&payload.username, &payload.password)
        .await
        .map_err(auth_to_api)?;

    Ok(Json(TokenResponse { token }))
}
