//! Todo CRUD handlers
//!
//! Every handler takes the authenticated caller from the request
//! extensions and passes the owner id down to the service, so reads and
//! writes can never cross account boundaries.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::auth::AuthenticatedUser;

use super::todo_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_todos(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let todos = state
        .todos
        .list(principal.user_id)
        .await
        .map_err(todo_to_api)?;

    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Json(payload): Json<TodoCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state
        .todos
        .create(principal.user_id, &payload.task, payload.completed)
        .await
        .map_err(todo_to_api)?;

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_todo_id(&id)?;
    let todo = state
        .todos
        .get(principal.user_id, id)
        .await
        .map_err(todo_to_api)?;

    Ok(Json(todo))
}

pub async fn update_todo(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(payload): Json<TodoUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_todo_id(&id)?;
    let todo = state
        .todos
        .update(principal.user_id, id, &payload.task, payload.completed)
        .await
        .map_err(todo_to_api)?;

    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<ApiState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_todo_id(&id)?;
    state
        .todos
        .delete(principal.user_id, id)
        .await
        .map_err(todo_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_todo_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("Invalid Todo ID", None))
}

#[cfg(test)]
mod tests {
    use super::parse_todo_id;

    #[test]
    fn numeric_ids_parse() {
        assert_eq!(parse_todo_id("42").ok(), Some(42));
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert!(parse_todo_id("abc").is_err());
        assert!(parse_todo_id("4.2").is_err());
        assert!(parse_todo_id("").is_err());
    }
}
