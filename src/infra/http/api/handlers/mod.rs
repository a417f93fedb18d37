//! API handlers organized by resource type.
//!
//! Each submodule contains handlers for a specific resource (auth, todos).
//! Helper functions for error conversion are defined here and shared across modules.

mod auth;
mod todos;

// Re-export all handlers for external use
pub use auth::*;
pub use todos::*;

// ----- Shared error conversions -----

use axum::http::StatusCode;

use crate::application::auth::AuthError;
use crate::application::repos::RepoError;
use crate::application::todos::TodoError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::GATEWAY_TIMEOUT,
            codes::TIMEOUT,
            "Request timed out",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn auth_to_api(err: AuthError) -> ApiError {
    match err {
        AuthError::MissingCredentials => {
            ApiError::bad_request("Username and password are mandatory", None)
        }
        AuthError::UsernameTaken => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Username already taken",
            None,
        ),
        AuthError::InvalidCredentials => ApiError::unauthorized("Invalid username or password"),
        AuthError::Hash(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "Failed to hash password",
            Some(message),
        ),
        AuthError::Token(inner) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "Failed to issue token",
            Some(inner.to_string()),
        ),
        AuthError::Timeout => ApiError::new(
            StatusCode::GATEWAY_TIMEOUT,
            codes::TIMEOUT,
            "Request timed out",
            None,
        ),
        AuthError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn todo_to_api(err: TodoError) -> ApiError {
    match err {
        TodoError::EmptyTask => ApiError::bad_request("The 'task' field is required", None),
        TodoError::NotFound => ApiError::not_found("Todo not found"),
        TodoError::Timeout => ApiError::new(
            StatusCode::GATEWAY_TIMEOUT,
            codes::TIMEOUT,
            "Request timed out",
            None,
        ),
        TodoError::Repo(repo) => repo_to_api(repo),
    }
}
