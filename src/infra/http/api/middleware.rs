use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::auth::{AuthenticatedUser, TokenError};

use super::error::ApiError;
use super::state::ApiState;

/// Verifies the bearer token and stores the caller's identity in the
/// request extensions for handlers to extract.
pub async fn require_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_token(request.headers().get(axum::http::header::AUTHORIZATION)) {
        Some(value) => value,
        None => return ApiError::unauthorized("Bearer token required").into_response(),
    };

    let user_id = match state.tokens.verify(&token) {
        Ok(user_id) => user_id,
        Err(TokenError::Expired) => {
            return ApiError::unauthorized("Token expired").into_response();
        }
        Err(TokenError::InvalidSignature) => {
            return ApiError::unauthorized("Token signature mismatch").into_response();
        }
        Err(TokenError::Malformed) => {
            return ApiError::unauthorized("Malformed token").into_response();
        }
    };

    request.extensions_mut().insert(AuthenticatedUser { user_id });

    next.run(request).await
}

fn extract_token(header: Option<&axum::http::HeaderValue>) -> Option<String> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?;
    Some(bearer.to_string())
}

#[cfg(test)]
mod tests {
    use super::extract_token;
    use axum::http::HeaderValue;

    #[test]
    fn extract_token_requires_bearer_prefix() {
        let header = HeaderValue::from_static("Basic dXNlcjpwYXNz");
        assert_eq!(extract_token(Some(&header)), None);
    }

    #[test]
    fn extract_token_strips_the_prefix() {
        let header = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(extract_token(Some(&header)), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn extract_token_is_case_sensitive() {
        let header = HeaderValue::from_static("bearer abc.def.ghi");
        assert_eq!(extract_token(Some(&header)), None);
    }
}
