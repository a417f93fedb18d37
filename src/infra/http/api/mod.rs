pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::extract::State;
use axum::response::Response;
use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::infra::http::db_health_response;
use crate::infra::http::middleware::log_responses;

pub fn build_api_router(state: ApiState) -> Router {
    let auth_state = state.clone();

    // Only the todo routes sit behind the bearer-token gate; the gate
    // runs for matched routes, so unknown paths still fall through to 404.
    let todos = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            middleware::require_auth,
        ));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/healthz", get(healthz))
        .merge(todos)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
}

async fn healthz(State(state): State<ApiState>) -> Response {
    db_health_response(state.db.health_check().await)
}
