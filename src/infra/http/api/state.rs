use std::sync::Arc;

use crate::application::auth::{AuthService, TokenService};
use crate::application::todos::TodoService;
use crate::infra::db::PostgresRepositories;

/// Shared state handed to every API handler.
///
/// All collaborators are injected at startup; handlers never reach for
/// globals.
#[derive(Clone)]
pub struct ApiState {
    pub auth: Arc<AuthService>,
    pub todos: Arc<TodoService>,
    pub tokens: Arc<TokenService>,
    pub db: Arc<PostgresRepositories>,
}

impl ApiState {
    pub fn new(
        auth: Arc<AuthService>,
        todos: Arc<TodoService>,
        tokens: Arc<TokenService>,
        db: Arc<PostgresRepositories>,
    ) -> Self {
        Self {
            auth,
            todos,
            tokens,
            db,
        }
    }
}
