//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{TodoRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct CreateTodoParams {
    pub owner_id: i64,
    pub task: String,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateTodoParams {
    pub owner_id: i64,
    pub id: i64,
    pub task: String,
    pub completed: bool,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
pub trait TodosRepo: Send + Sync {
    /// Every accessor takes the owner id and filters by it; rows belonging
    /// to other users are invisible to these methods.
    async fn list_todos(&self, owner_id: i64) -> Result<Vec<TodoRecord>, RepoError>;

    async fn create_todo(&self, params: CreateTodoParams) -> Result<TodoRecord, RepoError>;

    async fn find_todo(&self, owner_id: i64, id: i64) -> Result<Option<TodoRecord>, RepoError>;

    /// Returns the updated record, or `None` when no owned row matched.
    async fn update_todo(&self, params: UpdateTodoParams) -> Result<Option<TodoRecord>, RepoError>;

    /// Returns whether a row was deleted.
    async fn delete_todo(&self, owner_id: i64, id: i64) -> Result<bool, RepoError>;
}
