use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

use crate::application::cache::{TodoCache, todo_cache_key};
use crate::application::repos::{CreateTodoParams, RepoError, TodosRepo, UpdateTodoParams};
use crate::domain::entities::TodoRecord;

/// Cached single-todo reads live this long before expiring.
pub const TODO_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(3);

pub const METRIC_TODO_CACHE_HIT: &str = "quaderno_todo_cache_hit_total";
pub const METRIC_TODO_CACHE_MISS: &str = "quaderno_todo_cache_miss_total";
pub const METRIC_TODO_CACHE_ERROR: &str = "quaderno_todo_cache_error_total";

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("task text must not be empty")]
    EmptyTask,
    #[error("todo not found")]
    NotFound,
    #[error("todo store timeout")]
    Timeout,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for TodoError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => TodoError::NotFound,
            RepoError::Timeout => TodoError::Timeout,
            other => TodoError::Repo(other),
        }
    }
}

/// Owner-scoped task CRUD over the persistent store, with a lookaside cache
/// in front of single-item reads.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodosRepo>,
    cache: Arc<dyn TodoCache>,
    op_timeout: Duration,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodosRepo>, cache: Arc<dyn TodoCache>) -> Self {
        Self {
            repo,
            cache,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<TodoRecord>, TodoError> {
        let todos = timeout(self.op_timeout, self.repo.list_todos(owner_id))
            .await
            .map_err(|_| TodoError::Timeout)??;
        Ok(todos)
    }

    pub async fn create(
        &self,
        owner_id: i64,
        task: &str,
        completed: bool,
    ) -> Result<TodoRecord, TodoError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(TodoError::EmptyTask);
        }

        let params = CreateTodoParams {
            owner_id,
            task: task.to_string(),
            completed,
        };
        let created = timeout(self.op_timeout, self.repo.create_todo(params))
            .await
            .map_err(|_| TodoError::Timeout)??;
        Ok(created)
    }

    /// Cache-aside read: a cache hit returns without touching the store, a
    /// miss falls through and writes back. Cache failures degrade to misses.
    pub async fn get(&self, owner_id: i64, id: i64) -> Result<TodoRecord, TodoError> {
        let key = todo_cache_key(owner_id, id);

        match self.cache.get(&key).await {
            Ok(Some(todo)) => {
                counter!(METRIC_TODO_CACHE_HIT).increment(1);
                return Ok(todo);
            }
            Ok(None) => {
                counter!(METRIC_TODO_CACHE_MISS).increment(1);
            }
            Err(err) => {
                counter!(METRIC_TODO_CACHE_ERROR).increment(1);
                warn!(key = %key, error = %err, "todo cache read failed; treating as miss");
            }
        }

        let todo = timeout(self.op_timeout, self.repo.find_todo(owner_id, id))
            .await
            .map_err(|_| TodoError::Timeout)??
            .ok_or(TodoError::NotFound)?;

        if let Err(err) = self.cache.put(&key, &todo, TODO_CACHE_TTL).await {
            counter!(METRIC_TODO_CACHE_ERROR).increment(1);
            warn!(key = %key, error = %err, "todo cache write failed");
        }

        Ok(todo)
    }

    pub async fn update(
        &self,
        owner_id: i64,
        id: i64,
        task: &str,
        completed: bool,
    ) -> Result<TodoRecord, TodoError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(TodoError::EmptyTask);
        }

        let params = UpdateTodoParams {
            owner_id,
            id,
            task: task.to_string(),
            completed,
        };
        let updated = timeout(self.op_timeout, self.repo.update_todo(params))
            .await
            .map_err(|_| TodoError::Timeout)??
            .ok_or(TodoError::NotFound)?;

        self.invalidate(owner_id, id).await;
        Ok(updated)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), TodoError> {
        let deleted = timeout(self.op_timeout, self.repo.delete_todo(owner_id, id))
            .await
            .map_err(|_| TodoError::Timeout)??;
        if !deleted {
            return Err(TodoError::NotFound);
        }

        self.invalidate(owner_id, id).await;
        Ok(())
    }

    /// Drops the cached entry after a successful store write, best-effort.
    async fn invalidate(&self, owner_id: i64, id: i64) {
        let key = todo_cache_key(owner_id, id);
        if let Err(err) = self.cache.delete(&key).await {
            counter!(METRIC_TODO_CACHE_ERROR).increment(1);
            warn!(key = %key, error = %err, "todo cache invalidation failed");
        }
    }
}
