//! Cache port for single-todo reads.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::TodoRecord;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache payload could not be decoded: {0}")]
    Codec(String),
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Best-effort lookaside store. Implementations must never be load-bearing:
/// callers treat every error as a miss.
#[async_trait]
pub trait TodoCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<TodoRecord>, CacheError>;

    async fn put(&self, key: &str, todo: &TodoRecord, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache key for one todo. Namespaced by owner so an id alone can never
/// address another user's entry.
pub fn todo_cache_key(owner_id: i64, todo_id: i64) -> String {
    format!("todo:{owner_id}:{todo_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_by_owner() {
        assert_eq!(todo_cache_key(7, 31), "todo:7:31");
        assert_ne!(todo_cache_key(7, 31), todo_cache_key(8, 31));
    }
}
