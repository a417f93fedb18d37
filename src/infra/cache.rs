//! Redis-backed todo cache over a bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::{RedisConnectionManager, redis};

use crate::application::cache::{CacheError, TodoCache};
use crate::domain::entities::TodoRecord;

#[derive(Clone)]
pub struct RedisTodoCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisTodoCache {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, CacheError> {
        let manager = RedisConnectionManager::new(url).map_err(CacheError::backend)?;
        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .await
            .map_err(CacheError::backend)?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, CacheError> {
        self.pool.get().await.map_err(CacheError::backend)
    }
}

#[async_trait]
impl TodoCache for RedisTodoCache {
    async fn get(&self, key: &str) -> Result<Option<TodoRecord>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await
            .map_err(CacheError::backend)?;

        match value {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|err| CacheError::Codec(err.to_string())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, todo: &TodoRecord, ttl: Duration) -> Result<(), CacheError> {
        let json = serde_json::to_string(todo).map_err(|err| CacheError::Codec(err.to_string()))?;
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(json)
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut *conn)
            .await
            .map_err(CacheError::backend)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut *conn)
            .await
            .map_err(CacheError::backend)?;
        Ok(())
    }
}
