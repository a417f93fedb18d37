//! Metric-name coverage for the todo cache counters.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use tokio::sync::Mutex;

use quaderno::application::cache::{CacheError, TodoCache};
use quaderno::application::repos::{CreateTodoParams, RepoError, TodosRepo, UpdateTodoParams};
use quaderno::application::todos::{
    METRIC_TODO_CACHE_ERROR, METRIC_TODO_CACHE_HIT, METRIC_TODO_CACHE_MISS, TodoService,
};
use quaderno::domain::entities::TodoRecord;

fn sample_todo() -> TodoRecord {
    TodoRecord {
        id: 1,
        task: "metrics".to_string(),
        completed: false,
        user_id: 7,
    }
}

struct FixedTodos;

#[async_trait]
impl TodosRepo for FixedTodos {
    async fn list_todos(&self, _owner_id: i64) -> Result<Vec<TodoRecord>, RepoError> {
        Ok(vec![sample_todo()])
    }

    async fn create_todo(&self, params: CreateTodoParams) -> Result<TodoRecord, RepoError> {
        Ok(TodoRecord {
            id: 1,
            task: params.task,
            completed: params.completed,
            user_id: params.owner_id,
        })
    }

    async fn find_todo(&self, owner_id: i64, id: i64) -> Result<Option<TodoRecord>, RepoError> {
        let todo = sample_todo();
        Ok((owner_id == todo.user_id && id == todo.id).then_some(todo))
    }

    async fn update_todo(
        &self,
        _params: UpdateTodoParams,
    ) -> Result<Option<TodoRecord>, RepoError> {
        Ok(None)
    }

    async fn delete_todo(&self, _owner_id: i64, _id: i64) -> Result<bool, RepoError> {
        Ok(false)
    }
}

#[derive(Default)]
struct MapCache {
    entries: Mutex<HashMap<String, TodoRecord>>,
}

#[async_trait]
impl TodoCache for MapCache {
    async fn get(&self, key: &str) -> Result<Option<TodoRecord>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, todo: &TodoRecord, _ttl: Duration) -> Result<(), CacheError> {
        self.entries.lock().await.insert(key.to_string(), todo.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

struct BrokenCache;

#[async_trait]
impl TodoCache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<TodoRecord>, CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn put(&self, _key: &str, _todo: &TodoRecord, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::backend("connection refused"))
    }
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Miss on the first read, hit on the second.
    let service = TodoService::new(Arc::new(FixedTodos), Arc::new(MapCache::default()));
    service
        .get(7, 1)
        .await
        .expect("first read should come from the store");
    service
        .get(7, 1)
        .await
        .expect("second read should come from the cache");

    // A broken cache is recorded and the read still succeeds.
    let degraded = TodoService::new(Arc::new(FixedTodos), Arc::new(BrokenCache));
    degraded
        .get(7, 1)
        .await
        .expect("read should survive a broken cache");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        METRIC_TODO_CACHE_HIT,
        METRIC_TODO_CACHE_MISS,
        METRIC_TODO_CACHE_ERROR,
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
