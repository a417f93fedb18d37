use async_trait::async_trait;

use crate::{
    application::repos::{CreateTodoParams, RepoError, TodosRepo, UpdateTodoParams},
    domain::entities::TodoRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    task: String,
    completed: bool,
    user_id: i64,
}

impl From<TodoRow> for TodoRecord {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            task: row.task,
            completed: row.completed,
            user_id: row.user_id,
        }
    }
}

#[async_trait]
impl TodosRepo for PostgresRepositories {
    async fn list_todos(&self, owner_id: i64) -> Result<Vec<TodoRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, task, completed, user_id
            FROM todos
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TodoRecord::from).collect())
    }

    async fn create_todo(&self, params: CreateTodoParams) -> Result<TodoRecord, RepoError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            INSERT INTO todos (task, completed, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, task, completed, user_id
            "#,
        )
        .bind(&params.task)
        .bind(params.completed)
        .bind(params.owner_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_todo(&self, owner_id: i64, id: i64) -> Result<Option<TodoRecord>, RepoError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, task, completed, user_id
            FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TodoRecord::from))
    }

    async fn update_todo(
        &self,
        params: UpdateTodoParams,
    ) -> Result<Option<TodoRecord>, RepoError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos
            SET task = $1, completed = $2
            WHERE id = $3 AND user_id = $4
            RETURNING id, task, completed, user_id
            "#,
        )
        .bind(&params.task)
        .bind(params.completed)
        .bind(params.id)
        .bind(params.owner_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TodoRecord::from))
    }

    async fn delete_todo(&self, owner_id: i64, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
