//! PostgreSQL repository for todo items.

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::{Repository, TodoRepository},
        models::todos::{TodoCreateDBRequest, TodoDBResponse, TodoUpdateDBRequest},
    },
    types::{TodoId, UserId},
};
use sqlx::PgPool;
use tracing::instrument;

const TODO_COLUMNS: &str = "id, title, completed, user_id, created_at, updated_at, deleted_at";

#[derive(Debug, Clone)]
pub struct Todos {
    db: PgPool,
}

impl Todos {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl Repository for Todos {
    type CreateRequest = TodoCreateDBRequest;
    type UpdateRequest = TodoUpdateDBRequest;
    type Response = TodoDBResponse;
    type Id = TodoId;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let todo = sqlx::query_as::<_, TodoDBResponse>(&format!(
            "INSERT INTO todos (title, completed, user_id) VALUES ($1, false, $2) RETURNING {TODO_COLUMNS}"
        ))
        .bind(&request.title)
        .bind(request.user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(todo)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        let todo = sqlx::query_as::<_, TodoDBResponse>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(todo)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE todos SET deleted_at = now(), updated_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let todo = sqlx::query_as::<_, TodoDBResponse>(&format!(
            r#"
            UPDATE todos SET
                title = COALESCE($2, title),
                completed = COALESCE($3, completed),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title.as_deref())
        .bind(request.completed)
        .fetch_optional(&self.db)
        .await?;

        todo.ok_or(DbError::NotFound)
    }
}

#[async_trait::async_trait]
impl TodoRepository for Todos {
    #[instrument(skip(self), err)]
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<TodoDBResponse>> {
        let todos = sqlx::query_as::<_, TodoDBResponse>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(todos)
    }
}
