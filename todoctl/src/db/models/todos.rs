//! Database models for todo items.

use crate::types::{TodoId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a todo. New todos always start incomplete.
#[derive(Debug, Clone)]
pub struct TodoCreateDBRequest {
    pub title: String,
    pub user_id: UserId,
}

/// Database request for updating a todo.
///
/// Has no owner field: `user_id` is fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct TodoUpdateDBRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Database response for a todo
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TodoDBResponse {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
