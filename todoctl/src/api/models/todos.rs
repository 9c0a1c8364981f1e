//! API request/response models for todo items.

use crate::db::models::todos::TodoDBResponse;
use crate::types::{TodoId, UserId};
use crate::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTodoPayload {
    /// At least 3 characters
    pub title: String,
}

impl Validate for CreateTodoPayload {
    fn validate(&self) -> ValidationErrors {
        let mut v = Validator::new();
        v.required("title", &self.title);
        v.min_length("title", &self.title, 3);
        v.into_errors()
    }
}

/// Partial update. Absent fields are left unchanged; an empty title is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateTodoPayload {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTodoPayload {
    /// The title to write, if any. Empty titles count as absent.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

impl Validate for UpdateTodoPayload {
    fn validate(&self) -> ValidationErrors {
        let mut v = Validator::new();
        if let Some(title) = self.title() {
            v.min_length("title", title, 3);
        }
        v.into_errors()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TodoDBResponse> for TodoResponse {
    fn from(db: TodoDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            completed: db.completed,
            user_id: db.user_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
