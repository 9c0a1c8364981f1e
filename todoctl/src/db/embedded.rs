//! In-memory storage for development and tests.
//!
//! [`EmbeddedDatabase`] implements the same repository traits as the PostgreSQL
//! handlers, with the same soft-delete and uniqueness semantics, so the HTTP
//! layer cannot tell the two apart. Each table sits behind its own
//! `tokio::sync::RwLock`; uniqueness is checked and the row inserted under a
//! single write guard.

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::{Repository, TodoRepository, UserRepository},
        models::{
            todos::{TodoCreateDBRequest, TodoDBResponse, TodoUpdateDBRequest},
            users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
        },
    },
    types::{TodoId, UserId},
};

#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Owns every in-memory table. Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedDatabase {
    users: Arc<RwLock<Table<UserDBResponse>>>,
    todos: Arc<RwLock<Table<TodoDBResponse>>>,
}

impl EmbeddedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> EmbeddedUsers {
        EmbeddedUsers {
            table: self.users.clone(),
        }
    }

    pub fn todos(&self) -> EmbeddedTodos {
        EmbeddedTodos {
            table: self.todos.clone(),
        }
    }
}

fn unique_violation(constraint: &str, table: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
    }
}

/// Fails if a live user other than `except` already holds `username` or `email`.
fn check_user_unique(table: &Table<UserDBResponse>, username: Option<&str>, email: Option<&str>, except: Option<UserId>) -> Result<()> {
    let live = table
        .rows
        .values()
        .filter(|u| u.deleted_at.is_none() && Some(u.id) != except);

    for user in live {
        if email.is_some_and(|e| e == user.email) {
            return Err(unique_violation("users_email_unique", "users"));
        }
        if username.is_some_and(|n| n == user.username) {
            return Err(unique_violation("users_username_unique", "users"));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct EmbeddedUsers {
    table: Arc<RwLock<Table<UserDBResponse>>>,
}

#[async_trait::async_trait]
impl Repository for EmbeddedUsers {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut table = self.table.write().await;
        check_user_unique(&table, Some(request.username.as_str()), Some(request.email.as_str()), None)?;

        let now = Utc::now();
        let user = UserDBResponse {
            id: table.allocate_id(),
            username: request.username.clone(),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(user.id, user.clone());
        debug!(user_id = user.id, "Inserted user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|u| u.deleted_at.is_none()).cloned())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: Self::Id) -> Result<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(user) if user.deleted_at.is_none() => {
                let now = Utc::now();
                user.deleted_at = Some(now);
                user.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    #[instrument(skip(self, request), err)]
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut table = self.table.write().await;
        if !table.rows.get(&id).is_some_and(|u| u.deleted_at.is_none()) {
            return Err(DbError::NotFound);
        }
        check_user_unique(&table, request.username.as_deref(), request.email.as_deref(), Some(id))?;

        let user = table.rows.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(username) = &request.username {
            user.username = username.clone();
        }
        if let Some(email) = &request.email {
            user.email = email.clone();
        }
        if let Some(password_hash) = &request.password_hash {
            user.password_hash = password_hash.clone();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait::async_trait]
impl UserRepository for EmbeddedUsers {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.deleted_at.is_none() && u.email == email)
            .cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.deleted_at.is_none() && u.username == username)
            .cloned())
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddedTodos {
    table: Arc<RwLock<Table<TodoDBResponse>>>,
}

#[async_trait::async_trait]
impl Repository for EmbeddedTodos {
    type CreateRequest = TodoCreateDBRequest;
    type UpdateRequest = TodoUpdateDBRequest;
    type Response = TodoDBResponse;
    type Id = TodoId;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let todo = TodoDBResponse {
            id: table.allocate_id(),
            title: request.title.clone(),
            completed: false,
            user_id: request.user_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|t| t.deleted_at.is_none()).cloned())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: Self::Id) -> Result<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(todo) if todo.deleted_at.is_none() => {
                let now = Utc::now();
                todo.deleted_at = Some(now);
                todo.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    #[instrument(skip(self, request), err)]
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut table = self.table.write().await;
        let todo = table
            .rows
            .get_mut(&id)
            .filter(|t| t.deleted_at.is_none())
            .ok_or(DbError::NotFound)?;

        if let Some(title) = &request.title {
            todo.title = title.clone();
        }
        if let Some(completed) = request.completed {
            todo.completed = completed;
        }
        todo.updated_at = Utc::now();
        Ok(todo.clone())
    }
}

#[async_trait::async_trait]
impl TodoRepository for EmbeddedTodos {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<TodoDBResponse>> {
        let table = self.table.read().await;
        // BTreeMap iteration is in id order, which is also insertion order
        Ok(table
            .rows
            .values()
            .filter(|t| t.deleted_at.is_none() && t.user_id == user_id)
            .cloned()
            .collect())
    }
}
