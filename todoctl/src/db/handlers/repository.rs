//! Base repository traits for database operations.

/// Contains the Repository trait.
///
/// A repository is the data access layer for one table. It provides methods for
/// creating, reading, updating, and soft-deleting entities. Lookups return
/// `Ok(None)` when nothing matches; soft-deleted rows are invisible to every
/// read.
use crate::db::errors::Result;
use crate::db::models::{
    todos::{TodoCreateDBRequest, TodoDBResponse, TodoUpdateDBRequest},
    users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{TodoId, UserId};

/// Base repository trait providing common database operations
///
/// This trait has separate associated types for create requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// The request type for creating entities
    type CreateRequest: Sync;

    /// The request type for updating entities
    type UpdateRequest: Sync;

    /// The response/DTO type returned by operations
    type Response: Send;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Create a new entity
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Soft-delete an entity by ID. Returns false if there was nothing to delete.
    async fn delete(&self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID, failing with `DbError::NotFound` if it does not exist
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}

/// Identity store. Usernames and emails are unique among non-deleted users.
#[async_trait::async_trait]
pub trait UserRepository:
    Repository<CreateRequest = UserCreateDBRequest, UpdateRequest = UserUpdateDBRequest, Response = UserDBResponse, Id = UserId>
{
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>>;
}

/// Todo store.
#[async_trait::async_trait]
pub trait TodoRepository:
    Repository<CreateRequest = TodoCreateDBRequest, UpdateRequest = TodoUpdateDBRequest, Response = TodoDBResponse, Id = TodoId>
{
    /// All non-deleted todos owned by `user_id`, oldest first
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<TodoDBResponse>>;
}
