//! Repository implementations for database access.
//!
//! Each PostgreSQL repository wraps a cloned [`sqlx::PgPool`] and implements the
//! [`Repository`] trait plus its table-specific extension trait. The same traits
//! are implemented by the in-memory store in [`crate::db::embedded`].
//!
//! # Available Repositories
//!
//! - [`Users`]: identity lookup by id, email, or username
//! - [`Todos`]: owned todo items

pub mod repository;
pub mod todos;
pub mod users;

pub use repository::{Repository, TodoRepository, UserRepository};
pub use todos::Todos;
pub use users::Users;
