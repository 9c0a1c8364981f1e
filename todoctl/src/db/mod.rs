//! Database layer for data persistence and access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers, auth middleware)
//! └──────┬──────┘
//!        │  Arc<dyn UserRepository> / Arc<dyn TodoRepository>
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers for PostgreSQL, db::embedded in memory)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository traits and PostgreSQL implementations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//! - [`embedded`]: In-memory store implementing the same traits
//!
//! # Soft deletes
//!
//! Rows are never removed. `delete` stamps `deleted_at`, and every lookup
//! ignores stamped rows. Username and email uniqueness only applies among
//! rows that are not deleted.
//!
//! # Migrations
//!
//! Migrations live in `migrations/` and are embedded at build time. The
//! [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! todoctl::migrator().run(&pool).await?;
//! ```

pub mod embedded;
pub mod errors;
pub mod handlers;
pub mod models;
