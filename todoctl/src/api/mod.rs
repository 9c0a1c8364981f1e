//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! - **Users** (`/api/v1/users/*`): registration, login, current user
//! - **Todos** (`/api/v1/todos/*`): create, list, read, update, delete
//!
//! Every todo route requires `Authorization: Bearer <token>`; routes that take
//! a todo `{id}` additionally require that the caller owns it. The OpenAPI
//! document is served at `/api-docs/openapi.json`.

pub mod handlers;
pub mod models;
