//! API request and response data models.
//!
//! API models are distinct from database models so the storage representation
//! can change without changing the public contract. Request payloads implement
//! [`crate::validation::Validate`] and are decoded through
//! [`crate::validation::ValidatedJson`]. Everything is annotated with `utoipa`
//! for the OpenAPI document.
//!
//! - [`auth`]: registration and login payloads, token responses
//! - [`users`]: identity views
//! - [`todos`]: todo payloads and responses

pub mod auth;
pub mod todos;
pub mod users;
