//! HTTP request handlers.
//!
//! Handlers receive already-validated payloads through
//! [`crate::validation::ValidatedJson`] and, on protected routes, an identity
//! and resource resolved by [`crate::auth::middleware`]. They never check
//! tokens or ownership themselves.
//!
//! - [`auth`]: registration and login
//! - [`users`]: the current user
//! - [`todos`]: todo CRUD

pub mod auth;
pub mod todos;
pub mod users;
