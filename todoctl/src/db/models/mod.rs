//! Database record models matching table schemas.
//!
//! These structs are what repositories accept and return. They are kept
//! separate from the API models in [`crate::api::models`] so that storage and
//! wire representations can evolve independently; in particular the password
//! hash lives only here and never crosses into an API response.
//!
//! - [`users`]: User accounts and their password hashes
//! - [`todos`]: Todo items, each owned by exactly one user

pub mod todos;
pub mod users;
