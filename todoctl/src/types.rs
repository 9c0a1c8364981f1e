//! Common type definitions.
//!
//! # ID Types
//!
//! Entity IDs are database-assigned `BIGSERIAL` values wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`TodoId`]: Todo item identifier

// Type aliases for IDs
pub type UserId = i64;
pub type TodoId = i64;
