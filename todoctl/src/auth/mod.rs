//! Authentication and ownership.
//!
//! Credentials are stateless bearer tokens: an HS256 JWT whose claims carry a
//! snapshot of the user and an expiry. The snapshot is only used to find the
//! user; every authenticated request re-reads the identity from the user store,
//! so a deleted user is locked out immediately even while their token is still
//! unexpired.
//!
//! # Request flow
//!
//! ```text
//! Authorization: Bearer <jwt>
//!   -> bearer::extract_bearer_token
//!   -> session::SessionKeys::verify          401 on any failure
//!   -> users.get_by_id(claims.user.id)       401 if gone
//!   -> middleware::load_resource::<R>        400 bad id, 404 missing
//!   -> middleware::require_owner::<R>        403 not the owner
//!   -> handler(CurrentUser, Loaded<R>)
//! ```
//!
//! # Modules
//!
//! - [`bearer`]: `Authorization` header parsing
//! - [`current_user`]: extractor for the authenticated user in handlers
//! - [`middleware`]: route protection stages and the [`middleware::HasOwner`] trait
//! - [`password`]: Argon2 password hashing and verification
//! - [`session`]: token issue and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use todoctl::api::models::users::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

pub mod bearer;
pub mod current_user;
pub mod middleware;
pub mod password;
pub mod session;
