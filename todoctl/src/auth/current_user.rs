//! Handler-side access to the authenticated identity.
//!
//! [`crate::auth::middleware::authenticate`] resolves the identity and stores it in
//! the request extensions; this extractor only reads it back. A handler that asks
//! for a [`CurrentUser`] on a route without the middleware gets a 401, never an
//! identity that was not checked.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::trace;

use crate::{api::models::users::CurrentUser, errors::Error};

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                trace!("No authenticated user in request extensions");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn parts() -> Parts {
        let (parts, _body) = axum::http::Request::builder()
            .uri("http://localhost/test")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn test_reads_identity_from_extensions() {
        let user = CurrentUser {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut parts = parts();
        parts.extensions.insert(user.clone());

        let extracted = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, user);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthenticated() {
        let mut parts = parts();
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(Error::Unauthenticated { message: None })));
    }
}
