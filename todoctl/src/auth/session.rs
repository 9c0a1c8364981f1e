//! Signed session tokens.
//!
//! A session token is a compact HS256 JWT whose claims embed a snapshot of the
//! identity it was issued to plus `iat`/`exp` in Unix seconds. There is no
//! server-side session store: a token is valid exactly when its signature checks
//! out and the current time is strictly before `exp`.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::{api::models::users::UserResponse, config::Config, errors::Error};

/// JWT session claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity snapshot at issuance. Never includes the password hash.
    pub user: UserResponse,
    pub exp: i64,
    pub iat: i64,
}

/// A freshly minted token and the instant it stops being accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signing material and token lifetime, built once at startup.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").field("expiry", &self.expiry).finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &str, expiry: Duration) -> Result<Self, Error> {
        if secret.is_empty() {
            return Err(Error::Configuration {
                message: "secret_key must not be empty".to_string(),
            });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret = config.secret_key.as_deref().ok_or_else(|| Error::Configuration {
            message: "secret_key is required. Set JWT_SECRET or TODOCTL_SECRET_KEY, or add secret_key to the config file".to_string(),
        })?;
        Self::new(secret, config.auth.security.jwt_expiry)
    }

    /// Mint a token for `user` that expires one configured lifetime from now.
    pub fn issue(&self, user: &UserResponse) -> Result<SessionToken, Error> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &UserResponse, now: DateTime<Utc>) -> Result<SessionToken, Error> {
        let lifetime = chrono::Duration::from_std(self.expiry).map_err(|e| Error::Internal {
            operation: format!("convert session expiry: {e}"),
        })?;
        let expires_at = now + lifetime;

        let claims = SessionClaims {
            user: user.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| Error::Internal {
            operation: format!("create JWT: {e}"),
        })?;

        Ok(SessionToken { access_token, expires_at })
    }

    /// Check signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, Error> {
        self.verify_at(token, Utc::now())
    }

    /// Fails with `Error::Unauthenticated` whatever went wrong; callers learn
    /// nothing about which check rejected the token.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, Error> {
        // `exp` must be present; its value is compared against `now` below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = ?e.kind(), "Rejected session token");
            Error::Unauthenticated { message: None }
        })?;

        if now.timestamp() >= data.claims.exp {
            debug!(user_id = data.claims.user.id, "Rejected expired session token");
            return Err(Error::Unauthenticated { message: None });
        }

        Ok(data.claims)
    }
}
