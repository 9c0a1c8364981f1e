//! Password hashing and verification.
//!
//! Both operations are CPU-bound; request handlers call them through
//! `tokio::task::spawn_blocking`.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::OnceCell;

use crate::{config::PasswordConfig, errors::Error};

const DUMMY_PASSWORD: &str = "todoctl-no-such-account";
static DUMMY_HASH: OnceCell<String> = OnceCell::new();

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Argon2Params {
    fn to_argon2(self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    /// Argon2id RFC 9106 second recommended option
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MiB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl From<&PasswordConfig> for Argon2Params {
    fn from(config: &PasswordConfig) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
        }
    }
}

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_string_with_params(input: &str, params: Argon2Params) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = params.to_argon2()?;

    let hash = argon2.hash_password(input.as_bytes(), &salt).map_err(|e| Error::Internal {
        operation: format!("hash password: {e}"),
    })?;

    Ok(hash.to_string())
}

/// Run one verification against a throwaway hash made with `params`.
///
/// Login calls this when no account matches, so an unknown email costs as much
/// as a wrong password. Always reports a mismatch.
pub fn verify_dummy(input: &str, params: Argon2Params) -> Result<bool, Error> {
    let hash = DUMMY_HASH.get_or_try_init(|| hash_string_with_params(DUMMY_PASSWORD, params))?;
    verify_string(input, hash)?;
    Ok(false)
}

/// Verify a password against a stored PHC string.
///
/// Uses the parameters embedded in the hash, so hashes made with older settings
/// keep verifying. A stored hash that cannot be parsed is an internal error, not
/// a mismatch.
pub fn verify_string(input: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse password hash: {e}"),
    })?;

    Ok(Argon2::default().verify_password(input.as_bytes(), &parsed_hash).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keep unit tests fast; production defaults are exercised by one test below
    const FAST: Argon2Params = Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn test_password_hashing() {
        let hash = hash_string_with_params("test_password_123", FAST).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_string("test_password_123", &hash).unwrap());
        assert!(!verify_string("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_same_input_different_hashes() {
        let hash1 = hash_string_with_params("same_password", FAST).unwrap();
        let hash2 = hash_string_with_params("same_password", FAST).unwrap();

        // Salted
        assert_ne!(hash1, hash2);
        assert!(verify_string("same_password", &hash1).unwrap());
        assert!(verify_string("same_password", &hash2).unwrap());
    }

    #[test]
    fn test_default_params_are_embedded_in_hash() {
        let hash = hash_string_with_params("hunter22", Argon2Params::default()).unwrap();
        assert!(hash.contains("m=19456,t=2,p=1"));
        assert!(verify_string("hunter22", &hash).unwrap());
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        assert!(!verify_dummy("anything", FAST).unwrap());
        assert!(!verify_dummy(DUMMY_PASSWORD, FAST).unwrap());
        assert!(DUMMY_HASH.get().is_some_and(|hash| hash.starts_with("$argon2id$")));
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(verify_string("anything", "not-a-phc-string"), Err(Error::Internal { .. })));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Argon2Params {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(hash_string_with_params("pw", params).is_err());
    }

    #[test]
    fn test_params_from_config() {
        let params = Argon2Params::from(&PasswordConfig::default());
        assert_eq!(params, Argon2Params::default());
    }
}
