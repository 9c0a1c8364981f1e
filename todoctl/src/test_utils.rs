//! Test utilities shared by the unit and HTTP tests.
//!
//! Everything here runs against [`EmbeddedDatabase`], so tests need no running
//! PostgreSQL.

use std::sync::Arc;

use axum_test::TestServer;

use crate::{
    AppState,
    api::models::users::UserResponse,
    auth::{
        password::{self, Argon2Params},
        session::SessionKeys,
    },
    config::{Config, DatabaseConfig, PasswordConfig},
    db::{
        embedded::EmbeddedDatabase,
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
};

pub const TEST_SECRET: &str = "test-secret-key-for-jwt";
pub const TEST_PASSWORD: &str = "password123";

/// Cheap argon2 settings; production cost would dominate test run time.
const TEST_PASSWORD_CONFIG: PasswordConfig = PasswordConfig {
    argon2_memory_kib: 1024,
    argon2_iterations: 1,
    argon2_parallelism: 1,
};

pub fn create_test_config() -> Config {
    let mut config = Config {
        database: DatabaseConfig::Memory,
        secret_key: Some(TEST_SECRET.to_string()),
        ..Default::default()
    };
    config.auth.password = TEST_PASSWORD_CONFIG;
    config
}

/// Application state over a fresh in-memory store.
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_config(create_test_config())
}

pub fn create_test_app_state_with_config(config: Config) -> AppState {
    let session_keys = SessionKeys::from_config(&config).expect("Failed to build session keys");
    let db = EmbeddedDatabase::new();

    AppState::builder()
        .config(config)
        .session_keys(Arc::new(session_keys))
        .users(Arc::new(db.users()))
        .todos(Arc::new(db.todos()))
        .build()
}

/// Full router over `state`, with every production layer applied.
pub fn create_test_server(state: AppState) -> TestServer {
    let router = crate::build_router(&state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Insert a user directly into the store. The password is [`TEST_PASSWORD`]
/// and the email is `{username}@example.com`.
pub async fn create_test_user(state: &AppState, username: &str) -> UserDBResponse {
    let params = Argon2Params::from(&state.config.auth.password);
    let password_hash = password::hash_string_with_params(TEST_PASSWORD, params).expect("Failed to hash password");

    state
        .users
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash,
        })
        .await
        .expect("Failed to create test user")
}

/// A valid access token for `user`, signed with the state's keys.
pub fn token_for(state: &AppState, user: &UserDBResponse) -> String {
    state
        .session_keys
        .issue(&UserResponse::from(user.clone()))
        .expect("Failed to issue token")
        .access_token
}
