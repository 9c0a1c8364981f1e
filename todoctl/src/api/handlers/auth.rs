//! Registration and login.

use axum::{Json, extract::State, http::StatusCode};
use tracing::debug;

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginPayload, RegisterPayload},
        users::UserResponse,
    },
    auth::password::{self, Argon2Params},
    db::models::users::UserCreateDBRequest,
    errors::{Error, Result},
    validation::ValidatedJson,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some(INVALID_CREDENTIALS.to_string()),
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "users",
    summary = "Register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User created; token issued", body = AuthResponse),
        (status = 400, description = "Invalid payload, or email/username already taken"),
        (status = 409, description = "Email or username taken by a concurrent registration"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    if state.users.get_user_by_email(&payload.email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "User with email already exists".to_string(),
        });
    }
    if state.users.get_user_by_username(&payload.username).await?.is_some() {
        return Err(Error::BadRequest {
            message: "User with username already exists".to_string(),
        });
    }

    // Hash on a blocking thread to avoid stalling the async runtime
    let params = Argon2Params::from(&state.config.auth.password);
    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    // A concurrent registration can still win the race; the store reports it as a conflict
    let created = state
        .users
        .create(&UserCreateDBRequest {
            username: payload.username,
            email: payload.email,
            password_hash,
        })
        .await?;

    debug!(user_id = created.id, "Registered user");
    let token = state.session_keys.issue(&UserResponse::from(created))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    summary = "Log in",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Credentials accepted; token issued", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, ValidatedJson(payload): ValidatedJson<LoginPayload>) -> Result<Json<AuthResponse>> {
    let found = state.users.get_user_by_email(&payload.email).await?;

    // An unknown email still pays for one argon2 verification
    let params = Argon2Params::from(&state.config.auth.password);
    let password = payload.password;
    let hash = found.as_ref().map(|user| user.password_hash.clone());
    let is_valid = tokio::task::spawn_blocking(move || match hash {
        Some(hash) => password::verify_string(&password, &hash),
        None => password::verify_dummy(&password, params),
    })
    .await
    .map_err(|e| Error::Internal {
        operation: format!("spawn password verification task: {e}"),
    })??;

    let user = match found {
        Some(user) if is_valid => user,
        Some(user) => {
            debug!(user_id = user.id, "Password mismatch");
            return Err(invalid_credentials());
        }
        None => return Err(invalid_credentials()),
    };

    let token = state.session_keys.issue(&UserResponse::from(user))?;
    Ok(Json(AuthResponse { token }))
}
