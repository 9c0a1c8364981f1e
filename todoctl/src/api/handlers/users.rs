use axum::Json;

use crate::{
    api::models::users::{CurrentUser, UserResponse},
    errors::Result,
};

/// The authenticated caller, as currently stored
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    summary = "Get current user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn get_current_user(current_user: CurrentUser) -> Result<Json<UserResponse>> {
    Ok(Json(UserResponse::from(current_user)))
}
