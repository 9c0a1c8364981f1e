//! OpenAPI document for `/api/v1/*`, served at `/api-docs/openapi.json` and
//! rendered at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token from register or login, sent as:\n\n\
                            ```\nAuthorization: Bearer <accessToken>\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::users::get_current_user,
        api::handlers::todos::create_todo,
        api::handlers::todos::list_todos,
        api::handlers::todos::get_todo,
        api::handlers::todos::update_todo,
        api::handlers::todos::delete_todo,
    ),
    components(
        schemas(
            api::models::auth::RegisterPayload,
            api::models::auth::LoginPayload,
            api::models::auth::AuthResponse,
            crate::auth::session::SessionToken,
            api::models::users::UserResponse,
            api::models::todos::CreateTodoPayload,
            api::models::todos::UpdateTodoPayload,
            api::models::todos::TodoResponse,
        )
    ),
    tags(
        (name = "users", description = "Registration, login, and the current user"),
        (name = "todos", description = "Todo items owned by the caller"),
    ),
    info(
        title = "todoctl API",
        description = "Todo list API with bearer-token authentication and per-todo ownership checks.",
    )
)]
pub struct ApiDoc;
