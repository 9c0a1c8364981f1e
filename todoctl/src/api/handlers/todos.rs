//! Todo CRUD. Every route requires authentication; the `{id}` routes also
//! require that the caller owns the todo.

use axum::{Json, extract::State, http::StatusCode};
use tracing::debug;

use crate::{
    AppState,
    api::models::{
        todos::{CreateTodoPayload, TodoResponse, UpdateTodoPayload},
        users::CurrentUser,
    },
    auth::middleware::{HasOwner, LoadResource, Loaded},
    db::models::todos::{TodoCreateDBRequest, TodoUpdateDBRequest},
    errors::{Error, Result},
    types::UserId,
    validation::ValidatedJson,
};

impl HasOwner for TodoResponse {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[async_trait::async_trait]
impl LoadResource for TodoResponse {
    const NAME: &'static str = "todo";

    async fn load(state: &AppState, id: i64) -> Result<Option<Self>> {
        Ok(state.todos.get_by_id(id).await?.map(TodoResponse::from))
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/todos/create",
    tag = "todos",
    summary = "Create todo",
    request_body = CreateTodoPayload,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_todo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateTodoPayload>,
) -> Result<(StatusCode, Json<TodoResponse>)> {
    let created = state
        .todos
        .create(&TodoCreateDBRequest {
            title: payload.title,
            user_id: current_user.id,
        })
        .await?;

    debug!(todo_id = created.id, "Created todo");
    Ok((StatusCode::CREATED, Json(TodoResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/todos",
    tag = "todos",
    summary = "List own todos",
    responses(
        (status = 200, description = "The caller's todos, oldest first", body = Vec<TodoResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn list_todos(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<TodoResponse>>> {
    let todos = state.todos.list_for_user(current_user.id).await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/todos/{id}",
    tag = "todos",
    summary = "Get todo",
    params(("id" = i64, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Todo", body = TodoResponse),
        (status = 400, description = "Non-numeric id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(todo_id = todo.id))]
pub async fn get_todo(Loaded(todo): Loaded<TodoResponse>) -> Result<Json<TodoResponse>> {
    Ok(Json(todo))
}

#[utoipa::path(
    patch,
    path = "/api/v1/todos/{id}",
    tag = "todos",
    summary = "Update todo",
    params(("id" = i64, Path, description = "Todo ID")),
    request_body = UpdateTodoPayload,
    responses(
        (status = 200, description = "Updated todo", body = TodoResponse),
        (status = 400, description = "Invalid payload or non-numeric id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(todo_id = todo.id))]
pub async fn update_todo(
    State(state): State<AppState>,
    Loaded(todo): Loaded<TodoResponse>,
    ValidatedJson(payload): ValidatedJson<UpdateTodoPayload>,
) -> Result<Json<TodoResponse>> {
    let request = TodoUpdateDBRequest {
        title: payload.title().map(str::to_string),
        completed: payload.completed,
    };

    let updated = state.todos.update(todo.id, &request).await?;
    Ok(Json(TodoResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/todos/{id}",
    tag = "todos",
    summary = "Delete todo",
    params(("id" = i64, Path, description = "Todo ID")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 400, description = "Non-numeric id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(todo_id = todo.id))]
pub async fn delete_todo(State(state): State<AppState>, Loaded(todo): Loaded<TodoResponse>) -> Result<StatusCode> {
    // Loaded moments ago, but a concurrent delete can still get there first
    if !state.todos.delete(todo.id).await? {
        return Err(Error::NotFound {
            resource: TodoResponse::NAME.to_string(),
            id: todo.id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
