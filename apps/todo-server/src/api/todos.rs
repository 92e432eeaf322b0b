//! Todo API endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use entities::{Todo, TodoChanges, TodoStats};
use serde::Deserialize;
use todo_store::TodoStore;

use crate::api::extract::ApiJson;
use crate::error::ServerResult;
use crate::middleware::MaybeUser;
use crate::services::TodoService;
use crate::state::AppState;

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
pub struct TodoParams {
    /// Fields to set.
    pub todo: TodoChanges,
}

/// Lists the current user's todos, newest first.
pub async fn list_todos<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
) -> ServerResult<Json<Vec<Todo>>> {
    let todos = TodoService::new(&state.store).list(current.user()).await?;
    Ok(Json(todos))
}

/// Returns the current user's statistics.
pub async fn todo_stats<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
) -> ServerResult<Json<TodoStats>> {
    let stats = TodoService::new(&state.store).stats(current.user()).await?;
    Ok(Json(stats))
}

/// Gets a todo by ID.
pub async fn get_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
    Path(id): Path<String>,
) -> ServerResult<Json<Todo>> {
    let todo = TodoService::new(&state.store).get(current.user(), &id).await?;
    Ok(Json(todo))
}

/// Creates a todo.
pub async fn create_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
    ApiJson(params): ApiJson<TodoParams>,
) -> ServerResult<(StatusCode, Json<Todo>)> {
    let todo = TodoService::new(&state.store)
        .create(current.user(), params.todo)
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Updates a todo's title and/or completion flag.
pub async fn update_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
    Path(id): Path<String>,
    ApiJson(params): ApiJson<TodoParams>,
) -> ServerResult<Json<Todo>> {
    let todo = TodoService::new(&state.store)
        .update(current.user(), &id, params.todo)
        .await?;
    Ok(Json(todo))
}

/// Deletes a todo.
pub async fn delete_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    current: MaybeUser,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    TodoService::new(&state.store)
        .delete(current.user(), &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
