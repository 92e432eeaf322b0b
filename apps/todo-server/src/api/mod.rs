//! JSON API endpoints.

pub mod extract;
pub mod me;
pub mod todos;

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use todo_store::TodoStore;

use crate::middleware::session::verify_csrf;
use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: TodoStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Todo endpoints
        .route("/api/todos", get(todos::list_todos).post(todos::create_todo))
        .route("/api/todos/stats", get(todos::todo_stats))
        .route(
            "/api/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        // Account endpoints
        .route("/api/me", get(me::current_user))
        .layer(middleware::from_fn(verify_csrf))
}
