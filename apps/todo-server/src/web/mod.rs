//! Server-rendered pages.

pub mod assets;
pub mod flash;
pub mod pages;
pub mod templates;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use todo_store::TodoStore;

use crate::middleware::session::require_login;
use crate::state::AppState;

/// Creates the page router.
///
/// Everything except the login and registration pages requires a session.
pub fn create_router<S: TodoStore + 'static>() -> Router<Arc<AppState<S>>> {
    let guarded = Router::new()
        .route("/", get(pages::index))
        .route("/profile", get(pages::profile))
        .route("/logout", post(pages::logout))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .route("/login", get(pages::login_form).post(pages::login))
        .route("/register", get(pages::register_form).post(pages::register))
        .route("/users/new", get(pages::register_form))
        .route("/assets/todos.js", get(assets::todos_js))
        .merge(guarded)
}
