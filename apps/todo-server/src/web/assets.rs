//! Static assets compiled into the binary.

use axum::{
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};

const TODOS_JS: &str = include_str!("../../assets/todos.js");

/// Serves the todo page script.
pub async fn todos_js() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (CACHE_CONTROL, "no-cache"),
        ],
        TODOS_JS,
    )
}
