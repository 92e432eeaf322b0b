//! Todo Server
//!
//! A small multi-user to-do service. Users register and log in with cookie
//! sessions, manage their own todos through a JSON API, and use a
//! server-rendered page whose script talks to that API.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
pub mod web;

use std::{sync::Arc, time::Duration};

use auth::SessionStore;
use axum::{Router, routing::get};
use todo_store::TodoStore;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::ServerResult;
use crate::state::AppState;

/// How often expired sessions are pruned.
pub const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Creates the application router with all routes configured.
pub fn create_app<S: TodoStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .merge(api::create_router())
        .merge(web::create_router())
        .route("/health", get(health_check))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::load_session::<S>,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with the given configuration and stores.
pub fn create_state<S: TodoStore>(
    config: Config,
    store: S,
    sessions: impl SessionStore + 'static,
) -> ServerResult<Arc<AppState<S>>> {
    let templates = web::templates::load_templates()?;
    Ok(Arc::new(AppState::new(config, store, sessions, templates)))
}

/// Starts the background task that prunes expired sessions.
pub fn spawn_session_cleanup<S: TodoStore + 'static>(state: Arc<AppState<S>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match state.sessions.cleanup_expired().await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "Cleaned up expired sessions"),
                Err(e) => tracing::warn!(error = %e, "Failed to clean up expired sessions"),
            }
        }
    })
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
