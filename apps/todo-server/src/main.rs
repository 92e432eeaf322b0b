//! Todo Server binary.

use std::{net::SocketAddr, sync::Arc};

use auth::{MemorySessionStore, SqliteSessionStore};
use todo_server::{
    config::Config, create_app, create_state, init_tracing, services::seed::seed_demo_data,
    spawn_session_cleanup, state::AppState,
};
use todo_store::{MemoryTodoStore, SqliteTodoStore, TodoStore};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        memory_store = config.uses_memory_store(),
        "Starting Todo Server"
    );

    if config.uses_memory_store() {
        let state = create_state(config, MemoryTodoStore::new(), MemorySessionStore::new())?;
        serve(state).await
    } else {
        let store = SqliteTodoStore::connect(&config.database_url).await?;
        store.migrate().await?;

        let sessions = SqliteSessionStore::new(store.pool().clone());
        sessions.init().await?;

        let state = create_state(config, store, sessions)?;
        serve(state).await
    }
}

async fn serve<S: TodoStore + 'static>(state: Arc<AppState<S>>) -> anyhow::Result<()> {
    if state.config.seed_demo_data {
        seed_demo_data(&state).await?;
    }

    // Start session cleanup task
    spawn_session_cleanup(state.clone());

    // Parse server address
    let addr: SocketAddr = state.config.server_addr().parse()?;

    // Create application router
    let app = create_app(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        }
    }
}
