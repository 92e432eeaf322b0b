//! Application state.

use auth::SessionStore;
use tera::Tera;
use todo_store::TodoStore;
use tokio::sync::OnceCell;

use crate::config::Config;

/// Shared application state.
pub struct AppState<S: TodoStore> {
    /// Server configuration.
    pub config: Config,
    /// User and todo store.
    pub store: S,
    /// Session store.
    pub sessions: Box<dyn SessionStore>,
    /// Page templates.
    pub templates: Tera,
    /// Hash checked against when a login names an unknown email.
    pub(crate) dummy_password_hash: OnceCell<String>,
}

impl<S: TodoStore> AppState<S> {
    /// Creates new application state.
    pub fn new(
        config: Config,
        store: S,
        sessions: impl SessionStore + 'static,
        templates: Tera,
    ) -> Self {
        Self {
            config,
            store,
            sessions: Box::new(sessions),
            templates,
            dummy_password_hash: OnceCell::new(),
        }
    }
}

