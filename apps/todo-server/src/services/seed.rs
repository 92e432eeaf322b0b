//! Demo data.

use entities::Todo;
use todo_store::TodoStore;

use crate::error::ServerResult;
use crate::services::AccountService;
use crate::state::AppState;

/// Password shared by the demo accounts.
pub const DEMO_PASSWORD: &str = "password123";

const DEMO_ACCOUNTS: &[(&str, &[(&str, bool)])] = &[
    (
        "test@example.com",
        &[
            ("Learn the web framework", false),
            ("Finish the tutorial", true),
            ("Set up the SQLite database", true),
        ],
    ),
    (
        "demo@example.com",
        &[
            ("Implement the REST API", false),
            ("Connect the frontend to the backend", false),
            ("Implement authentication", true),
        ],
    ),
];

/// Creates the demo accounts and their todos.
///
/// Accounts that already exist are left alone, so this can run on every
/// start. Returns the number of accounts created.
pub async fn seed_demo_data<S: TodoStore>(state: &AppState<S>) -> ServerResult<usize> {
    let accounts = AccountService::new(state);
    let mut created = 0;

    for (email, todos) in DEMO_ACCOUNTS {
        if state.store.get_user_by_email(email).await?.is_some() {
            tracing::debug!(email = %email, "Demo account already exists");
            continue;
        }

        let user = accounts.create_user(email, DEMO_PASSWORD).await?;
        for (title, completed) in todos.iter() {
            state
                .store
                .create_todo(Todo::new(user.id, *title).with_completed(*completed))
                .await?;
        }
        created += 1;
    }

    tracing::info!(created, "Demo data seeded");
    Ok(created)
}
