//! Store trait definitions.

use async_trait::async_trait;
use entities::{Todo, TodoStats, User};
use uuid::Uuid;

use crate::StoreResult;

/// Trait for user and todo storage operations.
///
/// Todo operations take the owner's ID alongside the todo ID; a todo that
/// exists but belongs to someone else behaves exactly like a missing one.
#[async_trait]
pub trait TodoStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user. Fails with `AlreadyExists` if the email is taken.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Gets a user by (normalized) email.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Deletes a user together with all of their todos.
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // Todo operations
    // =========================================================================

    /// Creates a new todo.
    async fn create_todo(&self, todo: Todo) -> StoreResult<Todo>;

    /// Gets one of the owner's todos by ID.
    async fn get_todo(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Todo>>;

    /// Lists the owner's todos, newest first.
    async fn list_todos(&self, owner_id: Uuid) -> StoreResult<Vec<Todo>>;

    /// Replaces the title, completion flag and `updated_at` of an owned todo.
    async fn update_todo(&self, todo: Todo) -> StoreResult<Todo>;

    /// Deletes one of the owner's todos.
    async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> StoreResult<()>;

    /// Computes statistics over the owner's todos.
    async fn todo_stats(&self, owner_id: Uuid) -> StoreResult<TodoStats>;
}
