//! Todo operations scoped to the current user.

use entities::{Todo, TodoChanges, TodoStats, User, ValidationErrors, validate_title};
use todo_store::TodoStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};

/// Todo operations.
///
/// Every operation takes the current user explicitly. Without a user the
/// scope is empty: lists are empty, lookups miss and creates fail
/// validation.
pub struct TodoService<'a, S: TodoStore> {
    store: &'a S,
}

impl<'a, S: TodoStore> TodoService<'a, S> {
    /// Creates a service over the given store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Lists the owner's todos, newest first.
    pub async fn list(&self, owner: Option<&User>) -> ServerResult<Vec<Todo>> {
        match owner {
            Some(owner) => Ok(self.store.list_todos(owner.id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Computes the owner's statistics.
    pub async fn stats(&self, owner: Option<&User>) -> ServerResult<TodoStats> {
        match owner {
            Some(owner) => Ok(self.store.todo_stats(owner.id).await?),
            None => Ok(TodoStats::default()),
        }
    }

    /// Fetches one of the owner's todos.
    ///
    /// A malformed id and someone else's todo both read as "not found".
    pub async fn get(&self, owner: Option<&User>, id: &str) -> ServerResult<Todo> {
        let (Some(owner), Some(id)) = (owner, parse_id(id)) else {
            return Err(ServerError::todo_not_found());
        };

        self.store
            .get_todo(owner.id, id)
            .await?
            .ok_or_else(ServerError::todo_not_found)
    }

    /// Creates a todo owned by `owner`.
    pub async fn create(&self, owner: Option<&User>, changes: TodoChanges) -> ServerResult<Todo> {
        let title = changes.title.unwrap_or_default();

        let mut errors = ValidationErrors::new();
        if owner.is_none() {
            errors.add_base("User must exist");
        }
        errors.extend(validate_title(&title));

        let owner = match owner {
            Some(owner) if errors.is_empty() => owner,
            _ => return Err(errors.into()),
        };

        let todo = Todo::new(owner.id, title).with_completed(changes.completed.unwrap_or(false));
        let todo = self.store.create_todo(todo).await?;

        tracing::info!(todo_id = %todo.id, owner_id = %owner.id, "Todo created");
        Ok(todo)
    }

    /// Applies a partial update to one of the owner's todos.
    pub async fn update(
        &self,
        owner: Option<&User>,
        id: &str,
        changes: TodoChanges,
    ) -> ServerResult<Todo> {
        let mut todo = self.get(owner, id).await?;
        todo.apply(changes);
        todo.validate()?;

        let todo = self.store.update_todo(todo).await.map_err(not_found_as_todo)?;

        tracing::info!(todo_id = %todo.id, completed = todo.completed, "Todo updated");
        Ok(todo)
    }

    /// Deletes one of the owner's todos.
    pub async fn delete(&self, owner: Option<&User>, id: &str) -> ServerResult<()> {
        let (Some(owner), Some(todo_id)) = (owner, parse_id(id)) else {
            return Err(ServerError::todo_not_found());
        };

        self.store
            .delete_todo(owner.id, todo_id)
            .await
            .map_err(not_found_as_todo)?;

        tracing::info!(todo_id = %todo_id, "Todo deleted");
        Ok(())
    }
}

fn parse_id(id: &str) -> Option<Uuid> {
    id.parse().ok()
}

fn not_found_as_todo(error: todo_store::StoreError) -> ServerError {
    if error.is_not_found() {
        ServerError::todo_not_found()
    } else {
        error.into()
    }
}
