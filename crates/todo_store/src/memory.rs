//! In-memory store implementation for testing.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use entities::{Todo, TodoStats, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{StoreError, StoreResult, TodoStore};

/// A todo plus its insertion sequence, used to order same-instant inserts.
#[derive(Debug, Clone)]
struct StoredTodo {
    seq: u64,
    todo: Todo,
}

/// In-memory store for tests and throwaway instances.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    todos: Arc<RwLock<HashMap<Uuid, StoredTodo>>>,
    next_seq: AtomicU64,
}

impl MemoryTodoStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::already_exists("User", user.id.to_string()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::already_exists("User", user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.remove(&id).is_none() {
            return Err(StoreError::not_found("User", id.to_string()));
        }
        drop(users);

        let mut todos = self.todos.write().await;
        todos.retain(|_, stored| stored.todo.owner_id != id);
        Ok(())
    }

    // =========================================================================
    // Todo operations
    // =========================================================================

    async fn create_todo(&self, todo: Todo) -> StoreResult<Todo> {
        if !self.users.read().await.contains_key(&todo.owner_id) {
            return Err(StoreError::not_found("User", todo.owner_id.to_string()));
        }

        let mut todos = self.todos.write().await;
        if todos.contains_key(&todo.id) {
            return Err(StoreError::already_exists("Todo", todo.id.to_string()));
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        todos.insert(
            todo.id,
            StoredTodo {
                seq,
                todo: todo.clone(),
            },
        );
        Ok(todo)
    }

    async fn get_todo(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos
            .get(&id)
            .filter(|stored| stored.todo.owner_id == owner_id)
            .map(|stored| stored.todo.clone()))
    }

    async fn list_todos(&self, owner_id: Uuid) -> StoreResult<Vec<Todo>> {
        let todos = self.todos.read().await;
        let mut owned: Vec<&StoredTodo> = todos
            .values()
            .filter(|stored| stored.todo.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| {
            b.todo
                .created_at
                .cmp(&a.todo.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(owned.into_iter().map(|stored| stored.todo.clone()).collect())
    }

    async fn update_todo(&self, todo: Todo) -> StoreResult<Todo> {
        let mut todos = self.todos.write().await;
        match todos.get_mut(&todo.id) {
            Some(stored) if stored.todo.owner_id == todo.owner_id => {
                stored.todo.title = todo.title.clone();
                stored.todo.completed = todo.completed;
                stored.todo.updated_at = todo.updated_at;
                Ok(stored.todo.clone())
            }
            _ => Err(StoreError::not_found("Todo", todo.id.to_string())),
        }
    }

    async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> StoreResult<()> {
        let mut todos = self.todos.write().await;
        let owned = todos
            .get(&id)
            .is_some_and(|stored| stored.todo.owner_id == owner_id);
        if !owned {
            return Err(StoreError::not_found("Todo", id.to_string()));
        }
        todos.remove(&id);
        Ok(())
    }

    async fn todo_stats(&self, owner_id: Uuid) -> StoreResult<TodoStats> {
        let todos = self.todos.read().await;
        Ok(TodoStats::from_todos(
            todos
                .values()
                .map(|stored| &stored.todo)
                .filter(|todo| todo.owner_id == owner_id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    async fn store_with_user(email: &str) -> (MemoryTodoStore, User) {
        let store = MemoryTodoStore::new();
        let user = store
            .create_user(User::new(email, "hash"))
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_todo_crud() {
        let (store, user) = store_with_user("owner@example.com").await;

        // Create
        let created = assert_ok!(store.create_todo(Todo::new(user.id, "Buy milk")).await);
        assert!(!created.completed);

        // Get
        let fetched = store.get_todo(user.id, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        // Update
        let mut changed = fetched.clone();
        changed.completed = true;
        let updated = assert_ok!(store.update_todo(changed).await);
        assert!(updated.completed);

        // Delete
        assert_ok!(store.delete_todo(user.id, created.id).await);
        assert!(store.get_todo(user.id, created.id).await.unwrap().is_none());
        let err = assert_err!(store.delete_todo(user.id, created.id).await);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (store, user) = store_with_user("owner@example.com").await;
        for title in ["a", "b", "c"] {
            store.create_todo(Todo::new(user.id, title)).await.unwrap();
        }

        let titles: Vec<String> = store
            .list_todos(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.title)
            .collect();
        assert_eq!(titles, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_todos_are_scoped_to_owner() {
        let (store, alice) = store_with_user("alice@example.com").await;
        let bob = store
            .create_user(User::new("bob@example.com", "hash"))
            .await
            .unwrap();
        let todo = store
            .create_todo(Todo::new(alice.id, "secret plan"))
            .await
            .unwrap();

        assert!(store.get_todo(bob.id, todo.id).await.unwrap().is_none());
        assert!(store.list_todos(bob.id).await.unwrap().is_empty());

        let mut hijacked = todo.clone();
        hijacked.owner_id = bob.id;
        hijacked.title = "mine now".to_string();
        assert!(store.update_todo(hijacked).await.unwrap_err().is_not_found());
        assert!(store.delete_todo(bob.id, todo.id).await.unwrap_err().is_not_found());

        let still_there = store.get_todo(alice.id, todo.id).await.unwrap().unwrap();
        assert_eq!(still_there.title, "secret plan");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (store, _) = store_with_user("dup@example.com").await;
        let err = store
            .create_user(User::new("dup@example.com", "hash"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let (store, user) = store_with_user("gone@example.com").await;
        let todo = store.create_todo(Todo::new(user.id, "x")).await.unwrap();

        store.delete_user(user.id).await.unwrap();

        assert!(store.get_user(user.id).await.unwrap().is_none());
        assert!(store.get_todo(user.id, todo.id).await.unwrap().is_none());
        assert_eq!(store.todo_stats(user.id).await.unwrap(), TodoStats::default());
    }

    #[tokio::test]
    async fn test_stats() {
        let (store, user) = store_with_user("stats@example.com").await;
        store
            .create_todo(Todo::new(user.id, "done").with_completed(true))
            .await
            .unwrap();
        store.create_todo(Todo::new(user.id, "open")).await.unwrap();

        let stats = store.todo_stats(user.id).await.unwrap();
        assert_eq!(stats, TodoStats::from_counts(2, 1));
        assert_eq!(stats.completion_rate, 50.0);
    }
}
