//! SQLite store implementation.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use entities::{Todo, TodoStats, User};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    FromRow,
};
use uuid::Uuid;

use crate::{StoreError, StoreResult, TodoStore};

/// Schema for the users and todos tables.
///
/// Timestamps are stored as fixed-width RFC 3339 text so that lexical order
/// matches chronological order.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS todos (
    id TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 255),
    completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_todos_user_id_created_at
    ON todos (user_id, created_at);
"#;

/// Database row for User
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            email: row.email,
            password_hash: row.password_hash,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Database row for Todo
#[derive(Debug, FromRow)]
struct TodoRow {
    id: String,
    user_id: String,
    title: String,
    completed: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(Todo {
            id: parse_uuid(&row.id)?,
            title: row.title,
            completed: row.completed,
            owner_id: parse_uuid(&row.user_id)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_uuid(value: &str) -> StoreResult<Uuid> {
    value
        .parse()
        .map_err(|_| StoreError::CorruptRow(format!("invalid id: {value}")))
}

fn parse_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::CorruptRow(format!("invalid timestamp: {value}")))
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    /// Connects to the database at `database_url`, creating the file if needed.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite memory connection is its own database.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("Todo store schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(format_timestamp(&user.created_at))
        .bind(format_timestamp(&user.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::already_exists("User", user.email.clone())
            }
            e => StoreError::Database(e),
        })?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password_hash, created_at, updated_at
             FROM users
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, password_hash, created_at, updated_at
             FROM users
             WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Todo operations
    // =========================================================================

    async fn create_todo(&self, todo: Todo) -> StoreResult<Todo> {
        sqlx::query(
            "INSERT INTO todos (id, user_id, title, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(todo.id.to_string())
        .bind(todo.owner_id.to_string())
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(format_timestamp(&todo.created_at))
        .bind(format_timestamp(&todo.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::not_found("User", todo.owner_id.to_string())
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::already_exists("Todo", todo.id.to_string())
            }
            e => StoreError::Database(e),
        })?;

        Ok(todo)
    }

    async fn get_todo(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Todo>> {
        let row: Option<TodoRow> = sqlx::query_as(
            "SELECT id, user_id, title, completed, created_at, updated_at
             FROM todos
             WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Todo::try_from).transpose()
    }

    async fn list_todos(&self, owner_id: Uuid) -> StoreResult<Vec<Todo>> {
        let rows: Vec<TodoRow> = sqlx::query_as(
            "SELECT id, user_id, title, completed, created_at, updated_at
             FROM todos
             WHERE user_id = ?
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn update_todo(&self, todo: Todo) -> StoreResult<Todo> {
        let result = sqlx::query(
            "UPDATE todos SET title = ?, completed = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(format_timestamp(&todo.updated_at))
        .bind(todo.id.to_string())
        .bind(todo.owner_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Todo", todo.id.to_string()));
        }
        Ok(todo)
    }

    async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(owner_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Todo", id.to_string()));
        }
        Ok(())
    }

    async fn todo_stats(&self, owner_id: Uuid) -> StoreResult<TodoStats> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(completed), 0)
             FROM todos
             WHERE user_id = ?",
        )
        .bind(owner_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(TodoStats::from_counts(
            u64::try_from(total).unwrap_or_default(),
            u64::try_from(completed).unwrap_or_default(),
        ))
    }
}
