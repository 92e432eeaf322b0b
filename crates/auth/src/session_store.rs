//! Session storage
//!
//! Sessions are keyed by [`session_key`] so the raw cookie token never
//! reaches storage. Supports in-memory (for testing) and SQLite storage.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{session_key, AuthError, AuthResult, Session};

/// Trait for session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session, replacing any session with the same token
    async fn insert(&self, session: &Session) -> AuthResult<()>;

    /// Look up a session by its cookie token
    ///
    /// Expired sessions are returned as-is; callers decide what to do
    /// with them.
    async fn get(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Remove a session by its cookie token
    async fn remove(&self, token: &str) -> AuthResult<()>;

    /// Remove every session belonging to a user
    ///
    /// Returns the number of sessions removed.
    async fn remove_for_user(&self, user_id: Uuid) -> AuthResult<usize>;

    /// Remove expired sessions (cleanup task)
    ///
    /// Returns the number of sessions removed.
    async fn cleanup_expired(&self) -> AuthResult<usize>;
}

/// In-memory session store (for testing and single-process mode)
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> AuthError {
    AuthError::Storage(format!("Lock poisoned: {}", e))
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &Session) -> AuthResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(session.key(), session.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> AuthResult<Option<Session>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(&session_key(token)).cloned())
    }

    async fn remove(&self, token: &str) -> AuthResult<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(&session_key(token));
        Ok(())
    }

    async fn remove_for_user(&self, user_id: Uuid) -> AuthResult<usize> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let before_count = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok(before_count - sessions.len())
    }

    async fn cleanup_expired(&self) -> AuthResult<usize> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let before_count = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        Ok(before_count - sessions.len())
    }
}

#[cfg(feature = "sqlx")]
pub use sqlx_store::*;

#[cfg(feature = "sqlx")]
mod sqlx_store {
    use chrono::{DateTime, SecondsFormat, Utc};
    use sqlx::{Pool, Sqlite};

    use super::*;

    fn format_timestamp(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(value: &str) -> AuthResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AuthError::Storage(format!("Invalid session timestamp: {}", e)))
    }

    /// SQLite session store
    #[derive(Clone)]
    pub struct SqliteSessionStore {
        pool: Pool<Sqlite>,
    }

    impl SqliteSessionStore {
        /// Create a new SQLite store
        pub fn new(pool: Pool<Sqlite>) -> Self {
            Self { pool }
        }

        /// Initialize the database table
        pub async fn init(&self) -> AuthResult<()> {
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS sessions (
                    session_key TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    csrf_token TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    expires_at TEXT NOT NULL
                )
                "#,
            )
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to create sessions table: {}", e)))?;

            // Create indexes for logout-everywhere and cleanup queries
            sqlx::query(
                r#"
                CREATE INDEX IF NOT EXISTS idx_sessions_user_id
                ON sessions (user_id)
                "#,
            )
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to create index: {}", e)))?;

            sqlx::query(
                r#"
                CREATE INDEX IF NOT EXISTS idx_sessions_expires_at
                ON sessions (expires_at)
                "#,
            )
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to create index: {}", e)))?;

            Ok(())
        }
    }

    #[async_trait]
    impl SessionStore for SqliteSessionStore {
        async fn insert(&self, session: &Session) -> AuthResult<()> {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO sessions (session_key, user_id, csrf_token, created_at, expires_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(session.key())
            .bind(session.user_id.to_string())
            .bind(&session.csrf_token)
            .bind(format_timestamp(&session.created_at))
            .bind(format_timestamp(&session.expires_at))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to store session: {}", e)))?;
            Ok(())
        }

        async fn get(&self, token: &str) -> AuthResult<Option<Session>> {
            let row: Option<(String, String, String, String)> = sqlx::query_as(
                r#"
                SELECT user_id, csrf_token, created_at, expires_at
                FROM sessions
                WHERE session_key = ?
                "#,
            )
            .bind(session_key(token))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to retrieve session: {}", e)))?;

            let Some((user_id, csrf_token, created_at, expires_at)) = row else {
                return Ok(None);
            };

            let user_id = user_id
                .parse()
                .map_err(|e| AuthError::Storage(format!("Invalid session user id: {}", e)))?;

            Ok(Some(Session {
                token: token.to_string(),
                user_id,
                csrf_token,
                created_at: parse_timestamp(&created_at)?,
                expires_at: parse_timestamp(&expires_at)?,
            }))
        }

        async fn remove(&self, token: &str) -> AuthResult<()> {
            sqlx::query("DELETE FROM sessions WHERE session_key = ?")
                .bind(session_key(token))
                .execute(&self.pool)
                .await
                .map_err(|e| AuthError::Storage(format!("Failed to delete session: {}", e)))?;
            Ok(())
        }

        async fn remove_for_user(&self, user_id: Uuid) -> AuthResult<usize> {
            let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AuthError::Storage(format!("Failed to delete sessions: {}", e)))?;

            Ok(result.rows_affected() as usize)
        }

        async fn cleanup_expired(&self) -> AuthResult<usize> {
            let now = format_timestamp(&Utc::now());
            let result = sqlx::query(
                r#"
                DELETE FROM sessions
                WHERE expires_at <= ?
                "#,
            )
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AuthError::Storage(format!("Failed to cleanup expired sessions: {}", e))
            })?;

            Ok(result.rows_affected() as usize)
        }
    }
}
