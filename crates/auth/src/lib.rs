//! Authentication for the todo server.
//!
//! This crate provides:
//! - bcrypt password hashing and verification
//! - Opaque cookie sessions carrying a per-session CSRF token
//! - Session storage backends (in-memory, and SQLite behind the `sqlx` feature)

mod error;
mod password;
mod session;
mod session_store;

pub use error::*;
pub use password::*;
pub use session::*;
pub use session_store::*;

/// Default session lifetime in hours (two weeks).
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 336;
