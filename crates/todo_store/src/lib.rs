//! User and todo storage for the to-do service.
//!
//! This crate provides a storage abstraction for users and their todos. It
//! ships an in-memory backend (tests, throwaway instances) and a SQLite
//! backend for persistent deployments. Every todo query is keyed by its
//! owner, so a store never hands out another user's records.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
