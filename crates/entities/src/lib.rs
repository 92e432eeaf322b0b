//! Core entity definitions for the to-do service.
//!
//! This crate defines the data types shared by the store, the auth layer and
//! the HTTP server: users, to-do items, their aggregate statistics, and the
//! validation rules both entities must satisfy before they are persisted.

mod stats;
mod todo;
mod user;
mod validation;

pub use stats::*;
pub use todo::*;
pub use user::*;
pub use validation::*;
