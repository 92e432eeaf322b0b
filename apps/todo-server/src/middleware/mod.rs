//! HTTP middleware.

pub mod session;

pub use session::{CurrentSession, MaybeUser};
