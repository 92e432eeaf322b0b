//! Business logic shared by the API and page handlers.

pub mod accounts;
pub mod seed;
pub mod todos;

pub use accounts::AccountService;
pub use todos::TodoService;
