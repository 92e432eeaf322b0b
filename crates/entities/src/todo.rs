//! Todo entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ValidationErrors;

/// Maximum number of characters allowed in a todo title.
pub const TITLE_MAX_CHARS: usize = 255;

/// A personal to-do item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier.
    pub id: Uuid,
    /// Short description of the item.
    pub title: String,
    /// Whether the item is done.
    pub completed: bool,
    /// Owning user ID.
    pub owner_id: Uuid,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new, not yet completed todo for the given owner.
    pub fn new(owner_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the completion flag.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Checks the title constraints.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_title(&self.title).into_result()
    }

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// The result is not validated; call [`Todo::validate`] before persisting.
    pub fn apply(&mut self, changes: TodoChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}

/// Fields accepted when creating or updating a todo.
///
/// Absent fields are left untouched on update; on create a missing title is
/// a validation error and a missing `completed` defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoChanges {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New completion flag.
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TodoChanges {
    /// Changes that only set the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    /// Changes that only set the completion flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

/// Collects the validation messages for a todo title.
pub fn validate_title(title: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if title.trim().is_empty() {
        errors.add("Title", "can't be blank");
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "Title",
            &format!("is too long (maximum is {TITLE_MAX_CHARS} characters)"),
        );
    }
    errors
}
