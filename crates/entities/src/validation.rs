//! Validation error collection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A list of human-readable validation messages.
///
/// Messages are full sentences prefixed with the humanized attribute name,
/// e.g. `"Title can't be blank"`, so they can be shown to users verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    /// Creates an empty error list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for the given attribute.
    pub fn add(&mut self, attribute: &str, message: &str) {
        self.0.push(format!("{attribute} {message}"));
    }

    /// Records a message that is not tied to a single attribute.
    pub fn add_base(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Appends all messages from another list.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Returns true if no messages were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the recorded messages.
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// Converts into `Ok(())` when empty, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for Vec<String> {
    fn from(errors: ValidationErrors) -> Self {
        errors.0
    }
}
