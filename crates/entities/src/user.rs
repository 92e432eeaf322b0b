//! User-related entity definitions.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ValidationErrors;

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Email address, unique across users.
    pub email: String,
    /// Hashed password. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user from an email and an already hashed password.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the capitalized local part of the email address.
    pub fn display_name(&self) -> String {
        let local = self.email.split('@').next().unwrap_or_default();
        let mut chars = local.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns true if the address looks like a deliverable email address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Registration form input.
#[derive(Clone, Default, Deserialize)]
pub struct Registration {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
    /// Repeated password.
    #[serde(default)]
    pub password_confirmation: String,
}

impl Registration {
    /// Creates a registration request.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirmation: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            password_confirmation: password_confirmation.into(),
        }
    }

    /// Validates the form. `email_taken` is the caller's uniqueness lookup
    /// for the normalized email.
    pub fn validate(&self, email_taken: bool) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = normalize_email(&self.email);

        if email.is_empty() {
            errors.add("Email", "can't be blank");
        }
        if email_taken {
            errors.add("Email", "has already been taken");
        }
        if !is_valid_email(&email) {
            errors.add("Email", "is invalid");
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.add(
                "Password",
                &format!("is too short (minimum is {PASSWORD_MIN_LEN} characters)"),
            );
        }
        if self.password_confirmation != self.password {
            errors.add("Password confirmation", "doesn't match Password");
        }
        if self.password_confirmation.is_empty() {
            errors.add("Password confirmation", "can't be blank");
        }

        errors.into_result()
    }
}

// Redacted so plaintext passwords never reach logs.
impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("test@example.com", "$2b$04$hash");

        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.display_name(), "Test");
    }

    #[test]
    fn test_display_name_capitalizes_local_part() {
        assert_eq!(User::new("jANE.doe@example.com", "").display_name(), "Jane.doe");
        assert_eq!(User::new("@example.com", "").display_name(), "");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new("test@example.com", "secret-hash");
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "test@example.com");
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn test_valid_registration() {
        let registration = Registration::new(" User@Example.com ", "secret1", "secret1");
        assert!(registration.validate(false).is_ok());
        assert_eq!(normalize_email(&registration.email), "user@example.com");
    }

    #[test]
    fn test_registration_collects_all_errors() {
        let registration = Registration::new("", "abc", "abd");
        let errors = registration.validate(false).unwrap_err();

        assert_eq!(
            errors.messages(),
            [
                "Email can't be blank",
                "Email is invalid",
                "Password is too short (minimum is 6 characters)",
                "Password confirmation doesn't match Password",
            ]
        );
    }

    #[test]
    fn test_registration_requires_confirmation() {
        let registration = Registration::new("user@example.com", "secret1", "");
        let errors = registration.validate(false).unwrap_err();

        assert_eq!(
            errors.messages(),
            [
                "Password confirmation doesn't match Password",
                "Password confirmation can't be blank",
            ]
        );
    }

    #[test]
    fn test_registration_reports_taken_email() {
        let registration = Registration::new("user@example.com", "secret1", "secret1");
        let errors = registration.validate(true).unwrap_err();

        assert_eq!(errors.messages(), ["Email has already been taken"]);
    }

    #[test]
    fn test_registration_debug_hides_password() {
        let registration = Registration::new("user@example.com", "secret1", "secret1");
        assert!(!format!("{registration:?}").contains("secret1"));
    }
}
