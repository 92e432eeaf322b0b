//! One-shot flash messages carried across a redirect.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

/// Name of the flash cookie.
pub const FLASH_COOKIE: &str = "todo_flash";

/// Flash messages set before a redirect.
///
/// Only the code travels in the cookie; the text is looked up when the
/// next page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
    LoggedIn,
    LoggedOut,
    LoginRequired,
}

impl Flash {
    /// Cookie value for this flash.
    pub fn code(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::LoggedIn => "logged_in",
            Self::LoggedOut => "logged_out",
            Self::LoginRequired => "login_required",
        }
    }

    /// Parses a cookie value.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "registered" => Some(Self::Registered),
            "logged_in" => Some(Self::LoggedIn),
            "logged_out" => Some(Self::LoggedOut),
            "login_required" => Some(Self::LoginRequired),
            _ => None,
        }
    }

    /// The message shown to the user.
    pub fn message(self) -> FlashMessage {
        match self {
            Self::Registered => FlashMessage::notice("Welcome! Your account has been created."),
            Self::LoggedIn => FlashMessage::notice("Logged in successfully."),
            Self::LoggedOut => FlashMessage::notice("Logged out."),
            Self::LoginRequired => FlashMessage::alert("Please log in first."),
        }
    }
}

/// How a flash message is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Notice,
    Alert,
}

/// A message ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Notice,
            text: text.into(),
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Alert,
            text: text.into(),
        }
    }
}

/// Stores a flash for the next page.
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Consumes the pending flash, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Option<FlashMessage>) {
    let Some(code) = jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_string()) else {
        return (jar, None);
    };

    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, Flash::from_code(&code).map(Flash::message))
}
