//! Cookie sessions.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{AuthError, AuthResult};

/// Number of random bytes in session and CSRF tokens.
const TOKEN_BYTES: usize = 32;

/// A logged-in browser session.
///
/// `token` is the secret sent in the session cookie. Stores never persist it
/// directly; they key sessions by [`session_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Secret session token.
    pub token: String,
    /// User this session belongs to.
    pub user_id: Uuid,
    /// Token that mutating requests must echo back.
    pub csrf_token: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Starts a new session for a user.
    ///
    /// Fails when `ttl` pushes the expiry past the representable date range.
    pub fn new(user_id: Uuid, ttl: Duration) -> AuthResult<Self> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(AuthError::SessionTtlOutOfRange)?;

        Ok(Self {
            token: generate_token(),
            user_id,
            csrf_token: generate_token(),
            created_at: now,
            expires_at,
        })
    }

    /// Returns true once `expires_at` has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Checks a submitted CSRF token against this session's token.
    pub fn verify_csrf(&self, candidate: &str) -> bool {
        self.csrf_token.as_bytes().ct_eq(candidate.as_bytes()).into()
    }

    /// Storage key for this session.
    pub fn key(&self) -> String {
        session_key(&self.token)
    }
}

/// Generates a random URL-safe token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..TOKEN_BYTES).map(|_| rng.random::<u8>()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Derives the storage key for a session token.
pub fn session_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
