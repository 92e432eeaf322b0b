//! Server configuration.

use std::env;

use auth::{DEFAULT_BCRYPT_COST, DEFAULT_SESSION_TTL_HOURS, MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// `DATABASE_URL` value that selects the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

const DEFAULT_DATABASE_URL: &str = "sqlite:todos.db?mode=rwc";
const DEFAULT_PORT: u16 = 3000;

/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL, or `memory` for the in-memory store.
    pub database_url: String,
    /// Session lifetime in hours.
    pub session_ttl_hours: i64,
    /// Whether cookies are marked `Secure`.
    pub secure_cookies: bool,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
    /// Whether to create the demo accounts at startup.
    pub seed_demo_data: bool,
    /// Log level.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            secure_cookies: false,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            seed_demo_data: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let database_url = match lookup("DATABASE_URL") {
            Some(url) if url.trim().is_empty() => {
                anyhow::bail!("DATABASE_URL must not be empty")
            }
            Some(url) => url.trim().to_string(),
            None => defaults.database_url,
        };

        let session_ttl_hours = lookup("TODOAPP_SESSION_TTL_HOURS")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|hours| (1..=MAX_SESSION_TTL_HOURS).contains(hours))
            .unwrap_or(defaults.session_ttl_hours);

        let bcrypt_cost = lookup("TODOAPP_BCRYPT_COST")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.bcrypt_cost)
            .clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST);

        Ok(Self {
            host: lookup("TODOAPP_SERVER_HOST").unwrap_or(defaults.host),
            port: lookup("TODOAPP_SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_url,
            session_ttl_hours,
            secure_cookies: lookup("TODOAPP_SECURE_COOKIES")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.secure_cookies),
            bcrypt_cost,
            seed_demo_data: lookup("TODOAPP_SEED_DEMO_DATA")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.seed_demo_data),
            log_level: lookup("TODOAPP_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if the in-memory store was requested.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.eq_ignore_ascii_case(MEMORY_DATABASE_URL)
    }

    /// Returns the session lifetime.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.session_ttl_hours.min(MAX_SESSION_TTL_HOURS))
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
