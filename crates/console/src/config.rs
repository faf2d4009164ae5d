//! Harness configuration loaded from environment variables.

use std::path::PathBuf;

/// Harness configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `CHECKOUT_SESSION`: path of the session file (default: `"session.json"`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
///
/// Pricing settings are read separately by `CheckoutConfig::from_env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub session_path: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            session_path: lookup("CHECKOUT_SESSION")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_path: PathBuf::from("session.json"),
            log_level: "info".to_string(),
        }
    }
}
