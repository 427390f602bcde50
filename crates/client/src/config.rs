//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AGRILINK_API_URL` - Base URL of the AgriLink backend
//!
//! ## Optional
//! - `AGRILINK_TOKEN_FILE` - Where session tokens are persisted
//!   (default: `$HOME/.agrilink/session.json`)
//! - `AGRILINK_ESCROW_CONTRACT` - Deployed escrow contract address for
//!   crypto checkout (`0x` + 40 hex chars)
//! - `AGRILINK_EMAIL` / `AGRILINK_PASSWORD` - Credentials for scripted
//!   (non-interactive) login
//! - `AGRILINK_CACHE_TTL_SECS` - Read-cache time-to-live (default: 300)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::session::FileTokenStore;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// AgriLink client configuration.
#[derive(Debug, Clone)]
pub struct AgriLinkConfig {
    /// Base URL of the backend API.
    pub api_url: Url,
    /// Path where session tokens are persisted.
    pub token_file: PathBuf,
    /// Escrow contract address for crypto payments, when configured.
    pub escrow_contract: Option<String>,
    /// Email for scripted login.
    pub login_email: Option<String>,
    /// Password for scripted login (redacted in `Debug` via `SecretString`).
    pub login_password: Option<SecretString>,
    /// Read-cache time-to-live in seconds.
    pub cache_ttl_secs: u64,
}

impl AgriLinkConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("AGRILINK_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("AGRILINK_API_URL".to_string(), e.to_string()))?;

        let token_file = get_optional_env("AGRILINK_TOKEN_FILE")
            .map_or_else(default_token_file, PathBuf::from);

        let escrow_contract = get_optional_env("AGRILINK_ESCROW_CONTRACT");
        if let Some(addr) = &escrow_contract {
            validate_contract_address(addr)?;
        }

        let cache_ttl_secs = match get_optional_env("AGRILINK_CACHE_TTL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("AGRILINK_CACHE_TTL_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            api_url,
            token_file,
            escrow_contract,
            login_email: get_optional_env("AGRILINK_EMAIL"),
            login_password: get_optional_env("AGRILINK_PASSWORD").map(SecretString::from),
            cache_ttl_secs,
        })
    }

    /// Token store backed by the configured token file.
    #[must_use]
    pub fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(self.token_file.clone())
    }
}

/// Default token file location under the user's home directory.
fn default_token_file() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(".agrilink-session.json"),
        |home| {
            let mut path = PathBuf::from(home);
            path.push(".agrilink");
            path.push("session.json");
            path
        },
    )
}

/// Validate an EVM contract address: `0x` followed by 40 hex characters.
fn validate_contract_address(addr: &str) -> Result<(), ConfigError> {
    let hex = addr.strip_prefix("0x").ok_or_else(|| {
        ConfigError::InvalidEnvVar(
            "AGRILINK_ESCROW_CONTRACT".to_string(),
            "must start with 0x".to_string(),
        )
    })?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidEnvVar(
            "AGRILINK_ESCROW_CONTRACT".to_string(),
            "must be 0x followed by 40 hex characters".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
