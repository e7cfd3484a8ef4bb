// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup; the JWT secret lives here and nowhere else.

use std::env;
use std::str::FromStr;

/// Lowest work factor bcrypt accepts; keeps test hashing fast.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Which storage engine backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Storage engine
    pub storage: StorageBackend,
    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
    /// Reject refresh tokens whose session is unknown or already revoked.
    pub reject_revoked_refresh_tokens: bool,

    // --- Secrets ---
    /// HS256 secret for access and refresh tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            storage: StorageBackend::Memory,
            bcrypt_cost: MIN_BCRYPT_COST,
            reject_revoked_refresh_tokens: false,
            jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?
            .into_bytes();

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StorageBackend::Firestore,
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("BCRYPT_COST"))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            storage,
            bcrypt_cost,
            reject_revoked_refresh_tokens: env::var("REJECT_REVOKED_REFRESH_TOKENS")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
            jwt_secret,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so everything touching them lives in one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var("JWT_SECRET");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));

        env::set_var("JWT_SECRET", "   ");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));

        env::set_var("JWT_SECRET", "test_jwt_secret_32_bytes_minimum!");
        env::set_var("STORAGE_BACKEND", "memory");
        env::set_var("BCRYPT_COST", "5");
        env::set_var("REJECT_REVOKED_REFRESH_TOKENS", "true");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_secret, b"test_jwt_secret_32_bytes_minimum!");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.bcrypt_cost, 5);
        assert!(config.reject_revoked_refresh_tokens);

        env::set_var("STORAGE_BACKEND", "postgres");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("STORAGE_BACKEND"))
        ));

        env::remove_var("STORAGE_BACKEND");
        env::remove_var("BCRYPT_COST");
        env::remove_var("REJECT_REVOKED_REFRESH_TOKENS");
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StorageBackend>().unwrap(),
            StorageBackend::Firestore
        );
        assert_eq!(
            " memory ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
