//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::signature::SignatureAlgorithm;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis connection URL; the in-memory store is used when unset
    pub redis_url: Option<String>,
    /// Per-command store timeout in milliseconds
    pub store_timeout_ms: u64,
    /// Lifetime of cached signatures and URLs in seconds, never zero
    pub signature_ttl: u64,
    /// Digest the media account verifies signatures with
    pub signature_algorithm: SignatureAlgorithm,
    /// Maximum number of identifiers kept in the upload registry
    pub max_stored: usize,
    /// Background sweep interval for the in-memory store, in seconds
    pub cleanup_interval: u64,
    /// Media CDN account name
    pub cloud_name: String,
    /// Media CDN API key, echoed to clients alongside signatures
    pub api_key: Option<String>,
    /// Shared secret used to sign upload parameters
    pub api_secret: Option<String>,
    /// Folder uploads are placed in (may be empty)
    pub folder: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REDIS_URL` - Redis URL (default: unset, in-memory store)
    /// - `STORE_TIMEOUT_MS` - Store command timeout (default: 2000)
    /// - `SIGNATURE_TTL` - Signature cache TTL in seconds (default: 3600, zero ignored)
    /// - `SIGNATURE_ALGORITHM` - `sha1` or `sha256` (default: sha1)
    /// - `MAX_STORED` - Upload registry cap (default: 100)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`,
    ///   `CLOUDINARY_API_SECRET`, `CLOUDINARY_FOLDER`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            redis_url: non_empty_var("REDIS_URL"),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS").unwrap_or(defaults.store_timeout_ms),
            signature_ttl: parse_var("SIGNATURE_TTL")
                .filter(|&ttl| ttl > 0)
                .unwrap_or(defaults.signature_ttl),
            signature_algorithm: parse_var("SIGNATURE_ALGORITHM")
                .unwrap_or(defaults.signature_algorithm),
            max_stored: parse_var("MAX_STORED").unwrap_or(defaults.max_stored),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            cloud_name: non_empty_var("CLOUDINARY_CLOUD_NAME").unwrap_or(defaults.cloud_name),
            api_key: non_empty_var("CLOUDINARY_API_KEY"),
            api_secret: non_empty_var("CLOUDINARY_API_SECRET"),
            folder: env::var("CLOUDINARY_FOLDER").unwrap_or_default(),
        }
    }

    /// Store command timeout as a Duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            redis_url: None,
            store_timeout_ms: 2000,
            signature_ttl: 3600,
            signature_algorithm: SignatureAlgorithm::Sha1,
            max_stored: 100,
            cleanup_interval: 1,
            cloud_name: "demo".to_string(),
            api_key: None,
            api_secret: None,
            folder: String::new(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.signature_ttl, 3600);
        assert_eq!(config.max_stored, 100);
        assert_eq!(config.store_timeout(), Duration::from_secs(2));
        assert!(config.redis_url.is_none());
        assert!(config.api_secret.is_none());
        assert_eq!(config.signature_algorithm, SignatureAlgorithm::Sha1);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("SERVER_PORT");
        env::remove_var("REDIS_URL");
        env::remove_var("SIGNATURE_TTL");
        env::remove_var("MAX_STORED");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.signature_ttl, 3600);
        assert_eq!(config.max_stored, 100);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_config_ignores_zero_signature_ttl() {
        env::set_var("SIGNATURE_TTL", "0");
        let config = Config::from_env();
        env::remove_var("SIGNATURE_TTL");

        assert_eq!(config.signature_ttl, 3600);
    }

    #[test]
    fn test_config_signature_algorithm() {
        env::set_var("SIGNATURE_ALGORITHM", "sha256");
        let config = Config::from_env();
        env::remove_var("SIGNATURE_ALGORITHM");

        assert_eq!(config.signature_algorithm, SignatureAlgorithm::Sha256);
    }
}
