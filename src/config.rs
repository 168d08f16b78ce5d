//! Configuration management for the VO cone search client.
//!
//! Settings are carried by an explicit [`Config`] value handed to the registry and
//! the cone search dispatcher; nothing here is process-wide mutable state.
//! [`Config::from_env`] reads overrides from environment variables (and a `.env`
//! file if present) on top of the documented defaults.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::time::Duration;

/// Default location of the remote catalog databases.
pub const DEFAULT_VOS_BASEURL: &str = "http://stsdss1.stsci.edu/astrolib/vo_databases/";

/// Default catalog database used by cone searches.
pub const DEFAULT_CONESEARCH_DBNAME: &str = "conesearch_good";

/// Configuration for the VO cone search client.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL the `<name>.json` catalog databases are fetched from
    pub vos_baseurl: String,

    /// Catalog database used when a cone search names no catalog (default: "conesearch_good")
    pub conesearch_dbname: String,

    /// Timeout for remote operations in seconds (default: 3)
    pub remote_timeout: u64,

    /// How long fetched databases stay cached, in minutes (default: 0, the process lifetime)
    pub cache_ttl_minutes: u64,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `VO_REGISTRY_BASE_URL`: Base URL of the catalog databases
    /// - `CONESEARCH_DBNAME`: Default cone search database (default: "conesearch_good")
    /// - `REMOTE_TIMEOUT`: Remote timeout in seconds (default: 3)
    /// - `VO_CACHE_TTL_MINUTES`: Database cache TTL in minutes, 0 keeps them forever (default: 0)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let vos_baseurl = env::var("VO_REGISTRY_BASE_URL").unwrap_or(defaults.vos_baseurl);
        let conesearch_dbname =
            env::var("CONESEARCH_DBNAME").unwrap_or(defaults.conesearch_dbname);
        let remote_timeout = Self::parse_env_u64("REMOTE_TIMEOUT", defaults.remote_timeout)?;
        let cache_ttl_minutes =
            Self::parse_env_u64("VO_CACHE_TTL_MINUTES", defaults.cache_ttl_minutes)?;
        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        let config = Config {
            vos_baseurl,
            conesearch_dbname,
            remote_timeout,
            cache_ttl_minutes,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check field values, reporting the environment variable that sets the bad one.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.vos_baseurl.starts_with("http://") && !self.vos_baseurl.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "VO_REGISTRY_BASE_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        if self.conesearch_dbname.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "CONESEARCH_DBNAME".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        if self.remote_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                var: "REMOTE_TIMEOUT".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Replace the registry base URL.
    pub fn with_vos_baseurl(mut self, url: impl Into<String>) -> Self {
        self.vos_baseurl = url.into();
        self
    }

    /// Replace the default cone search database name.
    pub fn with_conesearch_dbname(mut self, name: impl Into<String>) -> Self {
        self.conesearch_dbname = name.into();
        self
    }

    /// Replace the remote timeout (seconds).
    pub fn with_remote_timeout(mut self, seconds: u64) -> Self {
        self.remote_timeout = seconds;
        self
    }

    /// Remote timeout as a `Duration`.
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout)
    }

    /// Cache TTL, `None` when databases are kept for the process lifetime.
    pub fn cache_ttl(&self) -> Option<Duration> {
        if self.cache_ttl_minutes == 0 {
            None
        } else {
            Some(Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60)))
        }
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vos_baseurl: DEFAULT_VOS_BASEURL.to_string(),
            conesearch_dbname: DEFAULT_CONESEARCH_DBNAME.to_string(),
            remote_timeout: 3,
            cache_ttl_minutes: 0,
            log_level: "error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    // Helper to set and unset env vars for testing
    struct EnvGuard {
        vars: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.vars.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.vos_baseurl, DEFAULT_VOS_BASEURL);
        assert_eq!(config.conesearch_dbname, "conesearch_good");
        assert_eq!(config.remote_timeout, 3);
        assert_eq!(config.cache_ttl(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = Config::default()
            .with_vos_baseurl("https://example.org/dbs/")
            .with_conesearch_dbname("conesearch_simple")
            .with_remote_timeout(30);

        assert_eq!(config.vos_baseurl, "https://example.org/dbs/");
        assert_eq!(config.conesearch_dbname, "conesearch_simple");
        assert_eq!(config.remote_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_cache_ttl_minutes() {
        let config = Config {
            cache_ttl_minutes: 2,
            ..Config::default()
        };
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(120)));

        let huge = Config {
            cache_ttl_minutes: u64::MAX,
            ..Config::default()
        };
        assert_eq!(huge.cache_ttl(), Some(Duration::from_secs(u64::MAX)));
    }

    #[test]
    #[serial]
    fn test_config_from_env_invalid_url() {
        let mut guard = EnvGuard::new();
        guard.set("VO_REGISTRY_BASE_URL", "not-a-url");

        let result = Config::from_env();
        assert!(result.is_err());
        if let Err(ConfigError::InvalidValue { var, .. }) = result {
            assert_eq!(var, "VO_REGISTRY_BASE_URL");
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_zero_timeout() {
        let mut guard = EnvGuard::new();
        guard.set("REMOTE_TIMEOUT", "0");

        match Config::from_env() {
            Err(ConfigError::InvalidValue { var, .. }) => assert_eq!(var, "REMOTE_TIMEOUT"),
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_empty_dbname() {
        let mut guard = EnvGuard::new();
        guard.set("CONESEARCH_DBNAME", "   ");

        match Config::from_env() {
            Err(ConfigError::InvalidValue { var, .. }) => assert_eq!(var, "CONESEARCH_DBNAME"),
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_valid() {
        let mut guard = EnvGuard::new();
        guard.set("VO_REGISTRY_BASE_URL", "https://example.org/vo_databases/");
        guard.set("CONESEARCH_DBNAME", "conesearch_simple");
        guard.set("REMOTE_TIMEOUT", "10");
        guard.set("VO_CACHE_TTL_MINUTES", "5");

        let config = Config::from_env().unwrap();
        assert_eq!(config.vos_baseurl, "https://example.org/vo_databases/");
        assert_eq!(config.conesearch_dbname, "conesearch_simple");
        assert_eq!(config.remote_timeout, 10);
        assert_eq!(config.cache_ttl_minutes, 5);
    }

    #[test]
    #[serial]
    fn test_parse_env_u64() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_VO_U64", "42");

        let result = Config::parse_env_u64("TEST_VO_U64", 10);
        assert_eq!(result.unwrap(), 42);

        let result = Config::parse_env_u64("NONEXISTENT_VO_VAR", 10);
        assert_eq!(result.unwrap(), 10);
    }

    #[test]
    #[serial]
    fn test_parse_env_u64_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_VO_U64_INVALID", "not-a-number");

        let result = Config::parse_env_u64("TEST_VO_U64_INVALID", 10);
        assert!(result.is_err());
    }
}
