//! Configuration management for pimp.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "pimp";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "directory.db";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "PIMP_";

/// Site name used when no configuration is at hand (error pages).
pub const DEFAULT_SITE_NAME: &str = "P.I.M.P Business Repository";

static COOKIE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid regex pattern"));

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PIMP_`, sections split by `__`)
/// 2. TOML config file at `~/.config/pimp/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Site presentation configuration.
    pub site: SiteConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory with the static assets served under `/public`.
    pub static_dir: PathBuf,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/pimp/directory.db`
    pub database_path: Option<PathBuf>,
    /// Load the sample directory when the database is empty.
    pub seed_demo_data: bool,
}

/// Site presentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name shown in titles, header and footer.
    pub name: String,
    /// Short line under the site name on the home page.
    pub tagline: String,
    /// Contact address shown in the footer.
    pub support_email: String,
    /// Business cards per directory/search page.
    pub per_page: usize,
    /// Reviews per reviews page.
    pub reviews_per_page: usize,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Session lifetime in hours.
    pub session_ttl_hours: u32,
    /// Minimum accepted password length.
    pub min_password_length: usize,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/public")),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved to the data dir at runtime
            seed_demo_data: true,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SITE_NAME.to_string(),
            tagline: "Find businesses you can trust.".to_string(),
            support_email: "support@pimp.example".to_string(),
            per_page: 12,
            reviews_per_page: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "pimp_session".to_string(),
            session_ttl_hours: 24 * 14,
            min_password_length: 8,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.site.per_page == 0 || self.site.reviews_per_page == 0 {
            return Err(Error::ConfigValidation {
                message: "site.per_page and site.reviews_per_page must be greater than 0"
                    .to_string(),
            });
        }

        if self.auth.min_password_length < 6 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "auth.min_password_length ({}) must be at least 6",
                    self.auth.min_password_length
                ),
            });
        }

        if !COOKIE_NAME_RE.is_match(&self.auth.cookie_name) {
            return Err(Error::ConfigValidation {
                message: format!("invalid cookie name: {:?}", self.auth.cookie_name),
            });
        }

        if self.auth.session_ttl_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "auth.session_ttl_hours must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// The socket address to bind, if `server.host` parses.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::ConfigValidation {
                message: format!("invalid server.host {:?}: {e}", self.server.host),
            })
    }

    /// Get the session lifetime as a Duration.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.auth.session_ttl_hours))
    }
}
