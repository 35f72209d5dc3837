//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` but can be specified
//! via the `-f` flag or the `LEADCTL_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in order, later sources overriding earlier ones:
//!
//! 1. **YAML config file** - base configuration (default: `config.yaml`)
//! 2. **Environment variables** - variables prefixed with `LEADCTL_`
//! 3. **DATABASE_URL** - overrides `database.url` if set
//! 4. **WHATSAPP_TOKEN / WHATSAPP_PHONE_NUMBER_ID** - override the
//!    `whatsapp` section if set
//!
//! For nested values, use double underscores:
//! `LEADCTL_AUTH__SESSION__COOKIE_NAME=session` sets
//! `auth.session.cookie_name`.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "LEADCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user (optional, can be set via environment)
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// WhatsApp Cloud API credentials for the messaging proxy
    pub whatsapp: WhatsAppConfig,
    /// Cross-origin settings for browser clients
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database: DatabaseConfig::default(),
            admin_email: "admin@localhost".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            whatsapp: WhatsAppConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin settings.
///
/// With no configured origins the server is fully permissive, which suits
/// local development; cookie-based browser clients in production need their
/// origin listed here so credentials are allowed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Origins allowed to make credentialed requests
    pub allowed_origins: Vec<String>,
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL; usually supplied via the DATABASE_URL environment variable
    pub url: String,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/leadctl".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether new users may self-register
    pub allow_registration: bool,
    /// Password length requirements
    pub password: PasswordConfig,
    /// Session cookie settings
    pub session: SessionConfig,
}

/// Password length requirements for registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

/// JWT session cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    /// Whether the cookie is marked Secure (disable for local HTTP development)
    pub cookie_secure: bool,
    /// SameSite attribute for the cookie
    pub cookie_same_site: String,
    /// Session lifetime (e.g. "7d", "12h")
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "leadctl_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "Strict".to_string(),
            timeout: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// WhatsApp Cloud API settings.
///
/// `token` and `phone_number_id` are optional at load time; the messaging
/// endpoint fails with a configuration error when they are missing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Base URL of the Cloud API (overridable for testing)
    pub api_base: String,
    /// Bearer token
    pub token: Option<String>,
    /// Sender phone number id
    pub phone_number_id: Option<String>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_base: "https://graph.facebook.com/v17.0".to_string(),
            token: None,
            phone_number_id: None,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // Conventional unprefixed variables win over the YAML values.
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            config.database.url = url;
        }
        if let Ok(token) = std::env::var("WHATSAPP_TOKEN")
            && !token.is_empty()
        {
            config.whatsapp.token = Some(token);
        }
        if let Ok(id) = std::env::var("WHATSAPP_PHONE_NUMBER_ID")
            && !id.is_empty()
        {
            config.whatsapp.phone_number_id = Some(id);
        }

        Ok(config)
    }

    fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("LEADCTL_").split("__"))
    }

    /// Check invariants that can't be expressed in the type system. Run at
    /// startup and by `--validate`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.is_none() {
            return Err(Error::Configuration {
                message: "secret_key is not configured. Set LEADCTL_SECRET_KEY or add \
                          secret_key to the config file."
                    .to_string(),
            });
        }

        if self.auth.password.min_length > self.auth.password.max_length {
            return Err(Error::Configuration {
                message: format!(
                    "password min_length ({}) cannot be greater than max_length ({})",
                    self.auth.password.min_length, self.auth.password.max_length
                ),
            });
        }

        let timeout = self.auth.session.timeout.as_secs();
        if timeout < 300 {
            return Err(Error::Configuration {
                message: "session timeout is too short (minimum 5 minutes)".to_string(),
            });
        }
        if timeout > 86400 * 30 {
            return Err(Error::Configuration {
                message: "session timeout is too long (maximum 30 days)".to_string(),
            });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn defaults_load_without_a_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args("missing.yaml")).expect("load");
            assert_eq!(config.port, 3001);
            assert_eq!(config.auth.session.cookie_name, "leadctl_session");
            assert!(config.whatsapp.token.is_none());
            Ok(())
        });
    }

    #[test]
    fn yaml_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 9000
                secret_key: from-yaml
                auth:
                  session:
                    timeout: 12h
                whatsapp:
                  token: yaml-token
                  phone_number_id: "999"
                "#,
            )?;
            let config = Config::load(&args("config.yaml")).expect("load");
            assert_eq!(config.port, 9000);
            assert_eq!(config.secret_key.as_deref(), Some("from-yaml"));
            assert_eq!(config.auth.session.timeout, Duration::from_secs(12 * 3600));
            assert_eq!(config.whatsapp.token.as_deref(), Some("yaml-token"));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "port: 9000")?;
            jail.set_env("LEADCTL_PORT", "9001");
            jail.set_env("LEADCTL_AUTH__SESSION__COOKIE_NAME", "other");
            jail.set_env("DATABASE_URL", "postgresql://env/db");
            jail.set_env("WHATSAPP_TOKEN", "env-token");
            let config = Config::load(&args("config.yaml")).expect("load");
            assert_eq!(config.port, 9001);
            assert_eq!(config.auth.session.cookie_name, "other");
            assert_eq!(config.database.url, "postgresql://env/db");
            assert_eq!(config.whatsapp.token.as_deref(), Some("env-token"));
            Ok(())
        });
    }

    #[test]
    fn validate_requires_a_secret_key() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.secret_key = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_bounds_the_session_timeout() {
        let mut config = Config::default();
        config.secret_key = Some("secret".to_string());
        config.auth.session.timeout = Duration::from_secs(60);
        assert!(config.validate().is_err());
        config.auth.session.timeout = Duration::from_secs(86400 * 31);
        assert!(config.validate().is_err());
    }
}
