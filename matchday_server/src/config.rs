//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use matchday::auth::manager::DEFAULT_ACCESS_TOKEN_MINUTES;
use matchday::db::DatabaseConfig;
use std::net::SocketAddr;

/// Bind address used when neither `--bind` nor `SERVER_BIND` is set
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Keep all state in process memory instead of PostgreSQL
    pub in_memory: bool,
    /// Security configuration
    pub security: SecurityConfig,
    /// Prometheus exporter address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
    /// Administrator to create at startup
    pub bootstrap_admin: Option<AdminBootstrap>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
}

/// Administrator account created at startup when it does not exist yet
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `in_memory` - Use the in-memory store (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        in_memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND")?.unwrap_or(default_bind()),
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database = database.with_url(url);
        }

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let security = SecurityConfig {
            jwt_secret,
            access_token_minutes: parse_env_or(
                "ACCESS_TOKEN_MINUTES",
                DEFAULT_ACCESS_TOKEN_MINUTES,
            ),
        };

        let metrics_bind = parse_addr("METRICS_BIND")?;

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                email,
                password,
                name: std::env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
            }),
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired {
                    var: "BOOTSTRAP_ADMIN_PASSWORD".to_string(),
                    hint: "Required when BOOTSTRAP_ADMIN_EMAIL is set".to_string(),
                });
            }
            (None, _) => None,
        };

        Ok(ServerConfig {
            bind,
            database,
            in_memory,
            security,
            metrics_bind,
            bootstrap_admin,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.access_token_minutes < 1 {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_MINUTES".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if !self.in_memory && self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: format!(
                    "Must be at least DB_MIN_CONNECTIONS ({})",
                    self.database.min_connections
                ),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: "Must differ from the server bind address".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

/// Parse an optional socket address variable
fn parse_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("'{value}' is not an IP:PORT address"),
        }),
        Err(_) => Ok(None),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "SERVER_BIND",
        "JWT_SECRET",
        "ACCESS_TOKEN_MINUTES",
        "METRICS_BIND",
        "BOOTSTRAP_ADMIN_EMAIL",
        "BOOTSTRAP_ADMIN_PASSWORD",
        "BOOTSTRAP_ADMIN_NAME",
    ];

    fn clear_env() {
        // SAFETY: every env-mutating test is #[serial]
        unsafe {
            for var in VARS {
                std::env::remove_var(var);
            }
        }
    }

    fn config() -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND.parse().unwrap(),
            database: DatabaseConfig::development(),
            in_memory: false,
            security: SecurityConfig {
                jwt_secret: "a".repeat(32),
                access_token_minutes: 60,
            },
            metrics_bind: None,
            bootstrap_admin: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_default_bind_matches_constant() {
        assert_eq!(default_bind(), DEFAULT_BIND.parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_validate_short_secret() {
        let mut config = config();
        config.security.jwt_secret = "short".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { var, .. }) if var == "JWT_SECRET"));
    }

    #[test]
    fn test_validate_metrics_port_clash() {
        let mut config = config();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_requires_jwt_secret() {
        clear_env();
        let err = ServerConfig::from_env(None, None, true).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides_and_admin() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "b".repeat(40));
            std::env::set_var("SERVER_BIND", "0.0.0.0:9000");
            std::env::set_var("ACCESS_TOKEN_MINUTES", "15");
            std::env::set_var("BOOTSTRAP_ADMIN_EMAIL", "root@example.com");
            std::env::set_var("BOOTSTRAP_ADMIN_PASSWORD", "change me now");
        }

        let config = ServerConfig::from_env(
            Some("127.0.0.1:7000".parse().unwrap()),
            Some("postgres://override/db".to_string()),
            false,
        )
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:7000".parse().unwrap());
        assert_eq!(config.database.database_url, "postgres://override/db");
        assert_eq!(config.security.access_token_minutes, 15);
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(admin.name, "Admin");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_bind() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "b".repeat(40));
            std::env::set_var("SERVER_BIND", "not-an-address");
        }
        let err = ServerConfig::from_env(None, None, true).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "SERVER_BIND"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_admin_email_without_password() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "b".repeat(40));
            std::env::set_var("BOOTSTRAP_ADMIN_EMAIL", "root@example.com");
        }
        let err = ServerConfig::from_env(None, None, true).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { var, .. } if var == "BOOTSTRAP_ADMIN_PASSWORD"));
        clear_env();
    }
}
