//! Configuration loading and representation.
//!
//! Everything comes from environment variables:
//!
//! | variable                 | default          |
//! |--------------------------|------------------|
//! | `FARMHUB_BIND_ADDR`      | `0.0.0.0:8080`   |
//! | `JWT_SECRET`             | insecure dev key |
//! | `DATABASE_URL`           | unset: in-memory |
//! | `FARMHUB_ADMIN_LOGIN`    | unset            |
//! | `FARMHUB_ADMIN_PASSWORD` | unset            |

use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid FARMHUB_BIND_ADDR '{0}'")]
    InvalidBindAddr(String),

    #[error("FARMHUB_ADMIN_LOGIN and FARMHUB_ADMIN_PASSWORD must be set together")]
    IncompleteAdminSeed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `None` selects the in-memory repositories.
    pub database_url: Option<String>,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    /// The admin password is taken verbatim.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let raw_addr = get("FARMHUB_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let admin_password = lookup("FARMHUB_ADMIN_PASSWORD").filter(|v| !v.is_empty());
        let admin_seed = match (get("FARMHUB_ADMIN_LOGIN"), admin_password) {
            (Some(login), Some(password)) => Some(AdminSeed { login, password }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteAdminSeed),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url: get("DATABASE_URL"),
            admin_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.admin_seed, None);
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            ("FARMHUB_BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://farmhub@localhost/farmhub"),
            ("FARMHUB_ADMIN_LOGIN", "admin"),
            ("FARMHUB_ADMIN_PASSWORD", "changeme!"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://farmhub@localhost/farmhub"));
        assert_eq!(
            cfg.admin_seed,
            Some(AdminSeed { login: "admin".into(), password: "changeme!".into() })
        );
    }

    #[test]
    fn blank_values_are_unset() {
        let cfg = config(&[("DATABASE_URL", "  "), ("JWT_SECRET", "")]).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn admin_password_keeps_surrounding_spaces() {
        let cfg = config(&[("FARMHUB_ADMIN_LOGIN", " admin "), ("FARMHUB_ADMIN_PASSWORD", " pass phrase ")]).unwrap();
        assert_eq!(
            cfg.admin_seed,
            Some(AdminSeed { login: "admin".into(), password: " pass phrase ".into() })
        );
    }

    #[test]
    fn rejects_bad_address_and_half_a_seed() {
        assert_eq!(
            config(&[("FARMHUB_BIND_ADDR", "nowhere")]),
            Err(ConfigError::InvalidBindAddr("nowhere".into()))
        );
        assert_eq!(
            config(&[("FARMHUB_ADMIN_LOGIN", "admin")]),
            Err(ConfigError::IncompleteAdminSeed)
        );
    }
}
