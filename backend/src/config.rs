//! Service settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `RIDES_*` environment variables and config
//! files, in ascending precedence as OrthoConfig merges them. Accessors
//! apply defaults and validate values so the binary only deals with typed
//! settings.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_MAX_ATTEMPTS;
use crate::inbound::http::auth::JwtSettings;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8001";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_JWT_ALGORITHM: &str = "RS256";

/// Raised when settings are present but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
    #[error("a JWT verification key is required: set RIDES_JWT_PUBLIC_KEY or RIDES_JWT_PUBLIC_KEY_FILE")]
    MissingJwtKey,
    #[error("failed to read JWT key file {path}: {message}")]
    ReadJwtKey { path: String, message: String },
    #[error("{field} must be at least 1")]
    NotPositive { field: &'static str },
}

/// Runtime configuration of the ride service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RIDES")]
pub struct ServiceSettings {
    /// HTTP listen address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Inline PEM public key used to verify bearer tokens.
    pub jwt_public_key: Option<String>,
    /// Path to a PEM public key; consulted when no inline key is set.
    pub jwt_public_key_file: Option<PathBuf>,
    /// JWT algorithm, e.g. `RS256` or `EdDSA`.
    pub jwt_algorithm: Option<String>,
    /// Expected token issuer.
    pub jwt_issuer: Option<String>,
    /// Expected token audience.
    pub jwt_audience: Option<String>,
    /// Reads allowed per join or complete before reporting a conflict.
    pub join_max_attempts: Option<u32>,
    /// Apply embedded migrations before serving.
    pub run_migrations: Option<bool>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl ServiceSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value is not a
    /// `host:port` socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Pool settings, or `None` to run against the in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotPositive`] when the pool size is zero.
    pub fn pool_config(&self) -> Result<Option<PoolConfig>, SettingsError> {
        let Some(url) = non_blank(self.database_url.as_ref()) else {
            return Ok(None);
        };
        let max_size = self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        if max_size == 0 {
            return Err(SettingsError::NotPositive {
                field: "db_max_connections",
            });
        }
        Ok(Some(PoolConfig::new(url).with_max_size(max_size)))
    }

    /// Retry budget handed to the ride command service.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotPositive`] when the budget is zero.
    pub fn join_max_attempts(&self) -> Result<u32, SettingsError> {
        match self.join_max_attempts {
            Some(0) => Err(SettingsError::NotPositive {
                field: "join_max_attempts",
            }),
            Some(attempts) => Ok(attempts),
            None => Ok(DEFAULT_MAX_ATTEMPTS),
        }
    }

    /// Whether embedded migrations run at startup; on unless disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Token verification settings, reading the key file when needed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingJwtKey`] when neither key source is
    /// set and [`SettingsError::ReadJwtKey`] when the key file is unreadable.
    pub fn jwt_settings(&self) -> Result<JwtSettings, SettingsError> {
        let public_key_pem = match (non_blank(self.jwt_public_key.as_ref()), &self.jwt_public_key_file) {
            (Some(inline), _) => inline.to_owned(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|err| {
                SettingsError::ReadJwtKey {
                    path: path.display().to_string(),
                    message: err.to_string(),
                }
            })?,
            (None, None) => return Err(SettingsError::MissingJwtKey),
        };

        Ok(JwtSettings {
            public_key_pem,
            algorithm: non_blank(self.jwt_algorithm.as_ref())
                .unwrap_or(DEFAULT_JWT_ALGORITHM)
                .to_owned(),
            issuer: non_blank(self.jwt_issuer.as_ref()).map(str::to_owned),
            audience: non_blank(self.jwt_audience.as_ref()).map(str::to_owned),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Settings parsing against a locked environment.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const KEYS: [&str; 10] = [
        "RIDES_BIND_ADDR",
        "RIDES_DATABASE_URL",
        "RIDES_DB_MAX_CONNECTIONS",
        "RIDES_JWT_PUBLIC_KEY",
        "RIDES_JWT_PUBLIC_KEY_FILE",
        "RIDES_JWT_ALGORITHM",
        "RIDES_JWT_ISSUER",
        "RIDES_JWT_AUDIENCE",
        "RIDES_JOIN_MAX_ATTEMPTS",
        "RIDES_RUN_MIGRATIONS",
    ];

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        KEYS.iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| (*value).to_owned());
                (*key, value)
            })
            .collect()
    }

    fn load() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("ride-service")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8001".parse::<SocketAddr>().expect("literal address")
        );
        assert!(settings.pool_config().expect("no pool").is_none());
        assert_eq!(
            settings.join_max_attempts().expect("default budget"),
            DEFAULT_MAX_ATTEMPTS
        );
        assert!(settings.run_migrations());
        assert_eq!(settings.jwt_settings(), Err(SettingsError::MissingJwtKey));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("RIDES_BIND_ADDR", "127.0.0.1:9000"),
            ("RIDES_DATABASE_URL", "postgres://rides@localhost/rides"),
            ("RIDES_DB_MAX_CONNECTIONS", "4"),
            ("RIDES_JWT_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----"),
            ("RIDES_JWT_ALGORITHM", "EdDSA"),
            ("RIDES_JWT_ISSUER", "campus-iam"),
            ("RIDES_JOIN_MAX_ATTEMPTS", "8"),
            ("RIDES_RUN_MIGRATIONS", "false"),
        ]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal address")
        );
        let pool = settings.pool_config().expect("valid pool").expect("pool configured");
        assert_eq!(pool.database_url(), "postgres://rides@localhost/rides");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(settings.join_max_attempts().expect("budget"), 8);
        assert!(!settings.run_migrations());

        let jwt = settings.jwt_settings().expect("jwt settings");
        assert_eq!(jwt.algorithm, "EdDSA");
        assert_eq!(jwt.issuer.as_deref(), Some("campus-iam"));
        assert_eq!(jwt.audience, None);
    }

    #[rstest]
    fn unreadable_key_file_is_reported() {
        let _guard = lock_env(env_with(&[(
            "RIDES_JWT_PUBLIC_KEY_FILE",
            "/nonexistent/rides/jwt.pem",
        )]));

        let error = load().jwt_settings().expect_err("file missing");

        assert!(matches!(error, SettingsError::ReadJwtKey { .. }));
    }

    #[rstest]
    #[case::unparsable("not-an-address")]
    #[case::missing_port("127.0.0.1")]
    fn invalid_bind_addr_is_rejected(#[case] value: &str) {
        let _guard = lock_env(env_with(&[("RIDES_BIND_ADDR", value)]));

        let error = load().bind_addr().expect_err("address rejected");

        assert!(matches!(error, SettingsError::InvalidBindAddr { .. }));
    }

    #[rstest]
    fn zero_retry_budget_is_rejected() {
        let _guard = lock_env(env_with(&[("RIDES_JOIN_MAX_ATTEMPTS", "0")]));

        let error = load().join_max_attempts().expect_err("zero attempts rejected");

        assert_eq!(
            error,
            SettingsError::NotPositive {
                field: "join_max_attempts"
            }
        );
    }

    #[rstest]
    fn zero_pool_size_is_rejected() {
        let _guard = lock_env(env_with(&[
            ("RIDES_DATABASE_URL", "postgres://rides@localhost/rides"),
            ("RIDES_DB_MAX_CONNECTIONS", "0"),
        ]));

        let error = load().pool_config().expect_err("zero pool size rejected");

        assert_eq!(
            error,
            SettingsError::NotPositive {
                field: "db_max_connections"
            }
        );
    }
}
