use std::env;

use chrono::Duration;
use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::account::models::RotationPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub credentials: CredentialsConfig,
    pub password: PasswordConfig,
    pub rotation: RotationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Validity window of issued tokens.
    ///
    /// # Errors
    /// * `Message` - `expiration_hours` is not positive or overflows a duration
    pub fn token_lifetime(&self) -> Result<Duration, ConfigError> {
        if self.expiration_hours <= 0 {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be positive, got {}",
                self.expiration_hours
            )));
        }

        Duration::try_hours(self.expiration_hours).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_hours is out of range: {}",
                self.expiration_hours
            ))
        })
    }
}

/// Shape of generated one-time passwords
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub password_length: usize,
}

/// Argon2id cost parameters
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RotationConfig {
    /// Accept a login change whenever the supplied password differs from the
    /// stored hash string, instead of requiring it to verify.
    pub legacy_mismatch_check: bool,
    /// Return the newly generated password in the login change response.
    pub disclose_password: bool,
}

impl RotationConfig {
    pub fn policy(&self) -> RotationPolicy {
        if self.legacy_mismatch_check {
            RotationPolicy::Legacy
        } else {
            RotationPolicy::RejectOnMismatch
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults for everything except `database.url` and `jwt.secret`
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize::<Self>()?.validated()
    }

    /// Reject settings that deserialize but cannot be used.
    fn validated(self) -> Result<Self, ConfigError> {
        self.jwt.token_lifetime()?;
        Ok(self)
    }

    fn with_defaults() -> Result<config::builder::ConfigBuilder<DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("server.http_port", 8080_i64)?
            .set_default("database.max_connections", 5_i64)?
            .set_default("jwt.expiration_hours", 24_i64)?
            .set_default(
                "credentials.password_length",
                auth::secret::DEFAULT_SECRET_LENGTH as i64,
            )?
            .set_default("password.memory_kib", i64::from(argon2_default::M_COST))?
            .set_default("password.iterations", i64::from(argon2_default::T_COST))?
            .set_default("password.parallelism", i64::from(argon2_default::P_COST))?
            .set_default("rotation.legacy_mismatch_check", false)?
            .set_default("rotation.disclose_password", false)
    }
}

/// Argon2's own defaults (RFC 9106 second recommended option)
mod argon2_default {
    pub const M_COST: u32 = 19 * 1024;
    pub const T_COST: u32 = 2;
    pub const P_COST: u32 = 1;
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        Config::with_defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Config>()?
            .validated()
    }

    #[test]
    fn test_defaults_fill_optional_settings() {
        let config = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/accounts"

            [jwt]
            secret = "test-secret-key-for-jwt-signing-at-least-32-bytes"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.credentials.password_length, 10);
        assert_eq!(config.password.memory_kib, 19 * 1024);
        assert_eq!(config.rotation.policy(), RotationPolicy::RejectOnMismatch);
        assert!(!config.rotation.disclose_password);
    }

    #[test]
    fn test_legacy_rotation_flag() {
        let config = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/accounts"

            [jwt]
            secret = "secret"

            [rotation]
            legacy_mismatch_check = true
            "#,
        )
        .unwrap();

        assert_eq!(config.rotation.policy(), RotationPolicy::Legacy);
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error() {
        let result = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/accounts"
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_token_lifetime_from_hours() {
        let config = from_toml(
            r#"
            [database]
            url = "postgresql://localhost/accounts"

            [jwt]
            secret = "secret"
            expiration_hours = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.jwt.token_lifetime().unwrap(), Duration::hours(2));
    }

    #[test]
    fn test_non_positive_expiration_is_rejected() {
        for hours in ["0", "-1"] {
            let result = from_toml(&format!(
                r#"
                [database]
                url = "postgresql://localhost/accounts"

                [jwt]
                secret = "secret"
                expiration_hours = {}
                "#,
                hours
            ));

            assert!(
                matches!(result, Err(ConfigError::Message(ref msg)) if msg.contains("must be positive")),
                "expiration_hours = {} was accepted",
                hours
            );
        }
    }

    #[test]
    fn test_overflowing_expiration_is_rejected() {
        let jwt = JwtConfig {
            secret: "secret".to_string(),
            expiration_hours: i64::MAX,
        };

        assert!(matches!(
            jwt.token_lifetime(),
            Err(ConfigError::Message(ref msg)) if msg.contains("out of range")
        ));
    }
}
