use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{BackendKind, Config, EncoderKind};
use crate::infrastructure::logging::logger::parse_log_level;

/// Environment variable prefix; `__` separates nested keys.
pub const ENV_PREFIX: &str = "TUTORGATE_";

/// Default project config file.
pub const CONFIG_FILE: &str = "tutorgate.yaml";

/// Optional local overrides, merged over [`CONFIG_FILE`].
pub const LOCAL_CONFIG_FILE: &str = "local.yaml";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database URL cannot be empty")]
    EmptyDatabaseUrl,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid min_connections: {min} exceeds max_connections {max}")]
    InvalidMinConnections { min: u32, max: u32 },

    #[error("Invalid encoder dimension: {0}. Must be at least 1")]
    InvalidDimension(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("backend.base_url is required for the {0} backend")]
    MissingBackendUrl(BackendKind),

    #[error("Invalid max_in_flight: {0}. Must be at least 1")]
    InvalidMaxInFlight(usize),

    #[error("Invalid default_top_k: {0}. Must be at least 1")]
    InvalidTopK(i64),

    #[error("Invalid {0} timeout: must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. tutorgate.yaml in the working directory
    /// 3. local.yaml (optional overrides)
    /// 4. Environment variables (TUTORGATE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let db = &config.database;
        if db.url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if db.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(db.max_connections));
        }
        if db.min_connections > db.max_connections {
            return Err(ConfigError::InvalidMinConnections {
                min: db.min_connections,
                max: db.max_connections,
            });
        }
        if db.acquire_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("database acquire"));
        }

        if config.encoder.dimension == 0 {
            return Err(ConfigError::InvalidDimension(config.encoder.dimension));
        }
        if config.encoder.kind == EncoderKind::Remote && config.encoder.url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::ValidationFailed(
                "encoder.url is required for the remote encoder".to_string(),
            ));
        }

        let backend = &config.backend;
        if matches!(backend.kind, BackendKind::Vllm | BackendKind::Tgi)
            && backend.base_url.as_deref().is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::MissingBackendUrl(backend.kind));
        }
        if backend.max_in_flight == 0 {
            return Err(ConfigError::InvalidMaxInFlight(backend.max_in_flight));
        }
        if backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("backend"));
        }

        if config.retrieval.default_top_k < 1 {
            return Err(ConfigError::InvalidTopK(config.retrieval.default_top_k));
        }

        if parse_log_level(&config.logging.level).is_err() {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::LogFormat;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.backend.kind, BackendKind::Mock);
        assert_eq!(config.server.port, 8000);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_load_from_file() {
        let file = write_yaml(
            "backend:\n  kind: tgi\n  base_url: http://localhost:8080\nlogging:\n  format: pretty\n",
        );

        temp_env::with_vars_unset(["TUTORGATE_BACKEND__KIND", "TUTORGATE_LOGGING__LEVEL"], || {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert_eq!(config.backend.kind, BackendKind::Tgi);
            assert_eq!(config.logging.format, LogFormat::Pretty);
            assert_eq!(config.database.max_connections, 10);
        });
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_yaml("backend:\n  kind: mock\n");

        temp_env::with_vars(
            [
                ("TUTORGATE_BACKEND__KIND", Some("vllm")),
                ("TUTORGATE_BACKEND__BASE_URL", Some("http://localhost:8005")),
                ("TUTORGATE_BACKEND__MAX_IN_FLIGHT", Some("4")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.backend.kind, BackendKind::Vllm);
                assert_eq!(config.backend.base_url.as_deref(), Some("http://localhost:8005"));
                assert_eq!(config.backend.max_in_flight, 4);
            },
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ConfigLoader::load_from_file("/nonexistent/tutorgate.yaml").is_err());
    }

    #[test]
    fn test_remote_backend_requires_url() {
        let mut config = Config::default();
        config.backend.kind = BackendKind::Vllm;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::MissingBackendUrl(BackendKind::Vllm))
        ));

        config.backend.kind = BackendKind::Openai;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_pool_bounds() {
        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidMaxConnections(0))));

        config.database.max_connections = 2;
        config.database.min_connections = 3;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMinConnections { min: 3, max: 2 })
        ));
    }

    #[test]
    fn test_validate_misc_bounds() {
        let mut config = Config::default();
        config.backend.max_in_flight = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidMaxInFlight(0))));

        let mut config = Config::default();
        config.retrieval.default_top_k = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidTopK(0))));

        let mut config = Config::default();
        config.encoder.dimension = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidDimension(0))));

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogLevel(_))));

        let mut config = Config::default();
        config.encoder.kind = EncoderKind::Remote;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::ValidationFailed(_))));
    }
}
