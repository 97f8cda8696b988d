//! Frontend configuration loaded from environment variables.

use std::time::Duration;

use core_config::duration::env_duration;
use core_config::server::ServerConfig;
use core_config::{ConfigError, FromEnv, env_parse, env_required};
use tracing::level_filters::LevelFilter;

#[derive(Clone, Debug)]
pub struct FrontendConfig {
    pub server: ServerConfig,
    pub log_level: LevelFilter,
    /// Dimensions shared by every shard of the collection
    pub dimensions: usize,
    /// Downstream shard endpoints, e.g. `http://10.0.0.5:3000`
    pub shard_addresses: Vec<String>,
    pub shutdown_grace_period: Duration,
}

impl FrontendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;

        if self.dimensions == 0 {
            return Err(ConfigError::invalid(
                "COLLECTION_VECTOR_DIMENSIONS",
                "must be greater than 0",
            ));
        }
        if self.shard_addresses.is_empty() {
            return Err(ConfigError::invalid(
                "SHARD_ADDRESSES",
                "at least one address is required",
            ));
        }
        Ok(())
    }
}

fn parse_addresses(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

impl FromEnv for FrontendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            server: ServerConfig::from_env()?,
            log_level: core_config::tracing::log_level_from_env()?,
            dimensions: env_parse("COLLECTION_VECTOR_DIMENSIONS", "128")?,
            shard_addresses: parse_addresses(&env_required("SHARD_ADDRESSES")?),
            shutdown_grace_period: env_duration("SHUTDOWN_GRACE_PERIOD", "30s")?,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "HOST",
        "PORT",
        "LOG_LEVEL",
        "COLLECTION_VECTOR_DIMENSIONS",
        "SHARD_ADDRESSES",
        "SHUTDOWN_GRACE_PERIOD",
    ];

    fn with_env<F: FnOnce()>(set: &[(&str, &str)], f: F) {
        let vars: Vec<(&str, Option<&str>)> = VARS
            .iter()
            .map(|key| {
                let value = set.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
                (*key, value)
            })
            .collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_defaults() {
        with_env(&[("SHARD_ADDRESSES", "http://127.0.0.1:3001")], || {
            let config = FrontendConfig::from_env().unwrap();
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.dimensions, 128);
            assert_eq!(config.shard_addresses, vec!["http://127.0.0.1:3001"]);
            assert_eq!(config.shutdown_grace_period, Duration::from_secs(30));
        });
    }

    #[test]
    fn test_address_list() {
        with_env(
            &[("SHARD_ADDRESSES", " http://a:1 ,http://b:2,, ")],
            || {
                let config = FrontendConfig::from_env().unwrap();
                assert_eq!(config.shard_addresses, vec!["http://a:1", "http://b:2"]);
            },
        );
    }

    #[test]
    fn test_addresses_required() {
        with_env(&[], || {
            let err = FrontendConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHARD_ADDRESSES"));
        });
        with_env(&[("SHARD_ADDRESSES", " , ")], || {
            let err = FrontendConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("SHARD_ADDRESSES"));
        });
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        with_env(
            &[
                ("SHARD_ADDRESSES", "http://a:1"),
                ("COLLECTION_VECTOR_DIMENSIONS", "0"),
            ],
            || {
                assert!(FrontendConfig::from_env().is_err());
            },
        );
    }
}
