//! Worker configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use bytesize::ByteSize;
use core_config::duration::env_duration;
use core_config::server::ServerConfig;
use core_config::{ConfigError, FromEnv, env_bool, env_or_default, env_parse, env_required};
use domain_shard::{Metric, Quantization, ShardConfig};
use tracing::level_filters::LevelFilter;

/// Everything the worker reads at startup
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub server: ServerConfig,
    pub log_level: LevelFilter,
    pub shard: ShardConfig,
    pub shard_path: PathBuf,
    /// Persist on shutdown and allow creating a missing shard file
    pub writable: bool,
    pub auto_sync: bool,
    pub auto_sync_interval: Duration,
    pub shutdown_grace_period: Duration,
}

impl WorkerConfig {
    /// Whether periodic persistence should run.
    pub fn auto_sync_enabled(&self) -> bool {
        self.writable && self.auto_sync
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;

        if self.shard_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("SHARD_PATH", "must not be empty"));
        }
        if self.shard.dimensions == 0 {
            return Err(ConfigError::invalid(
                "COLLECTION_VECTOR_DIMENSIONS",
                "must be greater than 0",
            ));
        }
        if self.shard.max_size_bytes == 0 {
            return Err(ConfigError::invalid("SHARD_MAX_SIZE", "must be greater than 0"));
        }
        if self.auto_sync_enabled() && self.auto_sync_interval.is_zero() {
            return Err(ConfigError::invalid(
                "SHARD_AUTO_SYNC_INTERVAL",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Parse a shard budget such as `512MB` or `1.5GiB`.
///
/// Units are binary whether or not the `i` is written: `1GB` is 2^30 bytes.
/// A bare number is bytes.
pub fn parse_max_size(value: &str) -> Result<ByteSize, ConfigError> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);

    let unit = match unit.to_ascii_uppercase().as_str() {
        "" | "B" => "B",
        "K" | "KB" | "KIB" => "KiB",
        "M" | "MB" | "MIB" => "MiB",
        "G" | "GB" | "GIB" => "GiB",
        "T" | "TB" | "TIB" => "TiB",
        "P" | "PB" | "PIB" => "PiB",
        other => {
            return Err(ConfigError::parse(
                "SHARD_MAX_SIZE",
                format!("unknown size unit '{}'", other),
            ));
        }
    };

    format!("{} {}", amount.trim(), unit)
        .parse::<ByteSize>()
        .map_err(|e| ConfigError::parse("SHARD_MAX_SIZE", e))
}

impl FromEnv for WorkerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig::from_env()?;
        let log_level = core_config::tracing::log_level_from_env()?;

        let quantization: Quantization = env_parse("COLLECTION_QUANTIZATION", "F32")?;
        let metric: Metric = env_parse("COLLECTION_METRIC", "Cosine")?;
        let dimensions: usize = env_parse("COLLECTION_VECTOR_DIMENSIONS", "128")?;
        let connectivity: usize = env_parse("COLLECTION_CONNECTIVITY", "0")?;
        let expansion_add: usize = env_parse("COLLECTION_EXPANSION_ADD", "0")?;
        let expansion_search: usize = env_parse("COLLECTION_EXPANSION_SEARCH", "0")?;
        let multi = env_bool("COLLECTION_MULTI", false)?;

        let max_size = parse_max_size(&env_or_default("SHARD_MAX_SIZE", "1GB"))?;

        let shard = ShardConfig::new(dimensions, max_size.as_u64())
            .with_metric(metric)
            .with_quantization(quantization)
            .with_connectivity(connectivity)
            .with_expansion(expansion_add, expansion_search)
            .with_multi(multi);

        let config = Self {
            server,
            log_level,
            shard,
            shard_path: PathBuf::from(env_required("SHARD_PATH")?.trim()),
            writable: env_bool("SHARD_WRITEABLE", false)?,
            auto_sync: env_bool("SHARD_AUTO_SYNC", false)?,
            auto_sync_interval: env_duration("SHARD_AUTO_SYNC_INTERVAL", "1m")?,
            shutdown_grace_period: env_duration("SHUTDOWN_GRACE_PERIOD", "30s")?,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 16] = [
        "HOST",
        "PORT",
        "LOG_LEVEL",
        "COLLECTION_QUANTIZATION",
        "COLLECTION_METRIC",
        "COLLECTION_VECTOR_DIMENSIONS",
        "COLLECTION_CONNECTIVITY",
        "COLLECTION_EXPANSION_ADD",
        "COLLECTION_EXPANSION_SEARCH",
        "COLLECTION_MULTI",
        "SHARD_PATH",
        "SHARD_WRITEABLE",
        "SHARD_MAX_SIZE",
        "SHARD_AUTO_SYNC",
        "SHARD_AUTO_SYNC_INTERVAL",
        "SHUTDOWN_GRACE_PERIOD",
    ];

    /// Run `f` with every worker variable unset except `set`.
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
        with_env(&[("SHARD_PATH", "/data/shard.usearch")], || {
            let config = WorkerConfig::from_env().unwrap();

            assert_eq!(config.server.address(), "0.0.0.0:3000");
            assert_eq!(config.log_level, LevelFilter::INFO);
            assert_eq!(config.shard.dimensions, 128);
            assert_eq!(config.shard.metric, Metric::Cosine);
            assert_eq!(config.shard.quantization, Quantization::F32);
            assert_eq!(config.shard.max_size_bytes, 1 << 30);
            assert!(!config.shard.multi);
            assert_eq!(config.shard_path, PathBuf::from("/data/shard.usearch"));
            assert!(!config.writable);
            assert!(!config.auto_sync_enabled());
            assert_eq!(config.auto_sync_interval, Duration::from_secs(60));
            assert_eq!(config.shutdown_grace_period, Duration::from_secs(30));
        });
    }

    #[test]
    fn test_custom_values() {
        with_env(
            &[
                ("SHARD_PATH", "/tmp/s"),
                ("PORT", "50051"),
                ("LOG_LEVEL", "debug"),
                ("COLLECTION_QUANTIZATION", "i8"),
                ("COLLECTION_METRIC", "l2sq"),
                ("COLLECTION_VECTOR_DIMENSIONS", "4"),
                ("COLLECTION_CONNECTIVITY", "16"),
                ("COLLECTION_MULTI", "true"),
                ("SHARD_WRITEABLE", "true"),
                ("SHARD_MAX_SIZE", "10MB"),
                ("SHARD_AUTO_SYNC", "true"),
                ("SHARD_AUTO_SYNC_INTERVAL", "30s"),
                ("SHUTDOWN_GRACE_PERIOD", "5s"),
            ],
            || {
                let config = WorkerConfig::from_env().unwrap();

                assert_eq!(config.server.port, 50051);
                assert_eq!(config.log_level, LevelFilter::DEBUG);
                assert_eq!(config.shard.quantization, Quantization::I8);
                assert_eq!(config.shard.metric, Metric::L2Squared);
                assert_eq!(config.shard.dimensions, 4);
                assert_eq!(config.shard.connectivity, 16);
                assert!(config.shard.multi);
                assert_eq!(config.shard.max_size_bytes, 10 << 20);
                assert!(config.auto_sync_enabled());
                assert_eq!(config.auto_sync_interval, Duration::from_secs(30));
                assert_eq!(config.shutdown_grace_period, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_shard_path_required() {
        with_env(&[], || {
            let err = WorkerConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHARD_PATH"));
        });
    }

    #[test]
    fn test_max_size_units_are_binary() {
        assert_eq!(parse_max_size("1GB").unwrap().as_u64(), 1 << 30);
        assert_eq!(parse_max_size("1gib").unwrap().as_u64(), 1 << 30);
        assert_eq!(parse_max_size("512 MB").unwrap().as_u64(), 512 << 20);
        assert_eq!(parse_max_size("4k").unwrap().as_u64(), 4096);
        assert_eq!(parse_max_size("100").unwrap().as_u64(), 100);
        assert_eq!(parse_max_size("1.5GB").unwrap().as_u64(), 3 << 29);
        assert!(parse_max_size("10 parsecs").is_err());
        assert!(parse_max_size("GB").is_err());
    }

    #[test]
    fn test_rejects_zero_max_size() {
        with_env(&[("SHARD_PATH", "/tmp/s"), ("SHARD_MAX_SIZE", "0B")], || {
            let err = WorkerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("SHARD_MAX_SIZE"));
        });
    }

    #[test]
    fn test_rejects_unparsable_values() {
        for (key, value) in [
            ("SHARD_MAX_SIZE", "a lot"),
            ("COLLECTION_METRIC", "manhattan"),
            ("COLLECTION_QUANTIZATION", "f8"),
            ("COLLECTION_VECTOR_DIMENSIONS", "-1"),
            ("LOG_LEVEL", "loud"),
            ("SHARD_WRITEABLE", "sometimes"),
        ] {
            with_env(&[("SHARD_PATH", "/tmp/s"), (key, value)], || {
                let err = WorkerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains(key), "{key}: {err}");
            });
        }
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        with_env(
            &[("SHARD_PATH", "/tmp/s"), ("COLLECTION_VECTOR_DIMENSIONS", "0")],
            || {
                let err = WorkerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("COLLECTION_VECTOR_DIMENSIONS"));
            },
        );
    }

    #[test]
    fn test_zero_sync_interval_only_matters_when_syncing() {
        with_env(
            &[
                ("SHARD_PATH", "/tmp/s"),
                ("SHARD_AUTO_SYNC", "true"),
                ("SHARD_AUTO_SYNC_INTERVAL", "0s"),
            ],
            || {
                // Read-only shards never sync
                assert!(WorkerConfig::from_env().is_ok());
            },
        );
        with_env(
            &[
                ("SHARD_PATH", "/tmp/s"),
                ("SHARD_WRITEABLE", "true"),
                ("SHARD_AUTO_SYNC", "true"),
                ("SHARD_AUTO_SYNC_INTERVAL", "0s"),
            ],
            || {
                let err = WorkerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("SHARD_AUTO_SYNC_INTERVAL"));
            },
        );
    }
}
