//! Process context handed from `run()` down to the supervisor.

use core_config::Environment;
use tracing::info;

use crate::config::WorkerConfig;

/// Build metadata baked in at compile time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("GIT_COMMIT_SHA").unwrap_or("unknown"),
        }
    }
}

/// Configuration, environment and build info for one worker process
#[derive(Clone, Debug)]
pub struct WorkerContext {
    pub environment: Environment,
    pub config: WorkerConfig,
    pub build: BuildInfo,
}

impl WorkerContext {
    pub fn new(environment: Environment, config: WorkerConfig) -> Self {
        Self {
            environment,
            config,
            build: BuildInfo::current(),
        }
    }

    pub fn log_startup(&self) {
        let config = &self.config;
        info!(
            name = self.build.name,
            version = self.build.version,
            commit = self.build.commit,
            environment = ?self.environment,
            "Starting shard worker"
        );
        info!(
            path = %config.shard_path.display(),
            writable = config.writable,
            dimensions = config.shard.dimensions,
            metric = %config.shard.metric,
            quantization = %config.shard.quantization,
            multi = config.shard.multi,
            max_size = %bytesize::ByteSize::b(config.shard.max_size_bytes),
            auto_sync = config.auto_sync_enabled(),
            "Shard configuration"
        );
        if config.auto_sync && !config.writable {
            tracing::warn!("SHARD_AUTO_SYNC is ignored for a read-only shard");
        }
    }
}
