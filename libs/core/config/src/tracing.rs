use crate::{env_or_default, ConfigError, Environment};
use tracing::{debug, info};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

/// Default log level when `LOG_LEVEL` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log level requested through `LOG_LEVEL`
///
/// Accepts trace, debug, info, warn, error and off (case-insensitive).
pub fn log_level_from_env() -> Result<LevelFilter, ConfigError> {
    parse_log_level(&env_or_default("LOG_LEVEL", DEFAULT_LOG_LEVEL))
}

pub fn parse_log_level(value: &str) -> Result<LevelFilter, ConfigError> {
    value
        .trim()
        .parse::<LevelFilter>()
        .map_err(|e| ConfigError::parse("LOG_LEVEL", e))
}

/// Install the color-eyre report hook: error locations on, env section off.
///
/// Called first thing in `main`; repeated calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Install the global subscriber for a shard process.
///
/// Production (`APP_ENV=production`) writes flattened JSON events without
/// targets; development pretty-prints them. Both carry a
/// `tracing_error::ErrorLayer` so `eyre` reports include span traces.
///
/// The filter is `RUST_LOG` when set, otherwise `level` for every target.
/// A second call keeps the first subscriber, which is what tests rely on.
pub fn init_tracing(environment: &Environment, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    let registry = tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(filter);

    let installed = match environment {
        Environment::Production => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .try_init(),
        Environment::Development => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .try_init(),
    };

    if installed.is_ok() {
        info!(environment = ?environment, level = %level, "Tracing initialized");
    } else {
        debug!("Tracing already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_development() {
        let env = Environment::Development;
        // Should not panic
        init_tracing(&env, LevelFilter::INFO);
    }

    #[test]
    fn test_init_tracing_production() {
        let env = Environment::Production;
        // Should not panic
        init_tracing(&env, LevelFilter::WARN);
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        // Should not panic when called multiple times
        let env = Environment::Development;
        init_tracing(&env, LevelFilter::INFO);
        init_tracing(&env, LevelFilter::DEBUG);
    }

    #[test]
    fn test_init_tracing_with_rust_log_env() {
        temp_env::with_var("RUST_LOG", Some("trace"), || {
            let env = Environment::Development;
            // Should not panic
            init_tracing(&env, LevelFilter::ERROR);
        });
    }

    #[test]
    fn test_log_level_from_env() {
        temp_env::with_var_unset("LOG_LEVEL", || {
            assert_eq!(log_level_from_env().unwrap(), LevelFilter::INFO);
        });
        temp_env::with_var("LOG_LEVEL", Some("DEBUG"), || {
            assert_eq!(log_level_from_env().unwrap(), LevelFilter::DEBUG);
        });
        temp_env::with_var("LOG_LEVEL", Some("off"), || {
            assert_eq!(log_level_from_env().unwrap(), LevelFilter::OFF);
        });
    }

    #[test]
    fn test_log_level_rejects_unknown() {
        let err = parse_log_level("verbose").unwrap_err();
        assert!(err.to_string().contains("LOG_LEVEL"));
    }
}
