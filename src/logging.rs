//! Opt-in debug logging for the connector's own dependencies.
//!
//! Setting `DBT_SNOWFLAKE_CONNECTOR_DEBUG_LOGGING` to any non-empty value asks
//! the host application's logger to raise the driver stack to `DEBUG`.
//! [`init_connector_logging`] is meant to be called once at startup.

use std::sync::{Mutex, PoisonError};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::environment::DEBUG_LOGGING;
use crate::{Environment, Result};

/// Log targets raised to `DEBUG` when connector debug logging is enabled.
pub const DEPENDENCY_LOG_TARGETS: [&str; 3] = ["snowflake_adapter_rs::driver", "reqwest", "rustls"];

/// The logging facade the adapter reports to.
pub trait AdapterLogger {
    fn debug(&self, message: &str);

    fn set_adapter_dependency_log_level(&self, target: &str, level: Level);
}

/// Applies the debug-logging toggle from `env` to `logger`.
///
/// Returns whether debug logging was enabled.
pub fn init_connector_logging<L: AdapterLogger + ?Sized>(env: &Environment, logger: &L) -> bool {
    if !env.is_truthy(DEBUG_LOGGING) {
        return false;
    }
    for target in DEPENDENCY_LOG_TARGETS {
        logger.debug(&format!("Setting {target} to DEBUG (file logging only)"));
        logger.set_adapter_dependency_log_level(target, Level::DEBUG);
    }
    true
}

/// An [`AdapterLogger`] backed by `tracing`.
///
/// Requested dependency levels are collected and turned into `EnvFilter`
/// directives; installing the subscriber is left to the application.
#[derive(Debug, Default)]
pub struct TracingAdapterLogger {
    levels: Mutex<Vec<(String, Level)>>,
}

impl TracingAdapterLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dependency_levels(&self) -> Vec<(String, Level)> {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Builds a filter from `default_directive` plus one `target=level`
    /// directive per requested dependency level.
    pub fn env_filter(&self, default_directive: &str) -> Result<EnvFilter> {
        let mut filter = EnvFilter::try_new(default_directive)?;
        for (target, level) in self.dependency_levels() {
            let directive = format!("{target}={}", level.to_string().to_ascii_lowercase());
            filter = filter.add_directive(directive.parse()?);
        }
        Ok(filter)
    }
}

impl AdapterLogger for TracingAdapterLogger {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn set_adapter_dependency_log_level(&self, target: &str, level: Level) {
        self.levels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((target.to_string(), level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_contains_dependency_directives() {
        let logger = TracingAdapterLogger::new();
        let env = Environment::empty().with(DEBUG_LOGGING, "1");
        assert!(init_connector_logging(&env, &logger));

        let filter = logger.env_filter("info").unwrap().to_string();
        for target in DEPENDENCY_LOG_TARGETS {
            assert!(filter.contains(&format!("{target}=debug")), "{filter}");
        }
    }

    #[test]
    fn test_env_filter_without_toggle_is_default_only() {
        let logger = TracingAdapterLogger::new();
        assert!(!init_connector_logging(&Environment::empty(), &logger));
        assert!(logger.dependency_levels().is_empty());
        let filter = logger.env_filter("warn").unwrap().to_string();
        assert!(!filter.contains("=debug"), "{filter}");
    }
}
