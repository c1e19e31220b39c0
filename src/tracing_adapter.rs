//! Tracing library adapter implementation.

use std::fmt::Arguments;
use std::panic::Location;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::LoggerError;
use crate::factory::{LoggerFactory, LoggingParameters};
use crate::levels::Level;
use crate::logger::{Logger, LoggerCore};

/// Logger that forwards enabled messages to the `tracing` crate.
///
/// The facade threshold is applied first; whatever passes is then subject to
/// the installed subscriber's own filtering. `tracing` has no fatal or panic
/// level, so both are emitted as errors before the facade exits or panics.
///
/// ```ignore
/// use logging_facade::{Logger, TracingLogger, Level};
///
/// // Assumes a tracing subscriber is already initialized
/// let logger = TracingLogger::new("db", Level::Info);
/// logger.infof(format_args!("Using tracing backend"));
/// ```
#[derive(Debug)]
pub struct TracingLogger {
    core: LoggerCore,
}

impl TracingLogger {
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        Self {
            core: LoggerCore::new(name, level),
        }
    }
}

impl Logger for TracingLogger {
    fn core(&self) -> &LoggerCore {
        &self.core
    }

    fn write(&self, level: Level, location: &'static Location<'static>, args: Arguments<'_>) {
        let logger = self.core.name();
        match level {
            Level::Trace => tracing::trace!(logger, caller = %location, "{}", args),
            Level::Debug => tracing::debug!(logger, caller = %location, "{}", args),
            Level::Info => tracing::info!(logger, caller = %location, "{}", args),
            Level::Warn => tracing::warn!(logger, caller = %location, "{}", args),
            Level::Error | Level::Fatal | Level::Panic => {
                tracing::error!(logger, caller = %location, severity = level.as_str(), "{}", args)
            }
        }
    }
}

/// Factory for [`TracingLogger`]s. Understands only the `level` parameter.
#[derive(Debug)]
pub struct TracingLoggerFactory {
    default_level: RwLock<Level>,
}

impl TracingLoggerFactory {
    pub fn new() -> Self {
        Self {
            default_level: RwLock::new(Level::Trace),
        }
    }
}

impl Default for TracingLoggerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerFactory for TracingLoggerFactory {
    fn get_logger(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(TracingLogger::new(name, self.default_level()))
    }

    fn set_logging_parameters(&self, params: &LoggingParameters) -> Result<(), LoggerError> {
        let mut level = None;
        for (key, value) in params {
            if key != "level" {
                return Err(LoggerError::UnknownParameter(key.clone()));
            }
            let parsed = serde_json::from_value::<Level>(value.clone())
                .map_err(|e| LoggerError::invalid_parameter(key, e.to_string()))?;
            level = Some(parsed);
        }
        if let Some(level) = level {
            self.set_default_level(level);
        }
        Ok(())
    }

    fn set_default_level(&self, level: Level) {
        *self.default_level.write().unwrap_or_else(PoisonError::into_inner) = level;
    }

    fn default_level(&self) -> Level {
        *self.default_level.read().unwrap_or_else(PoisonError::into_inner)
    }
}
