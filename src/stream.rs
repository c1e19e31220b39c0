//! Reference backend writing one formatted line per message.
//!
//! ```text
//! 2024-05-01 12:00:00.123       [INFO ] main.rs:42 server started
//! ```

use std::fmt::{self, Arguments, Write};
use std::panic::Location;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Local;
use serde_json::Value;

use crate::error::LoggerError;
use crate::factory::{LoggerFactory, LoggingParameters};
use crate::levels::Level;
use crate::logger::{Logger, LoggerCore};
use crate::sink::{global_sink, OutputSink};

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LEVEL: Level = Level::Debug;

const PARAM_LEVEL: &str = "level";
const PARAM_TIMESTAMP_FORMAT: &str = "timestamp_format";
const PARAM_CALLER: &str = "caller";

#[derive(Clone, Debug, PartialEq, Eq)]
struct LineFormat {
    timestamp_format: String,
    caller: bool,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            caller: true,
        }
    }
}

impl LineFormat {
    fn render(&self, level: Level, location: &Location<'_>, args: Arguments<'_>) -> String {
        let timestamp = Local::now().format(&self.timestamp_format).to_string();
        let (file, line) = if self.caller {
            (short_file(location.file()), location.line())
        } else {
            ("???", 0)
        };
        format!("{:<29} [{:<5}] {}:{} {}\n", timestamp, level, file, line, args)
    }
}

/// Final path segment of a source file name.
fn short_file(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Logger writing timestamped lines with level and call site to an [`OutputSink`].
pub struct StreamLogger {
    core: LoggerCore,
    sink: OutputSink,
    format: Arc<RwLock<LineFormat>>,
}

impl StreamLogger {
    /// Standalone logger with the default line format.
    pub fn new(name: impl Into<String>, level: Level, sink: OutputSink) -> Self {
        Self {
            core: LoggerCore::new(name, level),
            sink,
            format: Arc::default(),
        }
    }
}

impl Logger for StreamLogger {
    fn core(&self) -> &LoggerCore {
        &self.core
    }

    fn write(&self, level: Level, location: &'static Location<'static>, args: Arguments<'_>) {
        let line = self
            .format
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .render(level, location, args);
        // Nowhere left to report a failing log stream.
        let _ = self.sink.write_line(line.as_bytes());
    }
}

impl fmt::Debug for StreamLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamLogger")
            .field("name", &self.core.name())
            .field("level", &self.core.level())
            .finish()
    }
}

#[derive(Debug)]
struct FactorySettings {
    default_level: Level,
    format: Arc<RwLock<LineFormat>>,
}

/// Factory for [`StreamLogger`]s.
///
/// New loggers start at [`Level::Debug`] and write to the process-wide sink
/// unless a sink is given with [`StreamLoggerFactory::with_sink`].
///
/// Accepted parameters:
///
/// | key                | value                                   |
/// |--------------------|-----------------------------------------|
/// | `level`            | level name, sets the default threshold  |
/// | `timestamp_format` | `strftime` pattern                      |
/// | `caller`           | bool, include `file:line`               |
///
/// Format changes also apply to loggers this factory already created.
#[derive(Debug)]
pub struct StreamLoggerFactory {
    sink: OutputSink,
    settings: RwLock<FactorySettings>,
}

impl StreamLoggerFactory {
    pub fn new() -> Self {
        Self::with_sink(global_sink())
    }

    pub fn with_sink(sink: OutputSink) -> Self {
        Self {
            sink,
            settings: RwLock::new(FactorySettings {
                default_level: DEFAULT_LEVEL,
                format: Arc::default(),
            }),
        }
    }
}

/// Checks every entry of `params` against `format` and returns the updated
/// default level and format. Nothing is applied when any entry is rejected.
/// Keys that are not mentioned keep their current value.
fn validate(
    params: &LoggingParameters,
    format: &LineFormat,
) -> Result<(Option<Level>, LineFormat), LoggerError> {
    let mut level = None;
    let mut format = format.clone();

    for (key, value) in params {
        match key.as_str() {
            PARAM_LEVEL => {
                let name = expect_str(key, value)?;
                let parsed = name
                    .parse::<Level>()
                    .map_err(|e| LoggerError::invalid_parameter(key, e.to_string()))?;
                level = Some(parsed);
            }
            PARAM_TIMESTAMP_FORMAT => {
                let pattern = expect_str(key, value)?;
                check_timestamp_format(key, pattern)?;
                format.timestamp_format = pattern.to_string();
            }
            PARAM_CALLER => {
                format.caller = value
                    .as_bool()
                    .ok_or_else(|| LoggerError::invalid_parameter(key, "expected a boolean"))?;
            }
            _ => return Err(LoggerError::UnknownParameter(key.clone())),
        }
    }

    Ok((level, format))
}

// Some specifiers parse but cannot be formatted, so render a sample.
fn check_timestamp_format(key: &str, pattern: &str) -> Result<(), LoggerError> {
    let mut sample = String::new();
    write!(sample, "{}", Local::now().format(pattern)).map_err(|_| {
        LoggerError::invalid_parameter(
            key,
            format!("'{}' is not a valid strftime pattern", pattern),
        )
    })
}

fn expect_str<'a>(key: &str, value: &'a Value) -> Result<&'a str, LoggerError> {
    value
        .as_str()
        .ok_or_else(|| LoggerError::invalid_parameter(key, "expected a string"))
}

impl Default for StreamLoggerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerFactory for StreamLoggerFactory {
    fn get_logger(&self, name: &str) -> Arc<dyn Logger> {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        Arc::new(StreamLogger {
            core: LoggerCore::new(name, settings.default_level),
            sink: self.sink.clone(),
            format: settings.format.clone(),
        })
    }

    fn set_logging_parameters(&self, params: &LoggingParameters) -> Result<(), LoggerError> {
        // Held across validation so concurrent calls cannot drop each other's keys.
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        let format_lock = settings.format.clone();
        let mut format = format_lock.write().unwrap_or_else(PoisonError::into_inner);

        let (level, updated) = validate(params, &format)?;
        if let Some(level) = level {
            settings.default_level = level;
        }
        *format = updated;
        Ok(())
    }

    fn set_default_level(&self, level: Level) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .default_level = level;
    }

    fn default_level(&self) -> Level {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .default_level
    }
}
