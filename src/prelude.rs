pub use crate::error::LoggerError;
pub use crate::factory::{LoggerFactory, LoggerRegistry, LoggingParameters};
#[cfg(feature = "singleton")]
#[cfg_attr(docsrs, doc(cfg(feature = "singleton")))]
pub use crate::factory::{get_logger, get_logger_factory, set_logger_factory};
pub use crate::levels::Level;
pub use crate::logger::{LogPanic, Logger, LoggerCore};
pub use crate::sink::{global_sink, set_global_writer, OutputSink};
pub use crate::stream::{StreamLogger, StreamLoggerFactory};
pub use crate::tracing_adapter::{TracingLogger, TracingLoggerFactory};
