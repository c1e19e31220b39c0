use thiserror::Error;

/// Recoverable errors reported by the facade and by backends.
///
/// Misuse of the facade itself (registering no factory, asking for a logger
/// before a factory is registered) is not represented here: those panic.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown logging parameter '{0}'")]
    UnknownParameter(String),

    #[error("invalid value for logging parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("no match for log level {0}")]
    UnknownRank(u8),

    /// Error raised by a backend, displayed verbatim.
    #[error("{0}")]
    Backend(String),
}

impl LoggerError {
    pub fn backend(message: impl Into<String>) -> Self {
        LoggerError::Backend(message.into())
    }

    pub(crate) fn invalid_parameter(key: &str, reason: impl Into<String>) -> Self {
        LoggerError::InvalidParameter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
