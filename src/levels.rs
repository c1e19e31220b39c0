use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoggerError;

/// Severity of a log message.
///
/// Levels are totally ordered by declaration, so a logger gates a message by
/// comparing its level against the logger's threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Written, then the process exits.
    Fatal = 5,
    /// Written, then a recoverable [`LogPanic`](crate::LogPanic) is raised.
    Panic = 6,
}

impl Level {
    /// All levels, lowest first.
    pub const ALL: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    /// Canonical uppercase label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Panic => "PANIC",
        }
    }

    #[inline]
    pub const fn rank(&self) -> u8 {
        *self as u8
    }

    /// Converts a stored rank back into a level.
    ///
    /// # Panics
    ///
    /// A rank outside `0..=6` can only come from a bug in the caller, so it
    /// panics instead of inventing a label. Use `Level::try_from` when the
    /// rank comes from outside the program.
    pub fn from_raw(rank: u8) -> Self {
        match Self::try_from(rank) {
            Ok(level) => level,
            Err(_) => panic!("no match for log level {}", rank),
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = LoggerError;

    fn try_from(rank: u8) -> Result<Self, LoggerError> {
        Level::ALL
            .get(rank as usize)
            .copied()
            .ok_or(LoggerError::UnknownRank(rank))
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LoggerError::InvalidLevel(s.to_string()))
    }
}

impl TryFrom<String> for Level {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, LoggerError> {
        s.parse()
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
