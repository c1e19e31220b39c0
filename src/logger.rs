//! The logger capability set.
//!
//! A backend embeds a [`LoggerCore`] and implements [`Logger::core`] and
//! [`Logger::write`]. Everything else (accessors, the seven `is_*_enabled`
//! predicates, plain and formatted logging per level, and the special
//! handling of fatal and panic) is provided by the trait.

use std::fmt::{self, Arguments, Display, Formatter};
use std::panic::Location;

use crate::levels::Level;
use crate::sync::{AtomicU8, Ordering};

/// Name and threshold storage shared by every backend.
///
/// The threshold is an atomic, so it can be read and changed from several
/// threads at once. A threshold change is not ordered against log calls that
/// are already in flight.
pub struct LoggerCore {
    name: String,
    level: AtomicU8,
}

impl LoggerCore {
    /// Creates the core for a logger.
    ///
    /// # Arguments
    ///
    /// * `name` - The name the logger was requested under.
    /// * `level` - The initial threshold.
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(level.rank()),
        }
    }

    /// The name given at construction.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the current threshold.
    ///
    /// # Returns
    ///
    /// `Level` - The lowest level that is written.
    #[inline]
    pub fn level(&self) -> Level {
        Level::from_raw(self.level.load(Ordering::Relaxed))
    }

    /// Changes the threshold. Visible to every thread sharing this core.
    ///
    /// # Arguments
    ///
    /// * `level` - The new lowest level that is written.
    #[inline]
    pub fn set_level(&self, level: Level) {
        self.level.store(level.rank(), Ordering::Relaxed);
    }

    /// True iff `level` is at or above the current threshold.
    #[inline]
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }
}

impl fmt::Debug for LoggerCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerCore")
            .field("name", &self.name)
            .field("level", &self.level())
            .finish()
    }
}

/// Payload of the panic raised by [`Logger::panic`] and [`Logger::panicf`].
///
/// Recover it with [`std::panic::catch_unwind`] and downcast:
///
/// ```
/// use std::panic;
/// use logging_facade::{Level, LogPanic, Logger, LoggerCore};
///
/// struct Silent(LoggerCore);
///
/// impl Logger for Silent {
///     fn core(&self) -> &LoggerCore { &self.0 }
///     fn write(&self, _: Level, _: &'static panic::Location<'static>, _: std::fmt::Arguments<'_>) {}
/// }
///
/// let logger = Silent(LoggerCore::new("demo", Level::Info));
/// let payload = panic::catch_unwind(|| logger.panicf(format_args!("bad state {}", 7))).unwrap_err();
/// let signal = payload.downcast::<LogPanic>().unwrap();
/// assert_eq!(signal.message(), "bad state 7");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogPanic {
    message: String,
}

impl LogPanic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for LogPanic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LogPanic {}

/// A named, leveled logger.
///
/// Loggers are shared across threads, so every operation takes `&self`.
/// Calls below the threshold return without formatting anything or touching
/// the backend.
pub trait Logger: Send + Sync {
    /// Name and threshold storage of this logger.
    fn core(&self) -> &LoggerCore;

    /// Output path of the backend. Only called for enabled levels.
    ///
    /// `location` is the source location of the code that issued the log call.
    fn write(&self, level: Level, location: &'static Location<'static>, args: Arguments<'_>);

    fn name(&self) -> &str {
        self.core().name()
    }

    fn level(&self) -> Level {
        self.core().level()
    }

    fn set_level(&self, level: Level) {
        self.core().set_level(level)
    }

    fn is_enabled(&self, level: Level) -> bool {
        self.core().is_enabled(level)
    }

    fn is_trace_enabled(&self) -> bool {
        self.is_enabled(Level::Trace)
    }

    fn is_debug_enabled(&self) -> bool {
        self.is_enabled(Level::Debug)
    }

    fn is_info_enabled(&self) -> bool {
        self.is_enabled(Level::Info)
    }

    fn is_warn_enabled(&self) -> bool {
        self.is_enabled(Level::Warn)
    }

    fn is_error_enabled(&self) -> bool {
        self.is_enabled(Level::Error)
    }

    fn is_fatal_enabled(&self) -> bool {
        self.is_enabled(Level::Fatal)
    }

    fn is_panic_enabled(&self) -> bool {
        self.is_enabled(Level::Panic)
    }

    /// Writes `args` at `level` if that level is enabled.
    ///
    /// Fatal and panic go through here without their side effects; use
    /// [`Logger::fatalf`] and [`Logger::panicf`] for those.
    #[track_caller]
    fn log(&self, level: Level, args: Arguments<'_>) {
        if self.is_enabled(level) {
            self.write(level, Location::caller(), args);
        }
    }

    #[track_caller]
    fn trace(&self, message: &dyn Display) {
        self.log(Level::Trace, format_args!("{}", message));
    }

    #[track_caller]
    fn tracef(&self, args: Arguments<'_>) {
        self.log(Level::Trace, args);
    }

    #[track_caller]
    fn debug(&self, message: &dyn Display) {
        self.log(Level::Debug, format_args!("{}", message));
    }

    #[track_caller]
    fn debugf(&self, args: Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    #[track_caller]
    fn info(&self, message: &dyn Display) {
        self.log(Level::Info, format_args!("{}", message));
    }

    #[track_caller]
    fn infof(&self, args: Arguments<'_>) {
        self.log(Level::Info, args);
    }

    #[track_caller]
    fn warn(&self, message: &dyn Display) {
        self.log(Level::Warn, format_args!("{}", message));
    }

    #[track_caller]
    fn warnf(&self, args: Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    #[track_caller]
    fn error(&self, message: &dyn Display) {
        self.log(Level::Error, format_args!("{}", message));
    }

    #[track_caller]
    fn errorf(&self, args: Arguments<'_>) {
        self.log(Level::Error, args);
    }

    /// Writes the message, then exits the process with status 1.
    ///
    /// Nothing unwinds: destructors of the caller's pending values do not run.
    #[track_caller]
    fn fatal(&self, message: &dyn Display) {
        self.fatalf(format_args!("{}", message));
    }

    /// Formatted variant of [`Logger::fatal`].
    #[track_caller]
    fn fatalf(&self, args: Arguments<'_>) {
        if self.is_fatal_enabled() {
            self.write(Level::Fatal, Location::caller(), args);
            std::process::exit(1);
        }
    }

    /// Writes the message, then panics with a [`LogPanic`] payload carrying it.
    ///
    /// Unlike [`Logger::fatal`] this unwinds and can be caught upstream.
    #[track_caller]
    fn panic(&self, message: &dyn Display) {
        self.panicf(format_args!("{}", message));
    }

    /// Formatted variant of [`Logger::panic`].
    #[track_caller]
    fn panicf(&self, args: Arguments<'_>) {
        if self.is_panic_enabled() {
            let message = args.to_string();
            self.write(Level::Panic, Location::caller(), format_args!("{}", message));
            std::panic::panic_any(LogPanic::new(message));
        }
    }
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.tracef(::std::format_args!($($arg)+))
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.debugf(::std::format_args!($($arg)+))
    }};
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.infof(::std::format_args!($($arg)+))
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.warnf(::std::format_args!($($arg)+))
    }};
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.errorf(::std::format_args!($($arg)+))
    }};
}

/// Logs at fatal level and exits the process when enabled.
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.fatalf(::std::format_args!($($arg)+))
    }};
}

/// Logs at panic level and raises a [`LogPanic`](crate::LogPanic).
#[macro_export]
macro_rules! log_panic {
    ($logger:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.panicf(::std::format_args!($($arg)+))
    }};
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Recording {
        core: LoggerCore,
        lines: Mutex<Vec<(Level, u32, String)>>,
    }

    impl Recording {
        fn new(level: Level) -> Self {
            Self {
                core: LoggerCore::new("recording", level),
                lines: Mutex::new(Vec::new()),
            }
        }

        fn lines(&self) -> Vec<(Level, u32, String)> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl Logger for Recording {
        fn core(&self) -> &LoggerCore {
            &self.core
        }

        fn write(&self, level: Level, location: &'static Location<'static>, args: Arguments<'_>) {
            self.lines
                .lock()
                .unwrap()
                .push((level, location.line(), args.to_string()));
        }
    }

    /// Panics if formatted, proving disabled calls never format.
    struct Explosive;

    impl Display for Explosive {
        fn fmt(&self, _: &mut Formatter<'_>) -> fmt::Result {
            panic!("disabled log call formatted its arguments");
        }
    }

    #[test]
    fn predicates_follow_threshold() {
        let logger = Recording::new(Level::Trace);
        for threshold in Level::ALL {
            logger.set_level(threshold);
            let checks = [
                (Level::Trace, logger.is_trace_enabled()),
                (Level::Debug, logger.is_debug_enabled()),
                (Level::Info, logger.is_info_enabled()),
                (Level::Warn, logger.is_warn_enabled()),
                (Level::Error, logger.is_error_enabled()),
                (Level::Fatal, logger.is_fatal_enabled()),
                (Level::Panic, logger.is_panic_enabled()),
            ];
            for (level, enabled) in checks {
                assert_eq!(enabled, level >= threshold, "{} at threshold {}", level, threshold);
            }
        }
    }

    #[test]
    fn enabled_calls_reach_the_backend() {
        let logger = Recording::new(Level::Info);
        logger.info(&"plain");
        logger.warnf(format_args!("{} + {}", 1, 2));
        log_error!(logger, "code {:03}", 7);

        let messages: Vec<_> = logger.lines().into_iter().map(|(l, _, m)| (l, m)).collect();
        assert_eq!(
            messages,
            vec![
                (Level::Info, "plain".to_string()),
                (Level::Warn, "1 + 2".to_string()),
                (Level::Error, "code 007".to_string()),
            ]
        );
    }

    #[test]
    fn disabled_calls_do_not_format() {
        let logger = Recording::new(Level::Warn);
        logger.trace(&Explosive);
        logger.debugf(format_args!("{}", Explosive));
        log_info!(logger, "{}", Explosive);
        assert!(logger.lines().is_empty());
    }

    #[test]
    fn location_is_the_call_site() {
        let logger = Recording::new(Level::Trace);
        let line = line!() + 1;
        logger.debug(&"here");
        let dyn_logger: &dyn Logger = &logger;
        let dyn_line = line!() + 1;
        log_info!(dyn_logger, "there");

        let lines = logger.lines();
        assert_eq!(lines[0].1, line);
        assert_eq!(lines[1].1, dyn_line);
    }

    #[test]
    fn fatal_is_a_no_op_when_disabled() {
        let logger = Recording::new(Level::Panic);
        logger.fatal(&"ignored");
        log_fatal!(logger, "ignored {}", 2);
        assert!(logger.lines().is_empty());
    }

    #[test]
    fn panic_writes_then_unwinds_with_message() {
        let logger = Recording::new(Level::Panic);
        let payload = panic::catch_unwind(AssertUnwindSafe(|| {
            log_panic!(logger, "broken {}", "invariant");
        }))
        .unwrap_err();

        let signal = payload.downcast::<LogPanic>().unwrap();
        assert_eq!(signal.message(), "broken invariant");
        assert_eq!(logger.lines()[0].0, Level::Panic);
        assert_eq!(logger.lines()[0].2, "broken invariant");
    }

    #[test]
    fn core_debug_shows_name_and_level() {
        let core = LoggerCore::new("app", Level::Warn);
        assert_eq!(format!("{:?}", core), "LoggerCore { name: \"app\", level: Warn }");
    }
}
