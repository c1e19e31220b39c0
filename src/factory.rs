//! Factory registration and logger lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "singleton")]
use lazy_static::lazy_static;

use crate::error::LoggerError;
use crate::levels::Level;
use crate::logger::Logger;

/// Backend specific configuration. Keys and value shapes are defined, and
/// validated, entirely by the receiving backend.
pub type LoggingParameters = BTreeMap<String, serde_json::Value>;

/// Produces named loggers for one backend.
pub trait LoggerFactory: Send + Sync {
    /// Returns a logger called `name`. A new call may return a fresh instance.
    fn get_logger(&self, name: &str) -> Arc<dyn Logger>;

    /// Applies backend specific parameters.
    ///
    /// Backends decide which keys they understand; the default accepts
    /// and ignores everything.
    fn set_logging_parameters(&self, _params: &LoggingParameters) -> Result<(), LoggerError> {
        Ok(())
    }

    /// Threshold given to loggers created from now on.
    fn set_default_level(&self, level: Level);

    fn default_level(&self) -> Level;
}

/// Holds the active [`LoggerFactory`].
///
/// Starts unregistered. [`LoggerRegistry::get_logger`] panics until a factory
/// is installed with [`LoggerRegistry::set_factory`], so a wiring mistake at
/// startup is loud instead of silently dropping messages.
pub struct LoggerRegistry {
    factory: RwLock<Option<Arc<dyn LoggerFactory>>>,
}

impl LoggerRegistry {
    pub const fn new() -> Self {
        Self {
            factory: RwLock::new(None),
        }
    }

    /// Installs `factory`, replacing any previous one.
    ///
    /// Loggers handed out by a replaced factory keep working with whatever
    /// backend they were built on.
    ///
    /// # Panics
    ///
    /// If `factory` is `None`: running without a backend is not a valid state.
    pub fn set_factory(&self, factory: Option<Arc<dyn LoggerFactory>>) {
        let Some(factory) = factory else {
            panic!("LoggerFactory can't be absent");
        };

        let previous = self
            .factory
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(factory);

        tracing::debug!(replaced = previous.is_some(), "logger factory registered");
    }

    /// Asks the registered factory for a logger called `name`.
    ///
    /// # Panics
    ///
    /// If no factory has been registered yet.
    pub fn get_logger(&self, name: &str) -> Arc<dyn Logger> {
        match self.factory() {
            Some(factory) => factory.get_logger(name),
            None => panic!(
                "LoggerFactory was not set! Register a factory before you get a logger instance"
            ),
        }
    }

    /// The registered factory, if any.
    ///
    /// # Returns
    ///
    /// `None` until [`LoggerRegistry::set_factory`] has been called, afterwards
    /// the most recently registered factory.
    pub fn factory(&self) -> Option<Arc<dyn LoggerFactory>> {
        self.factory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True once a factory has been registered. There is no way back.
    pub fn is_registered(&self) -> bool {
        self.factory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("registered", &self.is_registered())
            .finish()
    }
}

#[cfg(feature = "singleton")]
lazy_static! {
    static ref GLOBAL_REGISTRY: LoggerRegistry = LoggerRegistry::new();
}

/// Registers the process-wide factory. See [`LoggerRegistry::set_factory`].
#[cfg(feature = "singleton")]
pub fn set_logger_factory(factory: Option<Arc<dyn LoggerFactory>>) {
    GLOBAL_REGISTRY.set_factory(factory)
}

/// Gets a logger from the process-wide factory. See [`LoggerRegistry::get_logger`].
#[cfg(feature = "singleton")]
pub fn get_logger(name: &str) -> Arc<dyn Logger> {
    GLOBAL_REGISTRY.get_logger(name)
}

#[cfg(feature = "singleton")]
pub fn get_logger_factory() -> Option<Arc<dyn LoggerFactory>> {
    GLOBAL_REGISTRY.factory()
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::logger::LoggerCore;
    use std::fmt::Arguments;
    use std::panic::Location;
    use std::sync::Mutex;

    struct Quiet(LoggerCore);

    impl Logger for Quiet {
        fn core(&self) -> &LoggerCore {
            &self.0
        }

        fn write(&self, _: Level, _: &'static Location<'static>, _: Arguments<'_>) {}
    }

    struct Tagged {
        tag: &'static str,
        default_level: Mutex<Level>,
    }

    impl Tagged {
        fn new(tag: &'static str) -> Arc<dyn LoggerFactory> {
            Arc::new(Self {
                tag,
                default_level: Mutex::new(Level::Debug),
            })
        }
    }

    impl LoggerFactory for Tagged {
        fn get_logger(&self, name: &str) -> Arc<dyn Logger> {
            Arc::new(Quiet(LoggerCore::new(format!("{}:{}", self.tag, name), self.default_level())))
        }

        fn set_default_level(&self, level: Level) {
            *self.default_level.lock().unwrap() = level;
        }

        fn default_level(&self) -> Level {
            *self.default_level.lock().unwrap()
        }
    }

    #[test]
    fn starts_unregistered() {
        let registry = LoggerRegistry::new();
        assert!(!registry.is_registered());
        assert!(registry.factory().is_none());
    }

    #[test]
    #[should_panic(expected = "LoggerFactory was not set")]
    fn lookup_before_registration_panics() {
        LoggerRegistry::new().get_logger("early");
    }

    #[test]
    #[should_panic(expected = "LoggerFactory can't be absent")]
    fn absent_factory_panics() {
        LoggerRegistry::new().set_factory(None);
    }

    #[test]
    fn absent_factory_keeps_previous_registration() {
        let registry = LoggerRegistry::new();
        registry.set_factory(Some(Tagged::new("a")));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.set_factory(None)
        }));
        assert!(result.is_err());
        assert_eq!(registry.get_logger("x").name(), "a:x");
    }

    #[test]
    fn re_registration_replaces_factory() {
        let registry = LoggerRegistry::new();
        registry.set_factory(Some(Tagged::new("a")));
        let before = registry.get_logger("x");

        registry.set_factory(Some(Tagged::new("b")));
        let after = registry.get_logger("x");

        assert_eq!(before.name(), "a:x");
        assert_eq!(after.name(), "b:x");
    }

    #[test]
    fn default_parameters_are_accepted() {
        let factory = Tagged::new("a");
        let mut params = LoggingParameters::new();
        params.insert("anything".into(), serde_json::json!(1));
        assert!(factory.set_logging_parameters(&params).is_ok());
    }

    #[test]
    fn default_level_applies_to_new_loggers() {
        let registry = LoggerRegistry::new();
        registry.set_factory(Some(Tagged::new("a")));
        let early = registry.get_logger("early");

        registry.factory().unwrap().set_default_level(Level::Error);
        let late = registry.get_logger("late");

        assert_eq!(early.level(), Level::Debug);
        assert_eq!(late.level(), Level::Error);
    }
}
