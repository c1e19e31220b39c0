#[cfg(not(all(test, feature = "loom")))]
pub(crate) use core::sync::atomic::{AtomicU8, Ordering};

#[cfg(all(test, feature = "loom"))]
pub(crate) use loom::sync::atomic::{AtomicU8, Ordering};
