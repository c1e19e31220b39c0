//! Shared, swappable output stream for backends that write text lines.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;

pub type BoxedWriter = Box<dyn Write + Send>;

lazy_static! {
    static ref GLOBAL_SINK: OutputSink = OutputSink::stderr();
}

/// Cloneable handle to one writer.
///
/// Every clone refers to the same writer, so [`OutputSink::replace`] redirects
/// all of them. Lines are written whole under the lock and never interleave.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<BoxedWriter>>,
}

impl OutputSink {
    /// Wraps `writer` in a new sink.
    ///
    /// # Arguments
    ///
    /// * `writer` - Destination for every line written through this sink or its clones.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// A sink over standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Swaps in `writer` for this sink and all of its clones.
    ///
    /// # Arguments
    ///
    /// * `writer` - The new destination.
    ///
    /// # Returns
    ///
    /// `BoxedWriter` - The writer that was installed before.
    pub fn replace<W: Write + Send + 'static>(&self, writer: W) -> BoxedWriter {
        std::mem::replace(&mut *self.lock(), Box::new(writer))
    }

    /// Writes `line` in full and flushes, holding the lock throughout.
    ///
    /// # Arguments
    ///
    /// * `line` - The bytes of one line, terminator included.
    ///
    /// # Returns
    ///
    /// A result containing the writer's error if the write or the flush failed.
    pub fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut writer = self.lock();
        writer.write_all(line)?;
        writer.flush()
    }

    // A writer that panicked mid-line is still usable for the next one.
    fn lock(&self) -> MutexGuard<'_, BoxedWriter> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

/// The process-wide sink. Standard error until replaced.
pub fn global_sink() -> OutputSink {
    GLOBAL_SINK.clone()
}

/// Redirects the process-wide sink, returning the previous writer.
pub fn set_global_writer<W: Write + Send + 'static>(writer: W) -> BoxedWriter {
    GLOBAL_SINK.replace(writer)
}
