//! Output side of the playback loop.
//!
//! A [`Sink`] accepts samples in playback order. The graph itself never
//! touches a sink; the driver in [`player`](crate::player) pulls samples
//! from the graph and hands them over one at a time.

#[cfg(feature = "playback")]
mod device;

use std::sync::{Arc, Mutex};

#[cfg(feature = "playback")]
pub use device::DeviceSink;

use crate::{Error, Result, Sample};

/// Something that accepts samples in playback order.
pub trait Sink {
    /// Takes one sample. A returned error aborts playback; it is not
    /// retried.
    fn accept(&mut self, sample: Sample) -> Result<()>;

    /// Waits until every accepted sample has been rendered.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Captures samples in memory.
impl Sink for Vec<Sample> {
    fn accept(&mut self, sample: Sample) -> Result<()> {
        self.push(sample);
        Ok(())
    }
}

impl<K: Sink + ?Sized> Sink for &mut K {
    fn accept(&mut self, sample: Sample) -> Result<()> {
        (**self).accept(sample)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<K: Sink + ?Sized> Sink for Box<K> {
    fn accept(&mut self, sample: Sample) -> Result<()> {
        (**self).accept(sample)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// A sink shared between several playback workers.
///
/// Cloning the handle shares the same underlying sink. Every write takes a
/// lock, so samples from concurrent workers reach the sink one at a time.
///
/// # Examples
///
/// ```
/// use tonestream::{Sample, SharedSink, Sink};
///
/// let shared = SharedSink::new(Vec::<Sample>::new());
/// let mut a = shared.clone();
/// let mut b = shared.clone();
/// a.accept(1).unwrap();
/// b.accept(2).unwrap();
/// assert_eq!(shared.with(|samples| samples.len()).unwrap(), 2);
/// ```
pub struct SharedSink<K> {
    inner: Arc<Mutex<K>>,
}

impl<K> SharedSink<K> {
    pub fn new(sink: K) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Runs `f` with exclusive access to the underlying sink.
    pub fn with<R>(&self, f: impl FnOnce(&mut K) -> R) -> Result<R> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::Sink("shared sink lock poisoned".into()))?;
        Ok(f(&mut guard))
    }

    /// Returns the underlying sink if this is the last handle.
    pub fn into_inner(self) -> Option<K> {
        Arc::try_unwrap(self.inner)
            .ok()
            .and_then(|mutex| mutex.into_inner().ok())
    }
}

impl<K> Clone for SharedSink<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Sink> Sink for SharedSink<K> {
    fn accept(&mut self, sample: Sample) -> Result<()> {
        self.with(|sink| sink.accept(sample))?
    }

    fn flush(&mut self) -> Result<()> {
        self.with(|sink| sink.flush())?
    }
}
