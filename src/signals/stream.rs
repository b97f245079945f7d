//! The sample type and the pull contract shared by every stream.

/// One quantized amplitude value.
///
/// Signed waveform amplitude is mapped onto the unsigned 16-bit scale, so
/// silence sits around the middle of the range and both `0` and
/// [`MAX_AMPLITUDE`] are valid signal values.
pub type Sample = u16;

/// Largest representable sample value.
pub const MAX_AMPLITUDE: Sample = Sample::MAX;

/// Smallest representable sample value.
pub const MIN_AMPLITUDE: Sample = Sample::MIN;

/// A stateful, pull-based, single-use producer of samples.
///
/// Every oscillator and combinator implements this trait. Each call to
/// `next_sample()` advances the stream by one position; once the stream
/// returns `None` it is exhausted and must keep returning `None` on every
/// later call. Streams cannot be rewound.
///
/// Implementations are synchronous and not reentrant: a pull does a
/// bounded amount of work and returns immediately.
pub trait SampleStream {
    /// Produces the next sample, or `None` once the stream is exhausted.
    fn next_sample(&mut self) -> Option<Sample>;

    /// Pulls samples into `buffer` until it is full or the stream runs out.
    ///
    /// Returns the number of samples written. The stream is never pulled
    /// again after it first reports exhaustion, so slots past the returned
    /// count are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use tonestream::{Clip, SampleStream};
    ///
    /// let mut clip = Clip::new(vec![1, 2, 3]);
    /// let mut buffer = [0; 5];
    /// assert_eq!(clip.fill(&mut buffer), 3);
    /// assert_eq!(buffer, [1, 2, 3, 0, 0]);
    /// ```
    fn fill(&mut self, buffer: &mut [Sample]) -> usize {
        for (written, slot) in buffer.iter_mut().enumerate() {
            match self.next_sample() {
                Some(sample) => *slot = sample,
                None => return written,
            }
        }
        buffer.len()
    }
}

/// An owned, type-erased stream that can be moved to a worker thread.
///
/// Sequences and mixers hold their children as `BoxedStream`s, which keeps
/// graph ownership a plain tree: dropping a parent drops its children.
pub type BoxedStream = Box<dyn SampleStream + Send>;

impl<S: SampleStream + ?Sized> SampleStream for Box<S> {
    fn next_sample(&mut self) -> Option<Sample> {
        (**self).next_sample()
    }

    fn fill(&mut self, buffer: &mut [Sample]) -> usize {
        (**self).fill(buffer)
    }
}

impl<S: SampleStream + ?Sized> SampleStream for &mut S {
    fn next_sample(&mut self) -> Option<Sample> {
        (**self).next_sample()
    }

    fn fill(&mut self, buffer: &mut [Sample]) -> usize {
        (**self).fill(buffer)
    }
}

/// A finite stream that plays back a fixed list of samples.
///
/// Useful for pre-rendered material and for feeding known values into a
/// graph.
///
/// # Examples
///
/// ```
/// use tonestream::{Clip, SampleStream};
///
/// let mut clip: Clip = [10, 20].into_iter().collect();
/// assert_eq!(clip.next_sample(), Some(10));
/// assert_eq!(clip.next_sample(), Some(20));
/// assert_eq!(clip.next_sample(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clip {
    samples: Vec<Sample>,
    position: usize,
}

impl Clip {
    /// Creates a clip that yields `samples` in order.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Number of samples not yet pulled.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SampleStream for Clip {
    fn next_sample(&mut self) -> Option<Sample> {
        let sample = *self.samples.get(self.position)?;
        self.position += 1;
        Some(sample)
    }
}

impl From<Vec<Sample>> for Clip {
    fn from(samples: Vec<Sample>) -> Self {
        Clip::new(samples)
    }
}

impl FromIterator<Sample> for Clip {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Clip::new(iter.into_iter().collect())
    }
}
