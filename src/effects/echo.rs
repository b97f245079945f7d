//! Single-repeat echo over a fixed delay line.

use crate::combinators::{Arithmetic, finite_factor};
use crate::{Error, Result, Sample, SampleStream};

/// Adds one attenuated repeat of the input, `delay` samples later.
///
/// Input samples are stored in a ring buffer of exactly `delay` slots. Each
/// pull reads the slot written `delay` pulls ago (zero if it has not been
/// written yet), overwrites it with the fresh input, and returns
/// `input + round(old * attenuation)`. The buffer holds only dry input, so
/// every sample repeats once and the echo never recirculates.
///
/// The sum wraps by default; see [`Arithmetic`].
///
/// # Examples
///
/// ```
/// use tonestream::{Clip, Echo, SampleStream};
///
/// let mut echo = Echo::new(Clip::new(vec![100, 200, 300]), 2, 0.5).unwrap();
/// assert_eq!(echo.next_sample(), Some(100));
/// assert_eq!(echo.next_sample(), Some(200));
/// assert_eq!(echo.next_sample(), Some(350));
/// assert_eq!(echo.next_sample(), None);
/// ```
pub struct Echo<S: SampleStream> {
    source: S,
    buffer: Box<[Sample]>,
    // Always < buffer.len()
    cursor: usize,
    attenuation: f64,
    arithmetic: Arithmetic,
    done: bool,
}

impl<S: SampleStream> Echo<S> {
    /// Wraps `source` with a delay line of `delay` samples.
    ///
    /// Fails with [`Error::ZeroDelay`] for an empty delay line and with
    /// [`Error::InvalidFactor`] for a non-finite attenuation.
    pub fn new(source: S, delay: usize, attenuation: f64) -> Result<Self> {
        if delay == 0 {
            return Err(Error::ZeroDelay);
        }
        Ok(Self {
            source,
            buffer: vec![0; delay].into_boxed_slice(),
            cursor: 0,
            attenuation: finite_factor(attenuation)?,
            arithmetic: Arithmetic::default(),
            done: false,
        })
    }

    /// Clamps out-of-range sums instead of wrapping them.
    pub fn saturating(self) -> Self {
        self.with_arithmetic(Arithmetic::Saturating)
    }

    pub fn with_arithmetic(mut self, arithmetic: Arithmetic) -> Self {
        self.arithmetic = arithmetic;
        self
    }

    /// Lag of the repeat, in samples.
    pub fn delay(&self) -> usize {
        self.buffer.len()
    }

    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }
}

impl<S: SampleStream> SampleStream for Echo<S> {
    fn next_sample(&mut self) -> Option<Sample> {
        if self.done {
            return None;
        }
        let Some(input) = self.source.next_sample() else {
            self.done = true;
            return None;
        };

        let old = std::mem::replace(&mut self.buffer[self.cursor], input);
        self.cursor = (self.cursor + 1) % self.buffer.len();

        let repeat = self.arithmetic.scale_rounded(old, self.attenuation);
        Some(self.arithmetic.add(input, repeat))
    }
}
