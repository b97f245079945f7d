//! Builder-style composition for sample streams.

use std::iter::FusedIterator;

use crate::{Amplifier, BoxedStream, Echo, Result, Sample, SampleStream};

/// Extension trait for chaining combinators onto any stream.
///
/// This trait is implemented for every sized [`SampleStream`].
///
/// # Examples
///
/// ```
/// use tonestream::{SampleStreamExt, SquareOscillator};
///
/// # fn main() -> tonestream::Result<()> {
/// let voice = SquareOscillator::new(8, 2)?
///     .amplify(0.5)?
///     .echo(4, 0.5)?;
/// let samples: Vec<u16> = voice.samples().collect();
/// assert_eq!(samples.len(), 8);
/// # Ok(())
/// # }
/// ```
pub trait SampleStreamExt: SampleStream + Sized {
    /// Scales every sample by `factor`. See [`Amplifier`].
    fn amplify(self, factor: f64) -> Result<Amplifier<Self>> {
        Amplifier::new(self, factor)
    }

    /// Adds a single attenuated repeat `delay` samples later. See [`Echo`].
    fn echo(self, delay: usize, attenuation: f64) -> Result<Echo<Self>> {
        Echo::new(self, delay, attenuation)
    }

    /// Erases the stream type so it can sit in a sequence or mixer.
    fn boxed(self) -> BoxedStream
    where
        Self: Send + 'static,
    {
        Box::new(self)
    }

    /// Adapts the stream into an iterator over its samples.
    fn samples(self) -> Samples<Self> {
        Samples {
            stream: self,
            done: false,
        }
    }
}

impl<S: SampleStream> SampleStreamExt for S {}

/// Iterator over the samples of a stream, created by
/// [`SampleStreamExt::samples`].
///
/// The iterator is fused: the stream is not pulled again after it reports
/// exhaustion.
pub struct Samples<S> {
    stream: S,
    done: bool,
}

impl<S> Samples<S> {
    /// Returns the wrapped stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: SampleStream> Iterator for Samples<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.done {
            return None;
        }
        let sample = self.stream.next_sample();
        self.done = sample.is_none();
        sample
    }
}

impl<S: SampleStream> FusedIterator for Samples<S> {}
