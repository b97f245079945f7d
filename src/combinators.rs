//! Stream combinators for scaling, concatenating and mixing.
//!
//! Combinators own their children. A parent forwards each pull to its
//! children and combines the results; `None` from a child is the normal
//! end-of-stream signal and is handled locally, never surfaced as an error.

use tracing::trace;

use crate::{BoxedStream, Error, Result, Sample, SampleStream};

/// How out-of-range results are folded back into the sample range.
///
/// Scaling a loud sample by a factor above 1, or summing several loud
/// samples, can leave the 16-bit range. `Wrapping` keeps fixed-width
/// integer semantics (the result wraps modulo 65536), `Saturating` clamps
/// to `0..=MAX_AMPLITUDE`.
///
/// # Examples
///
/// ```
/// use tonestream::Arithmetic;
///
/// assert_eq!(Arithmetic::Wrapping.add(65_000, 1_000), 464);
/// assert_eq!(Arithmetic::Saturating.add(65_000, 1_000), 65_535);
/// assert_eq!(Arithmetic::Wrapping.scale(40_000, 2.0), 14_464);
/// assert_eq!(Arithmetic::Saturating.scale(40_000, 2.0), 65_535);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arithmetic {
    /// Fixed-width wraparound.
    #[default]
    Wrapping,
    /// Clamp to the valid sample range.
    Saturating,
}

impl Arithmetic {
    /// Adds two samples.
    pub fn add(self, a: Sample, b: Sample) -> Sample {
        match self {
            Arithmetic::Wrapping => a.wrapping_add(b),
            Arithmetic::Saturating => a.saturating_add(b),
        }
    }

    /// Multiplies a sample by `factor`, truncating toward zero.
    pub fn scale(self, sample: Sample, factor: f64) -> Sample {
        self.quantize((f64::from(sample) * factor).trunc())
    }

    /// Multiplies a sample by `factor`, rounding to the nearest integer.
    pub fn scale_rounded(self, sample: Sample, factor: f64) -> Sample {
        self.quantize((f64::from(sample) * factor).round())
    }

    // `value` is already integral here, so the remainder is exact.
    fn quantize(self, value: f64) -> Sample {
        match self {
            Arithmetic::Wrapping => value.rem_euclid(65_536.0) as Sample,
            Arithmetic::Saturating => value as Sample,
        }
    }
}

pub(crate) fn finite_factor(factor: f64) -> Result<f64> {
    if factor.is_finite() {
        Ok(factor)
    } else {
        Err(Error::InvalidFactor(factor))
    }
}

/// Scales every sample of one upstream stream by a fixed factor.
///
/// Each pull takes exactly one sample from upstream. The product is
/// truncated toward zero and, by default, wrapped into the 16-bit range
/// rather than clamped; call [`saturating`](Amplifier::saturating) to clamp
/// instead. Once upstream is exhausted the amplifier is too, and upstream
/// is never pulled again.
///
/// # Examples
///
/// ```
/// use tonestream::{Amplifier, Clip, SampleStream};
///
/// let mut quieter = Amplifier::new(Clip::new(vec![1000, 65_535]), 0.1).unwrap();
/// assert_eq!(quieter.next_sample(), Some(100));
/// assert_eq!(quieter.next_sample(), Some(6553));
/// assert_eq!(quieter.next_sample(), None);
/// ```
pub struct Amplifier<S: SampleStream> {
    source: S,
    factor: f64,
    arithmetic: Arithmetic,
    done: bool,
}

impl<S: SampleStream> Amplifier<S> {
    /// Wraps `source`, scaling by `factor`. The factor must be finite.
    pub fn new(source: S, factor: f64) -> Result<Self> {
        Ok(Self {
            source,
            factor: finite_factor(factor)?,
            arithmetic: Arithmetic::default(),
            done: false,
        })
    }

    /// Clamps out-of-range products instead of wrapping them.
    pub fn saturating(self) -> Self {
        self.with_arithmetic(Arithmetic::Saturating)
    }

    pub fn with_arithmetic(mut self, arithmetic: Arithmetic) -> Self {
        self.arithmetic = arithmetic;
        self
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: SampleStream> SampleStream for Amplifier<S> {
    fn next_sample(&mut self) -> Option<Sample> {
        if self.done {
            return None;
        }
        match self.source.next_sample() {
            Some(sample) => Some(self.arithmetic.scale(sample, self.factor)),
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Plays streams one after another.
///
/// A cursor points at the current stream. When it runs out, the cursor
/// moves on and the pull is retried on the next stream, so any number of
/// empty streams are skipped within a single pull. After the last stream is
/// exhausted the sequence stays exhausted.
///
/// # Examples
///
/// ```
/// use tonestream::{Clip, SampleStream, Sequence};
///
/// let mut sequence = Sequence::new()
///     .then(Clip::new(vec![1, 2]))
///     .then(Clip::default())
///     .then(Clip::new(vec![3]));
/// let samples: Vec<u16> = std::iter::from_fn(|| sequence.next_sample()).collect();
/// assert_eq!(samples, vec![1, 2, 3]);
/// ```
#[derive(Default)]
pub struct Sequence {
    streams: Vec<BoxedStream>,
    cursor: usize,
    finished: bool,
}

impl Sequence {
    /// Creates an empty sequence, which is immediately exhausted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence playing `streams` in order.
    pub fn from_streams(streams: Vec<BoxedStream>) -> Self {
        Self {
            streams,
            cursor: 0,
            finished: false,
        }
    }

    /// Appends a stream to play after the ones already queued.
    pub fn then(mut self, stream: impl SampleStream + Send + 'static) -> Self {
        self.streams.push(Box::new(stream));
        self
    }

    /// Number of child streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Index of the stream currently playing. Equals [`len`](Self::len)
    /// once every child is exhausted.
    pub fn current(&self) -> usize {
        self.cursor
    }
}

impl SampleStream for Sequence {
    fn next_sample(&mut self) -> Option<Sample> {
        if self.finished {
            return None;
        }
        while let Some(stream) = self.streams.get_mut(self.cursor) {
            if let Some(sample) = stream.next_sample() {
                return Some(sample);
            }
            self.cursor += 1;
            trace!(cursor = self.cursor, total = self.streams.len(), "sequence advanced");
        }
        self.finished = true;
        None
    }
}

impl FromIterator<BoxedStream> for Sequence {
    fn from_iter<I: IntoIterator<Item = BoxedStream>>(iter: I) -> Self {
        Sequence::from_streams(iter.into_iter().collect())
    }
}

/// Sums several streams sample by sample.
///
/// Every child is pulled once per pull. Children that are already
/// exhausted contribute nothing but stay in the mix and are polled again
/// next time. The mixer is exhausted only when every child reports
/// exhaustion in the same pull, so it lasts as long as its longest child.
/// Sums wrap by default; see [`Arithmetic`].
///
/// # Examples
///
/// ```
/// use tonestream::{Clip, Mixer, SampleStream};
///
/// let mut mixer = Mixer::new()
///     .with(Clip::new(vec![1, 2]))
///     .with(Clip::new(vec![10, 20, 30]));
/// assert_eq!(mixer.next_sample(), Some(11));
/// assert_eq!(mixer.next_sample(), Some(22));
/// assert_eq!(mixer.next_sample(), Some(30));
/// assert_eq!(mixer.next_sample(), None);
/// ```
#[derive(Default)]
pub struct Mixer {
    streams: Vec<BoxedStream>,
    arithmetic: Arithmetic,
    finished: bool,
}

impl Mixer {
    /// Creates an empty mixer, which is immediately exhausted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mixer summing `streams`.
    pub fn from_streams(streams: Vec<BoxedStream>) -> Self {
        Self {
            streams,
            arithmetic: Arithmetic::default(),
            finished: false,
        }
    }

    /// Adds a stream to the mix.
    pub fn with(mut self, stream: impl SampleStream + Send + 'static) -> Self {
        self.streams.push(Box::new(stream));
        self
    }

    /// Clamps sums instead of wrapping them.
    pub fn saturating(self) -> Self {
        self.with_arithmetic(Arithmetic::Saturating)
    }

    pub fn with_arithmetic(mut self, arithmetic: Arithmetic) -> Self {
        self.arithmetic = arithmetic;
        self
    }

    /// Number of child streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl SampleStream for Mixer {
    fn next_sample(&mut self) -> Option<Sample> {
        if self.finished {
            return None;
        }
        let arithmetic = self.arithmetic;
        let mut mixed: Option<Sample> = None;
        for stream in self.streams.iter_mut() {
            if let Some(sample) = stream.next_sample() {
                mixed = Some(match mixed {
                    Some(sum) => arithmetic.add(sum, sample),
                    None => sample,
                });
            }
        }
        if mixed.is_none() {
            self.finished = true;
            trace!(children = self.streams.len(), "mixer exhausted");
        }
        mixed
    }
}

impl FromIterator<BoxedStream> for Mixer {
    fn from_iter<I: IntoIterator<Item = BoxedStream>>(iter: I) -> Self {
        Mixer::from_streams(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Clip, MAX_AMPLITUDE, SampleStreamExt, SquareOscillator};

    fn drain(stream: &mut impl SampleStream) -> Vec<Sample> {
        std::iter::from_fn(|| stream.next_sample()).collect()
    }

    /// Reports how many times it was pulled through a shared counter.
    struct Probe {
        inner: Clip,
        pulls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl SampleStream for Probe {
        fn next_sample(&mut self) -> Option<Sample> {
            self.pulls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.next_sample()
        }
    }

    #[test]
    fn test_arithmetic_wrapping() {
        assert_eq!(Arithmetic::Wrapping.add(MAX_AMPLITUDE, 1), 0);
        assert_eq!(Arithmetic::Wrapping.scale(MAX_AMPLITUDE, 2.0), 65_534);
        assert_eq!(Arithmetic::Wrapping.scale(10, -1.0), 65_526);
    }

    #[test]
    fn test_wrapping_scale_beyond_i64_range() {
        // 10^16 is a multiple of 2^16.
        assert_eq!(Arithmetic::Wrapping.scale(MAX_AMPLITUDE, 1e16), 0);
        assert_eq!(Arithmetic::Wrapping.scale(1, 2f64.powi(64) + 4_096.0), 4_096);
        assert_eq!(Arithmetic::Wrapping.scale(1, -(2f64.powi(40) + 5.0)), 65_531);
        assert_eq!(Arithmetic::Wrapping.scale_rounded(MAX_AMPLITUDE, -1e16), 0);
    }

    #[test]
    fn test_amplifier_huge_factor_wraps() {
        let mut amp = Amplifier::new(Clip::new(vec![1, 2]), 2f64.powi(64) + 4_096.0).unwrap();
        assert_eq!(drain(&mut amp), vec![4_096, 8_192]);
    }

    #[test]
    fn test_arithmetic_saturating() {
        assert_eq!(Arithmetic::Saturating.add(MAX_AMPLITUDE, 1), MAX_AMPLITUDE);
        assert_eq!(Arithmetic::Saturating.scale(MAX_AMPLITUDE, 2.0), MAX_AMPLITUDE);
        assert_eq!(Arithmetic::Saturating.scale(10, -1.0), 0);
    }

    #[test]
    fn test_scale_truncates_and_rounded_rounds() {
        assert_eq!(Arithmetic::Wrapping.scale(7, 0.5), 3);
        assert_eq!(Arithmetic::Wrapping.scale_rounded(7, 0.5), 4);
        assert_eq!(Arithmetic::Wrapping.scale_rounded(5, 0.1), 1);
    }

    #[test]
    fn test_amplifier_scales() {
        let mut amp = Amplifier::new(Clip::new(vec![100, 255]), 0.5).unwrap();
        assert_eq!(drain(&mut amp), vec![50, 127]);
    }

    #[test]
    fn test_amplifier_rejects_non_finite_factor() {
        assert!(matches!(
            Amplifier::new(Clip::default(), f64::NAN),
            Err(Error::InvalidFactor(_))
        ));
        assert!(matches!(
            Amplifier::new(Clip::default(), f64::INFINITY),
            Err(Error::InvalidFactor(_))
        ));
    }

    #[test]
    fn test_amplifier_identity() {
        let reference: Vec<_> = SquareOscillator::new(50, 3).unwrap().samples().collect();
        let mut amp = Amplifier::new(SquareOscillator::new(50, 3).unwrap(), 1.0).unwrap();
        assert_eq!(drain(&mut amp), reference);
    }

    #[test]
    fn test_amplifier_wraps_by_default() {
        let mut amp = Amplifier::new(Clip::new(vec![40_000]), 2.0).unwrap();
        assert_eq!(amp.next_sample(), Some(14_464));
    }

    #[test]
    fn test_amplifier_saturating() {
        let mut amp = Amplifier::new(Clip::new(vec![40_000]), 2.0).unwrap().saturating();
        assert_eq!(amp.next_sample(), Some(MAX_AMPLITUDE));
    }

    #[test]
    fn test_amplifier_stops_pulling_after_exhaustion() {
        let pulls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let probe = Probe {
            inner: Clip::new(vec![1]),
            pulls: pulls.clone(),
        };
        let mut amp = Amplifier::new(probe, 1.0).unwrap();
        assert_eq!(amp.next_sample(), Some(1));
        assert_eq!(amp.next_sample(), None);
        assert_eq!(amp.next_sample(), None);
        assert_eq!(amp.next_sample(), None);
        assert_eq!(pulls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(amp.factor(), 1.0);
    }

    #[test]
    fn test_sequence_concatenates() {
        let mut sequence = Sequence::new()
            .then(Clip::new(vec![1, 2]))
            .then(Clip::new(vec![3, 4, 5]));
        assert_eq!(sequence.len(), 2);
        assert_eq!(drain(&mut sequence), vec![1, 2, 3, 4, 5]);
        assert_eq!(sequence.current(), 2);
        assert_eq!(sequence.next_sample(), None);
    }

    #[test]
    fn test_sequence_skips_empty_streams() {
        let mut sequence: Sequence = vec![
            Clip::default().boxed(),
            SquareOscillator::new(0, 1).unwrap().boxed(),
            Clip::new(vec![42]).boxed(),
        ]
        .into_iter()
        .collect();
        assert_eq!(sequence.next_sample(), Some(42));
        assert_eq!(sequence.current(), 2);
        assert_eq!(sequence.next_sample(), None);
    }

    #[test]
    fn test_empty_sequence() {
        let mut sequence = Sequence::new();
        assert!(sequence.is_empty());
        assert_eq!(sequence.next_sample(), None);
        assert_eq!(sequence.next_sample(), None);
    }

    #[test]
    fn test_sequence_does_not_repoll_finished_children() {
        let pulls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut sequence = Sequence::new().then(Probe {
            inner: Clip::new(vec![1]),
            pulls: pulls.clone(),
        });
        assert_eq!(drain(&mut sequence), vec![1]);
        for _ in 0..5 {
            assert_eq!(sequence.next_sample(), None);
        }
        assert_eq!(pulls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mixer_sums_until_longest_ends() {
        let mut mixer = Mixer::new()
            .with(Clip::new(vec![1, 2]))
            .with(Clip::new(vec![10, 20, 30, 40, 50]));
        assert_eq!(drain(&mut mixer), vec![11, 22, 30, 40, 50]);
        assert_eq!(mixer.next_sample(), None);
    }

    #[test]
    fn test_mixer_repolls_exhausted_children() {
        let pulls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut mixer = Mixer::new()
            .with(Probe {
                inner: Clip::new(vec![1]),
                pulls: pulls.clone(),
            })
            .with(Clip::new(vec![1, 1, 1]));
        assert_eq!(drain(&mut mixer), vec![2, 1, 1]);
        // One pull per mixer pull, including the final one that ends the mix.
        assert_eq!(pulls.load(std::sync::atomic::Ordering::SeqCst), 4);
    }

    #[test]
    fn test_empty_mixer() {
        let mut mixer = Mixer::new();
        assert!(mixer.is_empty());
        assert_eq!(mixer.next_sample(), None);
    }

    #[test]
    fn test_mixer_wraps_by_default() {
        let mut mixer = Mixer::new()
            .with(Clip::new(vec![MAX_AMPLITUDE]))
            .with(Clip::new(vec![2]));
        assert_eq!(mixer.next_sample(), Some(1));
    }

    #[test]
    fn test_mixer_saturating() {
        let mut mixer = Mixer::new()
            .with(Clip::new(vec![MAX_AMPLITUDE]))
            .with(Clip::new(vec![2]))
            .saturating();
        assert_eq!(mixer.next_sample(), Some(MAX_AMPLITUDE));
    }
}
