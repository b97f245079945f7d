//! Sawtooth wave oscillator implementation.

use super::{Oscillator, Timeline};
use crate::{DeviceConfig, Frequency, MAX_AMPLITUDE, Result, Sample, SampleStream};

/// A sawtooth wave oscillator.
///
/// Within each period the output ramps linearly from `0` towards
/// [`MAX_AMPLITUDE`], then drops sharply back to `0` at the start of the
/// next period. At position `p` the sample is
/// `round(MAX_AMPLITUDE * (p % period) / period)`.
///
/// # Examples
///
/// ```
/// use tonestream::{SampleStream, SawtoothOscillator};
///
/// let mut saw = SawtoothOscillator::new(4, 4).unwrap();
/// assert_eq!(saw.next_sample(), Some(0));
/// assert_eq!(saw.next_sample(), Some(16384));
/// assert_eq!(saw.next_sample(), Some(32768));
/// assert_eq!(saw.next_sample(), Some(49151));
/// assert_eq!(saw.next_sample(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SawtoothOscillator {
    timeline: Timeline,
}

impl SawtoothOscillator {
    /// Creates a sawtooth emitting `length` samples with `period` samples
    /// per cycle.
    ///
    /// Fails with [`Error::ZeroPeriod`](crate::Error::ZeroPeriod) when
    /// `period` is zero. A `length` of zero is allowed and yields an
    /// immediately exhausted stream.
    pub fn new(length: usize, period: usize) -> Result<Self> {
        Ok(Self {
            timeline: Timeline::new(length, period)?,
        })
    }

    /// Creates a sawtooth that never runs out in practice.
    pub fn unbounded(period: usize) -> Result<Self> {
        Self::new(usize::MAX, period)
    }

    /// Creates a sawtooth at `frequency` lasting `seconds`, with period and
    /// length derived from the device's sampling rate.
    pub fn tone(config: &DeviceConfig, frequency: impl Into<Frequency>, seconds: f64) -> Result<Self> {
        Self::new(config.samples_for(seconds)?, config.period_for(frequency)?)
    }
}

impl SampleStream for SawtoothOscillator {
    fn next_sample(&mut self) -> Option<Sample> {
        let position = self.timeline.advance()?;
        let period = self.timeline.period;
        let t = (position % period) as f64 / period as f64;
        Some((f64::from(MAX_AMPLITUDE) * t).round() as Sample)
    }
}

impl Oscillator for SawtoothOscillator {
    fn period(&self) -> usize {
        self.timeline.period
    }

    fn length(&self) -> usize {
        self.timeline.length
    }

    fn position(&self) -> usize {
        self.timeline.position
    }
}
