//! Square wave oscillator implementation.

use super::{Oscillator, Timeline};
use crate::{DeviceConfig, Frequency, MAX_AMPLITUDE, MIN_AMPLITUDE, Result, Sample, SampleStream};

/// A square wave oscillator.
///
/// The output starts high at [`MAX_AMPLITUDE`] and flips between high and
/// `0` every `period` samples, so one full cycle spans two periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareOscillator {
    timeline: Timeline,
}

impl SquareOscillator {
    /// Creates a square wave emitting `length` samples, flipping every
    /// `period` samples.
    pub fn new(length: usize, period: usize) -> Result<Self> {
        Ok(Self {
            timeline: Timeline::new(length, period)?,
        })
    }

    /// Creates a square wave that never runs out in practice.
    pub fn unbounded(period: usize) -> Result<Self> {
        Self::new(usize::MAX, period)
    }

    /// Creates a square wave at `frequency` lasting `seconds`.
    pub fn tone(config: &DeviceConfig, frequency: impl Into<Frequency>, seconds: f64) -> Result<Self> {
        Self::new(config.samples_for(seconds)?, config.period_for(frequency)?)
    }
}

impl SampleStream for SquareOscillator {
    fn next_sample(&mut self) -> Option<Sample> {
        let position = self.timeline.advance()?;
        let high = (position / self.timeline.period) % 2 == 0;
        Some(if high { MAX_AMPLITUDE } else { MIN_AMPLITUDE })
    }
}

impl Oscillator for SquareOscillator {
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
