//! Core trait definitions for oscillators.

use crate::{Error, Result, SampleStream};

/// Common interface for all oscillators.
///
/// An oscillator is a leaf stream emitting a fixed number of samples of a
/// periodic waveform. Its period and length are fixed at construction; the
/// position only ever moves forward, one step per emitted sample.
pub trait Oscillator: SampleStream {
    /// Samples per waveform cycle.
    fn period(&self) -> usize;

    /// Total number of samples the oscillator emits.
    fn length(&self) -> usize;

    /// Number of samples emitted so far.
    fn position(&self) -> usize;

    /// Number of samples still to come.
    fn remaining(&self) -> usize {
        self.length() - self.position()
    }

    /// Returns true once every sample has been emitted.
    fn is_exhausted(&self) -> bool {
        self.position() >= self.length()
    }
}

/// Position bookkeeping shared by the oscillators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Timeline {
    pub(crate) position: usize,
    pub(crate) length: usize,
    pub(crate) period: usize,
}

impl Timeline {
    pub(crate) fn new(length: usize, period: usize) -> Result<Self> {
        if period == 0 {
            return Err(Error::ZeroPeriod);
        }
        Ok(Self {
            position: 0,
            length,
            period,
        })
    }

    /// Returns the current position and steps past it, or `None` at the end.
    pub(crate) fn advance(&mut self) -> Option<usize> {
        if self.position >= self.length {
            return None;
        }
        let position = self.position;
        self.position += 1;
        Some(position)
    }
}
