//! Frequencies and their conversion into oscillator periods.

use crate::{Error, Result};

/// A frequency value in Hz.
///
/// Oscillators are parameterized by a period in samples rather than a
/// frequency; `Frequency` bridges the two given a sampling rate.
///
/// # Examples
///
/// ```
/// use tonestream::Frequency;
///
/// let c5 = Frequency::from_hz(523.3);
/// assert_eq!(c5.period_at(48_000).unwrap(), 92);
///
/// // MIDI note number 69 is A4
/// let a4: Frequency = 69u8.into();
/// assert!((a4.as_f64() - 440.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency(f64);

impl Frequency {
    /// Creates a frequency from Hz.
    pub const fn from_hz(hz: f64) -> Self {
        Frequency(hz)
    }

    /// Creates a frequency from a MIDI note number (69 = A4 = 440 Hz).
    pub fn from_midi(midi_note: u8) -> Self {
        Frequency(440.0 * 2.0_f64.powf((f64::from(midi_note) - 69.0) / 12.0))
    }

    /// Returns the frequency in Hz.
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Number of samples in one cycle at `sampling_rate`, rounded to the
    /// nearest whole sample.
    ///
    /// Fails with [`Error::InvalidFrequency`] for zero, negative or
    /// non-finite frequencies, and with [`Error::ZeroPeriod`] when the
    /// frequency is so high that a cycle rounds down to no samples at all.
    pub fn period_at(&self, sampling_rate: u32) -> Result<usize> {
        if !self.0.is_finite() || self.0 <= 0.0 {
            return Err(Error::InvalidFrequency(self.0));
        }
        let period = (f64::from(sampling_rate) / self.0).round();
        if period < 1.0 {
            return Err(Error::ZeroPeriod);
        }
        Ok(period as usize)
    }
}

impl From<f64> for Frequency {
    fn from(hz: f64) -> Self {
        Frequency::from_hz(hz)
    }
}

impl From<u8> for Frequency {
    fn from(midi_note: u8) -> Self {
        Frequency::from_midi(midi_note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hz() {
        assert_eq!(Frequency::from_hz(440.0).as_f64(), 440.0);
        let freq: Frequency = 784.0.into();
        assert_eq!(freq.as_f64(), 784.0);
    }

    #[test]
    fn test_from_midi() {
        assert!((Frequency::from_midi(69).as_f64() - 440.0).abs() < 0.01);
        assert!((Frequency::from_midi(57).as_f64() - 220.0).abs() < 0.01);
    }

    #[test]
    fn test_period_rounds_to_nearest() {
        assert_eq!(Frequency::from_hz(523.3).period_at(48_000).unwrap(), 92);
        assert_eq!(Frequency::from_hz(659.3).period_at(48_000).unwrap(), 73);
        assert_eq!(Frequency::from_hz(784.0).period_at(48_000).unwrap(), 61);
        assert_eq!(Frequency::from_hz(1.0).period_at(4).unwrap(), 4);
    }

    #[test]
    fn test_period_rejects_bad_frequencies() {
        assert!(matches!(
            Frequency::from_hz(0.0).period_at(48_000),
            Err(Error::InvalidFrequency(_))
        ));
        assert!(matches!(
            Frequency::from_hz(-440.0).period_at(48_000),
            Err(Error::InvalidFrequency(_))
        ));
        assert!(matches!(
            Frequency::from_hz(f64::NAN).period_at(48_000),
            Err(Error::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_period_too_short() {
        assert!(matches!(
            Frequency::from_hz(100_000.0).period_at(48_000),
            Err(Error::ZeroPeriod)
        ));
    }
}
