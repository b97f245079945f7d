//! Output device parameters.
//!
//! The signal graph never talks to the device directly. These values only
//! feed numeric constants (periods and lengths) into oscillator
//! construction, and tell the device sink how to open its stream.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Frequency, Result};

/// Sampling rate, channel layout and buffering for the output device.
///
/// The defaults describe a 48 kHz mono 16-bit device with a 1024-sample
/// buffer.
///
/// # Examples
///
/// ```
/// use tonestream::DeviceConfig;
///
/// let config = DeviceConfig::default();
/// assert_eq!(config.samples_for(4.0).unwrap(), 192_000);
/// assert_eq!(config.period_for(784.0).unwrap(), 61);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Samples per second.
    pub sampling_rate: u32,
    /// 1 for mono, 2 for stereo. The mono signal is copied to every channel.
    pub channels: u16,
    /// Bytes per sample on the device side, 1 or 2.
    pub bit_depth: u16,
    /// Samples buffered between the renderer and the device.
    pub buffer_size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 48_000,
            channels: 1,
            bit_depth: 2,
            buffer_size: 1024,
        }
    }
}

impl DeviceConfig {
    /// Checks every field is in range.
    pub fn validate(&self) -> Result<()> {
        if self.sampling_rate == 0 {
            return Err(Error::InvalidConfig("sampling rate must be positive".into()));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(Error::InvalidConfig(format!(
                "channel count must be 1 or 2, got {}",
                self.channels
            )));
        }
        if !(1..=2).contains(&self.bit_depth) {
            return Err(Error::InvalidConfig(format!(
                "bit depth must be 1 or 2 bytes, got {}",
                self.bit_depth
            )));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer size must be positive".into()));
        }
        Ok(())
    }

    /// Oscillator period for `frequency` at this sampling rate.
    pub fn period_for(&self, frequency: impl Into<Frequency>) -> Result<usize> {
        frequency.into().period_at(self.sampling_rate)
    }

    /// Number of samples covering `seconds` of playback, rounded to the
    /// nearest sample.
    pub fn samples_for(&self, seconds: f64) -> Result<usize> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::InvalidDuration(seconds));
        }
        Ok((f64::from(self.sampling_rate) * seconds).round() as usize)
    }
}
