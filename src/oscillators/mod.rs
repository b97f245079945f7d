//! Waveform oscillators.
//!
//! Oscillators are the leaves of a signal graph. Each one emits a finite
//! run of quantized samples and then reports exhaustion.

mod sawtooth;
mod square;
mod traits;

pub use sawtooth::SawtoothOscillator;
pub use square::SquareOscillator;
pub use traits::Oscillator;

pub(crate) use traits::Timeline;
