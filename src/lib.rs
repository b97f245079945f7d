//! Tonestream - pull-based sample streams for simple synthesis
//!
//! A sound is built as a tree of [`SampleStream`]s: oscillators at the
//! leaves, combinators (amplifier, echo, sequence, mixer) above them. The
//! playback loop in [`player`] pulls the root one sample at a time and hands
//! each sample to a [`Sink`] until the tree runs out.
//!
//! ```
//! use tonestream::{Mixer, Sample, SampleStreamExt, SawtoothOscillator, Sequence, SquareOscillator};
//!
//! # fn main() -> tonestream::Result<()> {
//! let lead = SawtoothOscillator::new(8, 4)?.amplify(0.1)?.echo(3, 0.5)?;
//! let bass = Sequence::new()
//!     .then(SquareOscillator::new(2, 2)?.amplify(0.1)?)
//!     .then(SquareOscillator::new(2, 1)?.amplify(0.1)?);
//! let mut song = Mixer::new().with(lead).with(bass);
//!
//! let mut rendered: Vec<Sample> = Vec::new();
//! assert_eq!(tonestream::player::play(&mut song, &mut rendered)?, 8);
//! # Ok(())
//! # }
//! ```

pub mod combinators;
pub mod config;
pub mod effects;
pub mod error;
pub mod oscillators;
pub mod player;
pub mod signals;
pub mod sink;
pub mod tuning;

// Re-export commonly used types at the crate root
pub use combinators::{Amplifier, Arithmetic, Mixer, Sequence};
pub use config::DeviceConfig;
pub use effects::Echo;
pub use error::{Error, Result};
pub use oscillators::{Oscillator, SawtoothOscillator, SquareOscillator};
pub use player::{Playback, play, spawn};
pub use signals::{
    BoxedStream, Clip, MAX_AMPLITUDE, MIN_AMPLITUDE, Sample, SampleStream, SampleStreamExt, Samples,
};
#[cfg(feature = "playback")]
pub use sink::DeviceSink;
pub use sink::{SharedSink, Sink};
#[cfg(feature = "macros")]
pub use tonestream_macros::note;
pub use tuning::Frequency;
