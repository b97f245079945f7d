//! Sample stream types and traits.
//!
//! This module provides the pull contract used throughout the library:
//! - `Sample` and the amplitude bounds
//! - `SampleStream` trait implemented by every oscillator and combinator
//! - `BoxedStream` for owned, type-erased children
//! - `SampleStreamExt` for builder-style composition
//! - `Clip` for playing back fixed sample lists

mod stream;
mod ext;

pub use stream::{BoxedStream, Clip, MAX_AMPLITUDE, MIN_AMPLITUDE, Sample, SampleStream};
pub use ext::{SampleStreamExt, Samples};
