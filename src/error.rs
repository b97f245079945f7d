//! Error types for graph construction and playback.
//!
//! Running out of samples is not an error: streams report it with `None`
//! from [`SampleStream::next_sample`](crate::SampleStream::next_sample).
//! Everything in here is either a construction-time rejection or a failure
//! of the output side.

/// Errors raised while building a graph or rendering it to a sink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An oscillator was asked for a period of zero samples.
    #[error("oscillator period must be at least one sample")]
    ZeroPeriod,

    /// An echo was asked for a delay line of zero samples.
    #[error("echo delay must be at least one sample")]
    ZeroDelay,

    /// A scaling factor or attenuation was NaN or infinite.
    #[error("factor must be finite, got {0}")]
    InvalidFactor(f64),

    /// A frequency was zero, negative or not finite.
    #[error("frequency must be positive and finite, got {0} Hz")]
    InvalidFrequency(f64),

    /// A duration was negative or not finite.
    #[error("duration must be non-negative and finite, got {0} s")]
    InvalidDuration(f64),

    /// A device configuration value is out of range.
    #[error("invalid device configuration: {0}")]
    InvalidConfig(String),

    /// The sink refused a sample.
    #[error("sink error: {0}")]
    Sink(String),

    /// The output device failed while opening or running the stream.
    #[error("audio device error: {0}")]
    Device(String),

    /// No output device is available on this host.
    #[error("no audio output device available")]
    NoDevice,

    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A playback worker thread panicked before finishing.
    #[error("playback worker panicked")]
    WorkerPanicked,
}

impl Error {
    /// Returns true for errors raised while building a graph, before any
    /// sample has been pulled.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::ZeroPeriod
                | Error::ZeroDelay
                | Error::InvalidFactor(_)
                | Error::InvalidFrequency(_)
                | Error::InvalidDuration(_)
                | Error::InvalidConfig(_)
        )
    }
}

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
