//! Drives a composed graph into a sink.
//!
//! [`play`] is the whole playback loop: pull a sample, hand it to the sink,
//! repeat until the graph is exhausted. [`spawn`] runs the same loop on a
//! dedicated thread, one graph per thread. Independent sounds that should
//! play at the same time each get their own graph and worker, and share
//! the output through a [`SharedSink`](crate::SharedSink).

use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::{Error, Result, SampleStream, Sink};

/// Pulls `stream` to exhaustion, forwarding every sample to `sink`.
///
/// Returns the number of samples rendered. A sink error stops the loop
/// immediately and is returned as-is; samples already accepted stay
/// rendered. The sink is flushed once the stream runs out.
///
/// A stream that never runs out keeps this loop going forever.
///
/// # Examples
///
/// ```
/// use tonestream::{Sample, SquareOscillator, player};
///
/// # fn main() -> tonestream::Result<()> {
/// let mut square = SquareOscillator::new(6, 2)?;
/// let mut rendered: Vec<Sample> = Vec::new();
/// assert_eq!(player::play(&mut square, &mut rendered)?, 6);
/// assert_eq!(rendered, vec![65_535, 65_535, 0, 0, 65_535, 65_535]);
/// # Ok(())
/// # }
/// ```
pub fn play<S, K>(stream: &mut S, sink: &mut K) -> Result<usize>
where
    S: SampleStream + ?Sized,
    K: Sink + ?Sized,
{
    debug!("playback started");

    let mut rendered = 0usize;
    while let Some(sample) = stream.next_sample() {
        if let Err(err) = sink.accept(sample) {
            error!(rendered, %err, "sink rejected sample, aborting playback");
            return Err(err);
        }
        rendered += 1;
    }

    if let Err(err) = sink.flush() {
        error!(rendered, %err, "sink failed to flush");
        return Err(err);
    }

    debug!(rendered, "playback finished");
    Ok(rendered)
}

/// A playback worker started by [`spawn`].
pub struct Playback {
    handle: JoinHandle<Result<usize>>,
}

impl Playback {
    /// Returns true once the worker has stopped, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker and returns what [`play`] returned.
    pub fn join(self) -> Result<usize> {
        self.handle.join().map_err(|_| Error::WorkerPanicked)?
    }
}

/// Moves `stream` and `sink` onto a new thread and plays the stream there.
pub fn spawn<S, K>(mut stream: S, mut sink: K) -> Result<Playback>
where
    S: SampleStream + Send + 'static,
    K: Sink + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("tonestream-player".into())
        .spawn(move || play(&mut stream, &mut sink))
        .map_err(Error::Spawn)?;
    Ok(Playback { handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Clip, Sample};

    /// Accepts a fixed number of samples, then fails.
    struct Limited {
        accepted: Vec<Sample>,
        capacity: usize,
        flushed: bool,
    }

    impl Sink for Limited {
        fn accept(&mut self, sample: Sample) -> Result<()> {
            if self.accepted.len() == self.capacity {
                return Err(Error::Sink("device full".into()));
            }
            self.accepted.push(sample);
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    #[test]
    fn test_play_renders_everything() {
        let mut sink = Limited {
            accepted: Vec::new(),
            capacity: 10,
            flushed: false,
        };
        let rendered = play(&mut Clip::new(vec![1, 2, 3]), &mut sink).unwrap();
        assert_eq!(rendered, 3);
        assert_eq!(sink.accepted, vec![1, 2, 3]);
        assert!(sink.flushed);
    }

    #[test]
    fn test_play_aborts_on_sink_error() {
        let mut sink = Limited {
            accepted: Vec::new(),
            capacity: 2,
            flushed: false,
        };
        let mut clip = Clip::new(vec![1, 2, 3, 4]);
        let result = play(&mut clip, &mut sink);
        assert!(matches!(result, Err(Error::Sink(_))));
        // Partial output stays; the failing sample was consumed from the graph.
        assert_eq!(sink.accepted, vec![1, 2]);
        assert_eq!(clip.remaining(), 1);
        assert!(!sink.flushed);
    }

    #[test]
    fn test_play_empty_stream() {
        let mut sink: Vec<Sample> = Vec::new();
        assert_eq!(play(&mut Clip::default(), &mut sink).unwrap(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_spawn_and_join() {
        let playback = spawn(Clip::new(vec![5; 100]), Vec::<Sample>::new()).unwrap();
        assert_eq!(playback.join().unwrap(), 100);
    }

    #[test]
    fn test_spawn_reports_panics() {
        struct Exploding;

        impl Sink for Exploding {
            fn accept(&mut self, _: Sample) -> Result<()> {
                panic!("sink exploded");
            }
        }

        let playback = spawn(Clip::new(vec![1]), Exploding).unwrap();
        assert!(matches!(playback.join(), Err(Error::WorkerPanicked)));
    }
}
