//! Real-time output to the default audio device.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, FromSample, SampleFormat, SampleRate, SizedSample, StreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, warn};

use super::Sink;
use crate::{DeviceConfig, Error, Result, Sample};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// State shared between the sink and the device callbacks.
struct StreamState {
    /// Set once the callback has played its first real sample.
    primed: AtomicBool,
    /// Set while the producer has nothing left to push. A dry ring is
    /// expected then and is not an underrun.
    idle: AtomicBool,
    underruns: AtomicUsize,
    failed: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            primed: AtomicBool::new(false),
            idle: AtomicBool::new(true),
            underruns: AtomicUsize::new(0),
            failed: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }
}

impl StreamState {
    /// Books one finished device callback.
    ///
    /// `played` is whether the callback popped at least one sample and
    /// `starved` whether it ran out before filling its buffer. A callback
    /// counts as at most one underrun.
    fn record_callback(&self, played: bool, starved: bool) {
        if played {
            self.primed.store(true, Ordering::Relaxed);
        }
        let feeding = self.primed.load(Ordering::Relaxed) && !self.idle.load(Ordering::Relaxed);
        if starved && feeding {
            self.underruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn fail(&self, reason: String) {
        if let Ok(mut failure) = self.failure.lock() {
            failure.get_or_insert(reason);
        }
        self.failed.store(true, Ordering::Release);
    }

    fn check(&self) -> Result<()> {
        if !self.failed.load(Ordering::Acquire) {
            return Ok(());
        }
        let reason = self
            .failure
            .lock()
            .ok()
            .and_then(|failure| failure.clone())
            .unwrap_or_else(|| "output stream failed".into());
        Err(Error::Device(reason))
    }
}

/// A mono sink playing on the host's default output device.
///
/// Opening the sink acquires the device and starts its stream on a
/// dedicated thread; samples are handed over through a lock-free ring
/// buffer of `buffer_size` slots. [`accept`](Sink::accept) waits while the
/// ring is full, which paces rendering to real time. Every device channel
/// receives the same sample.
///
/// Dropping the sink stops the stream and releases the device.
pub struct DeviceSink {
    producer: Producer<Sample>,
    capacity: usize,
    latency: Duration,
    state: Arc<StreamState>,
    config: DeviceConfig,
    shutdown: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl DeviceSink {
    /// Opens the default output device with `config`.
    pub fn open(config: &DeviceConfig) -> Result<Self> {
        config.validate()?;

        let (producer, consumer) = RingBuffer::<Sample>::new(config.buffer_size);
        let state = Arc::new(StreamState::default());
        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sampling_rate),
            buffer_size: BufferSize::Default,
        };

        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let thread_state = Arc::clone(&state);

        let worker = thread::Builder::new()
            .name("tonestream-device".into())
            .spawn(move || {
                let stream = match open_stream(&stream_config, consumer, thread_state) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                // Returns once the sender side is dropped with the sink.
                let _ = shutdown_rx.recv();
                drop(stream);
            })
            .map_err(Error::Spawn)?;

        let ready = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(Error::Device("device thread exited during setup".into())));
        if let Err(err) = ready {
            let _ = worker.join();
            return Err(err);
        }

        Ok(Self {
            producer,
            capacity: config.buffer_size,
            latency: Duration::from_secs_f64(
                config.buffer_size as f64 / f64::from(config.sampling_rate),
            ),
            state,
            config: *config,
            shutdown: Some(shutdown_tx),
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Number of device callbacks that ran out of samples while playback
    /// was still feeding the ring, counted since the last flush.
    ///
    /// The ring draining at the end of a song does not count.
    pub fn underruns(&self) -> usize {
        self.state.underruns.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        self.state.check()?;
        if self.producer.is_abandoned() {
            return Err(Error::Device("output stream closed".into()));
        }
        Ok(())
    }
}

impl Sink for DeviceSink {
    fn accept(&mut self, sample: Sample) -> Result<()> {
        self.state.idle.store(false, Ordering::Relaxed);
        loop {
            self.check()?;
            if self.producer.push(sample).is_ok() {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.state.idle.store(true, Ordering::Relaxed);
        while self.producer.slots() < self.capacity {
            self.check()?;
            thread::sleep(POLL_INTERVAL);
        }
        self.state.primed.store(false, Ordering::Relaxed);
        // The device may still be holding its last hardware buffer.
        thread::sleep(self.latency);

        let underruns = self.state.underruns.swap(0, Ordering::Relaxed);
        if underruns > 0 {
            warn!(underruns, "output ring ran dry during playback");
        }
        Ok(())
    }
}

impl Drop for DeviceSink {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("device thread panicked");
        }
    }
}

fn open_stream(
    config: &StreamConfig,
    consumer: Consumer<Sample>,
    state: Arc<StreamState>,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(Error::NoDevice)?;
    let format = device
        .default_output_config()
        .map_err(|err| Error::Device(err.to_string()))?
        .sample_format();

    debug!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        ?format,
        sampling_rate = config.sample_rate.0,
        channels = config.channels,
        "opening output stream"
    );

    let stream = match format {
        SampleFormat::F32 => build_stream::<f32>(&device, config, consumer, state)?,
        SampleFormat::I16 => build_stream::<i16>(&device, config, consumer, state)?,
        SampleFormat::U16 => build_stream::<u16>(&device, config, consumer, state)?,
        SampleFormat::I8 => build_stream::<i8>(&device, config, consumer, state)?,
        SampleFormat::U8 => build_stream::<u8>(&device, config, consumer, state)?,
        other => {
            return Err(Error::Device(format!("unsupported sample format: {}", other)));
        }
    };

    stream
        .play()
        .map_err(|err| Error::Device(err.to_string()))?;
    Ok(stream)
}

/// Builds a stream converting our unsigned samples into the device format.
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut consumer: Consumer<Sample>,
    state: Arc<StreamState>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<Sample>,
{
    let channels = usize::from(config.channels);
    let error_state = Arc::clone(&state);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut played = false;
                let mut starved = false;
                for frame in data.chunks_mut(channels) {
                    let value = match consumer.pop() {
                        Ok(sample) => {
                            played = true;
                            T::from_sample(sample)
                        }
                        Err(_) => {
                            starved = true;
                            T::EQUILIBRIUM
                        }
                    };
                    frame.fill(value);
                }
                state.record_callback(played, starved);
            },
            move |err| error_state.fail(err.to_string()),
            None,
        )
        .map_err(|err| Error::Device(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn underruns(state: &StreamState) -> usize {
        state.underruns.load(Ordering::Relaxed)
    }

    #[test]
    fn test_no_underruns_before_first_sample() {
        let state = StreamState::default();
        state.idle.store(false, Ordering::Relaxed);
        state.record_callback(false, true);
        state.record_callback(false, true);
        assert_eq!(underruns(&state), 0);
    }

    #[test]
    fn test_underruns_count_once_per_callback() {
        let state = StreamState::default();
        state.idle.store(false, Ordering::Relaxed);

        state.record_callback(true, false);
        assert_eq!(underruns(&state), 0);

        // Many empty frames in one callback still make a single underrun.
        state.record_callback(true, true);
        state.record_callback(false, true);
        assert_eq!(underruns(&state), 2);
    }

    #[test]
    fn test_draining_ring_is_not_an_underrun() {
        let state = StreamState::default();
        state.idle.store(false, Ordering::Relaxed);
        state.record_callback(true, false);

        // What a flush does: stop feeding, then let the device run dry.
        state.idle.store(true, Ordering::Relaxed);
        state.record_callback(true, true);
        for _ in 0..10 {
            state.record_callback(false, true);
        }
        assert_eq!(underruns(&state), 0);
    }

    #[test]
    fn test_failure_keeps_first_reason() {
        let state = StreamState::default();
        assert!(state.check().is_ok());
        state.fail("device unplugged".into());
        state.fail("stream error".into());
        match state.check() {
            Err(Error::Device(reason)) => assert_eq!(reason, "device unplugged"),
            other => panic!("unexpected {:?}", other.err()),
        }
    }
}
