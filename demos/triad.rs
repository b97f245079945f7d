//! Plays a short arrangement on the default output device.
//!
//! An echoed sawtooth holds C5 for four seconds while two square notes,
//! G5 then E5, play underneath it for two seconds each.
//!
//! Run with `RUST_LOG=tonestream=trace` to watch the graph advance.

use anyhow::Result;
use tonestream::{
    DeviceConfig, DeviceSink, Mixer, SampleStreamExt, SawtoothOscillator, Sequence,
    SquareOscillator, note,
};
use tracing_subscriber::EnvFilter;

const ECHO_DELAY: usize = 3939;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = DeviceConfig::default();
    config.validate()?;

    let lead = SawtoothOscillator::tone(&config, note!("C5"), 4.0)?
        .amplify(0.1)?
        .echo(ECHO_DELAY, 0.5)?;
    let notes = Sequence::new()
        .then(SquareOscillator::tone(&config, note!("G5"), 2.0)?.amplify(0.1)?)
        .then(SquareOscillator::tone(&config, note!("E5"), 2.0)?.amplify(0.1)?);
    let song = Mixer::new().with(lead).with(notes);

    let sink = DeviceSink::open(&config)?;
    let rendered = tonestream::spawn(song, sink)?.join()?;

    println!(
        "played {} samples ({:.1} s)",
        rendered,
        rendered as f64 / f64::from(config.sampling_rate)
    );
    Ok(())
}
