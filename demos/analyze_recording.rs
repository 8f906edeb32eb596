//! Example: Measure clock drift from one WAV recording
//!
//! Usage: `cargo run --example analyze_recording -- <recording.wav> [archive_dir]`
//!
//! Prints the result as a JSON line. Recordings that could not be analyzed
//! are copied into `archive_dir` when one is given.

use std::path::Path;

use chime_drift::io::archive::RecordingArchive;
use chime_drift::io::decoder::WavSource;
use chime_drift::io::sink::JsonLinesSink;
use chime_drift::{analyze_recording, AnalysisConfig, AudioSource, ResultSink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: analyze_recording <recording.wav> [archive_dir]")?;
    let archive_dir = args.next();

    let sample = WavSource::new(&path).load()?;
    let result = analyze_recording(&sample, &AnalysisConfig::default());

    let mut sink = JsonLinesSink::new(std::io::stdout().lock());
    sink.record(&result)?;

    if let Some(dir) = archive_dir {
        if let Some(kept) = RecordingArchive::new(dir).retain(Path::new(&path), &result)? {
            eprintln!("Kept {} for review", kept.display());
        }
    }

    Ok(())
}
