//! Audio I/O and result persistence
//!
//! The collaborators around the analysis core:
//! - Recordings and the audio source trait
//! - WAV decoding using hound
//! - Result sinks
//! - Recording archive retention

pub mod archive;
pub mod decoder;
pub mod sample;
pub mod sink;
