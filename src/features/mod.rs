//! Feature extraction modules
//!
//! This module contains the strike detection algorithms:
//! - Peak picking
//! - Candidate window matching
//! - Adaptive threshold search

pub mod chime;
