//! Preprocessing modules
//!
//! Signal conditioning applied before strike detection.

pub mod rectify;
