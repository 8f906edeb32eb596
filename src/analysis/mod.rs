//! Drift analysis and result types
//!
//! Turns a matched strike window into a drift measurement:
//! - Expected chime (hour mark and strike count)
//! - Drift calculation
//! - Result types
//! - Batch analysis

pub mod batch;
pub mod drift;
pub mod result;
pub mod schedule;
