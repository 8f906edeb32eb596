//! Full-wave rectification
//!
//! Chime strikes can swing either way from the baseline, so peak detection
//! runs on absolute amplitude.

/// Rectify a signal (absolute value of every sample)
///
/// # Example
///
/// ```
/// use chime_drift::preprocessing::rectify::rectify;
///
/// assert_eq!(rectify(&[-3.0, 2.0, -0.5]), vec![3.0, 2.0, 0.5]);
/// ```
pub fn rectify(samples: &[f32]) -> Vec<f32> {
    samples.iter().map(|s| s.abs()).collect()
}

/// Largest value in a rectified signal (0.0 for an empty one)
pub fn max_amplitude(rectified: &[f32]) -> f32 {
    rectified.iter().copied().fold(0.0f32, f32::max)
}
