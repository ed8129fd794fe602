//! Error types for the perception pipeline

use thiserror::Error;

/// Errors produced by pipeline setup and per-frame processing.
///
/// Setup errors (`DegenerateCalibration`) are raised once when the pipeline
/// is built; per-frame errors (`ShapeMismatch`) reject the offending frame
/// before any vehicle state is touched, so a failed step never leaves a
/// partially updated map.
#[derive(Debug, Error)]
pub enum PerceptionError {
    /// The rectification point set cannot define a homography
    /// (coincident or collinear points).
    #[error("degenerate rectification points: {0}")]
    DegenerateCalibration(String),

    /// A configuration value outside the range the pipeline can work with.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An input buffer does not match the dimensions the pipeline was
    /// configured for.
    #[error("{what} is {got_width}x{got_height} but the pipeline expects {want_width}x{want_height}")]
    ShapeMismatch {
        what: &'static str,
        got_width: usize,
        got_height: usize,
        want_width: usize,
        want_height: usize,
    },
}
