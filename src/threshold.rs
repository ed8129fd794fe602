//! Color threshold terrain classification
//!
//! The simulated terrain separates cleanly by brightness: navigable ground
//! is bright sand, obstacles are dark rock walls and the sample rocks carry
//! a distinct yellow signature. A fixed per-channel threshold test on the
//! rectified frame is enough to split the three apart; no filtering or
//! learned detection is involved.

use crate::config::ThresholdBand;
use crate::frame::{Frame, Mask};

/// The three terrain classes the pipeline distinguishes.
///
/// Each class interprets the threshold band differently, so the dispatch is
/// a closed enum rather than a free predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainClass {
    /// Bright, navigable ground: every channel strictly above the high
    /// threshold.
    Ground,
    /// Dark obstacle terrain: every channel strictly below the high
    /// threshold. The low triple is unused.
    Obstacle,
    /// Sample rock color signature: every channel inside the inclusive
    /// [low, high] band.
    Sample,
}

/// Classify every pixel of a rectified frame, producing a binary mask of
/// the same dimensions.
pub fn classify(frame: &Frame, class: TerrainClass, band: &ThresholdBand) -> Mask {
    let mut mask = Mask::new(frame.width(), frame.height());
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let rgb = frame.pixel(x, y);
            mask.set(x, y, matches_class(rgb, class, band));
        }
    }
    mask
}

#[inline]
fn matches_class(rgb: [u8; 3], class: TerrainClass, band: &ThresholdBand) -> bool {
    match class {
        TerrainClass::Ground => (0..3).all(|c| rgb[c] > band.high[c]),
        TerrainClass::Obstacle => (0..3).all(|c| rgb[c] < band.high[c]),
        TerrainClass::Sample => (0..3).all(|c| rgb[c] >= band.low[c] && rgb[c] <= band.high[c]),
    }
}
