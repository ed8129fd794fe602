//! Configuration for the perception pipeline
//!
//! Every tunable the pipeline uses lives here: the rectification
//! quadrilaterals, the color threshold bands, the polar band limits and the
//! world map geometry. Values are plain serde types persisted as TOML so a
//! camera calibration survives between runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PerceptionError;

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectification geometry: where the calibration trapezoid sits in the
/// camera image and how large the rectified destination square is.
///
/// The source quad is measured once against a calibration grid laid on flat
/// ground in front of the camera; it depends on resolution and mounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectificationConfig {
    /// The four corners of the calibration square as seen by the camera.
    /// Order: bottom-left, bottom-right, top-right, top-left.
    pub source: [Point; 4],

    /// Half-size of the destination square, in rectified pixels.
    #[serde(default = "default_dst_size")]
    pub dst_size: f64,

    /// Gap between the destination square and the bottom edge of the
    /// rectified image, in pixels. Accounts for the camera seeing ground
    /// slightly ahead of the rover body rather than under it.
    #[serde(default = "default_bottom_offset")]
    pub bottom_offset: f64,
}

fn default_dst_size() -> f64 {
    5.0
}

fn default_bottom_offset() -> f64 {
    6.0
}

impl Default for RectificationConfig {
    fn default() -> Self {
        Self {
            source: [
                Point::new(14.0, 140.0),
                Point::new(301.0, 140.0),
                Point::new(200.0, 96.0),
                Point::new(118.0, 96.0),
            ],
            dst_size: default_dst_size(),
            bottom_offset: default_bottom_offset(),
        }
    }
}

impl RectificationConfig {
    /// Source corners as (x, y) tuples.
    pub fn source_corners(&self) -> [(f64, f64); 4] {
        [
            (self.source[0].x, self.source[0].y),
            (self.source[1].x, self.source[1].y),
            (self.source[2].x, self.source[2].y),
            (self.source[3].x, self.source[3].y),
        ]
    }

    /// Destination corners for a frame of the given dimensions: a
    /// 2*dst_size square centered horizontally, raised `bottom_offset`
    /// pixels off the bottom edge, ordered to match `source_corners`.
    pub fn destination_corners(&self, width: usize, height: usize) -> [(f64, f64); 4] {
        let half_w = width as f64 / 2.0;
        let h = height as f64;
        [
            (half_w - self.dst_size, h - self.bottom_offset),
            (half_w + self.dst_size, h - self.bottom_offset),
            (half_w + self.dst_size, h - 2.0 * self.dst_size - self.bottom_offset),
            (half_w - self.dst_size, h - 2.0 * self.dst_size - self.bottom_offset),
        ]
    }
}

/// A per-channel threshold band, inclusive on both ends where the
/// classification mode uses both ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThresholdBand {
    pub low: [u8; 3],
    pub high: [u8; 3],
}

impl ThresholdBand {
    pub fn new(low: [u8; 3], high: [u8; 3]) -> Self {
        Self { low, high }
    }
}

/// Color threshold bands for the three terrain classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// High threshold shared by ground (strictly above) and obstacle
    /// (strictly below) classification. The low triple is unused by both.
    #[serde(default = "default_terrain_band")]
    pub terrain: ThresholdBand,

    /// Inclusive band matching the yellow sample rocks.
    #[serde(default = "default_sample_band")]
    pub sample: ThresholdBand,
}

fn default_terrain_band() -> ThresholdBand {
    ThresholdBand::new([0, 0, 0], [160, 160, 160])
}

fn default_sample_band() -> ThresholdBand {
    ThresholdBand::new([120, 110, 0], [205, 180, 70])
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            terrain: default_terrain_band(),
            sample: default_sample_band(),
        }
    }
}

/// Distance band applied to the polar navigation readings, in rectified
/// pixels from the rover origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PolarBand {
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
}

fn default_min_distance() -> f64 {
    30.0
}

fn default_max_distance() -> f64 {
    60.0
}

impl Default for PolarBand {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
        }
    }
}

/// World map geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    /// Side length of the square world map, in cells.
    #[serde(default = "default_world_size")]
    pub world_size: usize,

    /// Rectified pixels per world map cell.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_world_size() -> usize {
    200
}

fn default_scale() -> f64 {
    10.0
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            world_size: default_world_size(),
            scale: default_scale(),
        }
    }
}

/// Main configuration structure for the perception pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerceptionConfig {
    #[serde(default)]
    pub rectification: RectificationConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub polar: PolarBand,

    #[serde(default)]
    pub map: MapConfig,
}

impl PerceptionConfig {
    /// Check the value ranges the pipeline arithmetic depends on. Run once
    /// at pipeline setup so a bad config fails fast instead of mid-frame.
    pub fn validate(&self) -> Result<(), PerceptionError> {
        if self.map.world_size == 0 {
            return Err(PerceptionError::InvalidConfiguration(
                "map.world_size must be at least 1".into(),
            ));
        }
        if !self.map.scale.is_finite() || self.map.scale <= 0.0 {
            return Err(PerceptionError::InvalidConfiguration(format!(
                "map.scale must be a positive finite number, got {}",
                self.map.scale
            )));
        }
        Ok(())
    }

    /// Load configuration from a file, or create default if it doesn't exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config: PerceptionConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))?;
            tracing::info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            let config = PerceptionConfig::default();
            config.save(path)?;
            tracing::info!("Created default configuration at {:?}", path);
            Ok(config)
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
