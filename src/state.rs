//! Shared rover state container
//!
//! The driver loop owns one `RoverState` for the whole mission and hands it
//! to the pipeline once per frame by mutable reference. The pipeline reads
//! the pose and camera fields and writes the vision, navigation and map
//! fields; nothing else touches those while a step is running.

use crate::coords::PolarReading;
use crate::frame::Frame;
use crate::map::WorldMap;

/// Default attitude gate limits, in degrees.
pub const DEFAULT_MAX_PITCH: f64 = 0.5;
pub const DEFAULT_MAX_ROLL: f64 = 0.5;

/// Mission-long mutable state shared between the driver, the perception
/// pipeline and the steering layer.
///
/// Read by the pipeline: `img`, `pos`, `yaw`, `pitch`, `roll`, `max_pitch`,
/// `max_roll`. Written by the pipeline: `vision_image`, `nav`, `worldmap`.
#[derive(Debug, Clone)]
pub struct RoverState {
    /// Latest camera frame, replaced by the driver before each step.
    pub img: Frame,

    /// World position (x, y) in map cells.
    pub pos: (f64, f64),

    /// Heading in degrees, counter-clockwise positive.
    pub yaw: f64,

    /// Pitch in degrees.
    pub pitch: f64,

    /// Roll in degrees.
    pub roll: f64,

    /// Attitude gate limits for map updates, in degrees.
    pub max_pitch: f64,
    pub max_roll: f64,

    /// Debug visualization, one channel per classified mask
    /// (R = obstacle, G = sample, B = ground).
    pub vision_image: Frame,

    /// Polar reading of navigable ground, overwritten every step.
    pub nav: PolarReading,

    /// Persistent occupancy map, incrementally built across the mission.
    pub worldmap: WorldMap,
}

impl RoverState {
    /// Create a fresh state for the given camera resolution and world map
    /// size. Pose starts at the origin with level attitude.
    pub fn new(frame_width: usize, frame_height: usize, world_size: usize) -> Self {
        Self {
            img: Frame::new(frame_width, frame_height),
            pos: (0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            max_pitch: DEFAULT_MAX_PITCH,
            max_roll: DEFAULT_MAX_ROLL,
            vision_image: Frame::new(frame_width, frame_height),
            nav: PolarReading::default(),
            worldmap: WorldMap::new(world_size),
        }
    }
}
