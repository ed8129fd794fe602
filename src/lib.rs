//! TerraMap - terrain perception and world mapping for a small ground rover
//!
//! Each camera frame is rectified to a top-down view, split into ground,
//! obstacle and sample masks by color thresholds and projected into the
//! rover's world frame, where an attitude-gated accumulator folds it into a
//! persistent occupancy map. Navigable ground is also reduced to polar
//! (distance, angle) readings for the steering layer.
//!
//! The crate is a pure library: the driver loop owns a [`RoverState`] and
//! calls [`Perception::perception_step`] once per frame.

pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod frame;
pub mod map;
pub mod pipeline;
pub mod state;
pub mod threshold;
pub mod transform;

pub use config::PerceptionConfig;
pub use coords::PolarReading;
pub use error::PerceptionError;
pub use frame::{Frame, Mask};
pub use map::{MapChannel, WorldMap};
pub use pipeline::Perception;
pub use state::RoverState;
pub use threshold::TerrainClass;
pub use transform::PerspectiveTransform;
