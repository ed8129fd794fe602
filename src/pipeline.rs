//! Per-frame perception pipeline
//!
//! `Perception` is built once from a validated configuration and then
//! driven once per camera frame. Each step rectifies the frame, classifies
//! terrain, refreshes the debug visualization and navigation readings and
//! folds the frame's evidence into the persistent world map.

use tracing::{debug, trace};

use crate::config::PerceptionConfig;
use crate::coords::{pix_to_world, rover_coords, to_polar};
use crate::error::PerceptionError;
use crate::map::update_world_map;
use crate::state::RoverState;
use crate::threshold::{classify, TerrainClass};
use crate::transform::PerspectiveTransform;

/// The assembled perception pipeline: configuration plus the rectification
/// transform precomputed for a fixed camera resolution.
#[derive(Debug, Clone)]
pub struct Perception {
    config: PerceptionConfig,
    transform: PerspectiveTransform,
}

impl Perception {
    /// Build the pipeline for a camera of the given resolution. The config
    /// is validated and the rectification homography computed here, so a
    /// bad calibration fails at setup rather than on the first frame.
    pub fn new(
        config: PerceptionConfig,
        frame_width: usize,
        frame_height: usize,
    ) -> Result<Self, PerceptionError> {
        config.validate()?;
        let src = config.rectification.source_corners();
        let dst = config
            .rectification
            .destination_corners(frame_width, frame_height);
        let transform = PerspectiveTransform::new(src, dst, frame_width, frame_height)?;

        debug!(
            frame_width,
            frame_height,
            world_size = config.map.world_size,
            "perception pipeline ready"
        );
        Ok(Self { config, transform })
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    /// Process one camera frame and write the results back into the rover
    /// state.
    ///
    /// Reads `img`, `pos`, `yaw`, `pitch`, `roll` and the attitude limits;
    /// overwrites `vision_image` and `nav` and conditionally increments
    /// `worldmap`. On error the frame is rejected before any of those
    /// fields are touched.
    pub fn perception_step(&self, rover: &mut RoverState) -> Result<(), PerceptionError> {
        self.check_shapes(rover)?;

        // Rectify to a top-down view, then split into the three terrain
        // classes.
        let warped = self.transform.warp(&rover.img)?;
        let thresholds = &self.config.thresholds;
        let ground = classify(&warped, TerrainClass::Ground, &thresholds.terrain);
        let obstacle = classify(&warped, TerrainClass::Obstacle, &thresholds.terrain);
        let sample = classify(&warped, TerrainClass::Sample, &thresholds.sample);

        // Debug visualization: one channel per mask, binary scaled to 255.
        for y in 0..warped.height() {
            for x in 0..warped.width() {
                rover.vision_image.set_pixel(
                    x,
                    y,
                    [
                        obstacle.get(x, y) as u8 * 255,
                        sample.get(x, y) as u8 * 255,
                        ground.get(x, y) as u8 * 255,
                    ],
                );
            }
        }

        // Rover-centric coordinates per mask.
        let (ground_x, ground_y) = rover_coords(&ground);
        let (obstacle_x, obstacle_y) = rover_coords(&obstacle);
        let (sample_x, sample_y) = rover_coords(&sample);

        // Navigable terrain ahead, as (distance, angle) pairs for steering.
        rover.nav = to_polar(&ground_x, &ground_y, &self.config.polar);

        // World frame and map accumulation.
        let world_size = self.config.map.world_size;
        let scale = self.config.map.scale;
        let (xpos, ypos) = rover.pos;
        let w_ground = pix_to_world(&ground_x, &ground_y, xpos, ypos, rover.yaw, world_size, scale);
        let w_obstacle = pix_to_world(
            &obstacle_x,
            &obstacle_y,
            xpos,
            ypos,
            rover.yaw,
            world_size,
            scale,
        );
        let w_sample = pix_to_world(&sample_x, &sample_y, xpos, ypos, rover.yaw, world_size, scale);

        let applied = update_world_map(
            &mut rover.worldmap,
            &w_obstacle,
            &w_sample,
            &w_ground,
            rover.pitch,
            rover.roll,
            rover.max_pitch,
            rover.max_roll,
        );

        trace!(
            ground = ground_x.len(),
            obstacle = obstacle_x.len(),
            sample = sample_x.len(),
            nav = rover.nav.len(),
            map_updated = applied,
            "perception step complete"
        );
        Ok(())
    }

    fn check_shapes(&self, rover: &RoverState) -> Result<(), PerceptionError> {
        let want_w = self.transform.width();
        let want_h = self.transform.height();
        for (what, frame) in [("camera frame", &rover.img), ("vision image", &rover.vision_image)] {
            if frame.width() != want_w || frame.height() != want_h {
                return Err(PerceptionError::ShapeMismatch {
                    what,
                    got_width: frame.width(),
                    got_height: frame.height(),
                    want_width: want_w,
                    want_height: want_h,
                });
            }
        }
        if rover.worldmap.size() != self.config.map.world_size {
            return Err(PerceptionError::ShapeMismatch {
                what: "world map",
                got_width: rover.worldmap.size(),
                got_height: rover.worldmap.size(),
                want_width: self.config.map.world_size,
                want_height: self.config.map.world_size,
            });
        }
        Ok(())
    }
}
