//! Persistent world occupancy map and the attitude-gated accumulator
//!
//! The map is a fixed square grid with one counting channel per terrain
//! class. Each frame's classified pixels, once in world coordinates, bump
//! the matching channel by one per hit. Counts only ever grow; confidence
//! in a cell is the accumulated evidence across the mission.
//!
//! Updates are gated on vehicle attitude: perspective rectification assumes
//! the camera looks at flat ground from a level platform, so frames taken
//! while pitched or rolled would smear bad geometry into the map. A tilted
//! frame is skipped entirely, never partially applied.

use crate::coords::WorldHits;

/// Channel layout of the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapChannel {
    Obstacle = 0,
    Sample = 1,
    Ground = 2,
}

/// A world_size x world_size grid with three f32 counting channels.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldMap {
    size: usize,
    data: Vec<f32>,
}

impl WorldMap {
    /// Create an empty map with the given side length in cells.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size * 3],
        }
    }

    /// Side length in cells.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Read one channel of the cell at (col = x, row = y).
    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: MapChannel) -> f32 {
        self.data[(y * self.size + x) * 3 + channel as usize]
    }

    /// Add +1 to `channel` for every (x, y) hit pair. Coordinates must
    /// already be clipped into the map; the converter guarantees this.
    pub fn add_hits(&mut self, channel: MapChannel, xs: &[usize], ys: &[usize]) {
        debug_assert_eq!(xs.len(), ys.len());
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            debug_assert!(x < self.size && y < self.size, "unclipped world index");
            self.data[(y * self.size + x) * 3 + channel as usize] += 1.0;
        }
    }

    /// Raw channel-interleaved counts, row-major.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Apply one frame's classified world hits to the map, gated by attitude.
///
/// The update happens only while `pitch < max_pitch && roll < max_roll`
/// (all in degrees); otherwise the map is left untouched for this frame.
/// Returns whether the update was applied.
pub fn update_world_map(
    map: &mut WorldMap,
    obstacle: &WorldHits,
    sample: &WorldHits,
    ground: &WorldHits,
    pitch: f64,
    roll: f64,
    max_pitch: f64,
    max_roll: f64,
) -> bool {
    if !(pitch < max_pitch && roll < max_roll) {
        tracing::warn!(pitch, roll, "attitude gate blocked map update");
        return false;
    }

    map.add_hits(MapChannel::Obstacle, &obstacle.0, &obstacle.1);
    map.add_hits(MapChannel::Sample, &sample.0, &sample.1);
    map.add_hits(MapChannel::Ground, &ground.0, &ground.1);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(pairs: &[(usize, usize)]) -> WorldHits {
        WorldHits(
            pairs.iter().map(|p| p.0).collect(),
            pairs.iter().map(|p| p.1).collect(),
        )
    }

    #[test]
    fn test_accumulation_is_additive() {
        let mut map = WorldMap::new(10);
        let ground = hits(&[(2, 3), (2, 3), (4, 4)]);
        let empty = hits(&[]);

        let applied = update_world_map(&mut map, &empty, &empty, &ground, 0.1, 0.1, 0.5, 0.5);
        assert!(applied);
        assert_eq!(map.get(2, 3, MapChannel::Ground), 2.0);
        assert_eq!(map.get(4, 4, MapChannel::Ground), 1.0);
        assert_eq!(map.get(2, 3, MapChannel::Obstacle), 0.0);

        // Running the same update again doubles the affected cells exactly.
        update_world_map(&mut map, &empty, &empty, &ground, 0.1, 0.1, 0.5, 0.5);
        assert_eq!(map.get(2, 3, MapChannel::Ground), 4.0);
        assert_eq!(map.get(4, 4, MapChannel::Ground), 2.0);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut map = WorldMap::new(10);
        let cell = hits(&[(5, 5)]);

        update_world_map(&mut map, &cell, &cell, &cell, 0.0, 0.0, 0.5, 0.5);
        assert_eq!(map.get(5, 5, MapChannel::Obstacle), 1.0);
        assert_eq!(map.get(5, 5, MapChannel::Sample), 1.0);
        assert_eq!(map.get(5, 5, MapChannel::Ground), 1.0);
    }

    #[test]
    fn test_attitude_gate_blocks_whole_update() {
        let mut map = WorldMap::new(10);
        let cell = hits(&[(1, 1)]);

        // Pitch at the limit: the comparison is strict, so no update.
        let applied = update_world_map(&mut map, &cell, &cell, &cell, 0.5, 0.0, 0.5, 0.5);
        assert!(!applied);
        assert_eq!(map.data(), WorldMap::new(10).data());

        // Roll over the limit blocks every channel, not just one.
        let applied = update_world_map(&mut map, &cell, &cell, &cell, 0.0, 3.0, 0.5, 0.5);
        assert!(!applied);
        assert!(map.data().iter().all(|&v| v == 0.0));
    }
}
