//! Coordinate frame conversions
//!
//! Classified mask pixels move through three frames: image coordinates
//! (row/col, origin top-left), rover-centric Cartesian coordinates (origin
//! at the rover's ground contact point, forward = +x, left = +y) and the
//! world map grid. The rover-centric frame is also projected to polar
//! (distance, angle) readings for the steering layer.
//!
//! All conversions are pure; each produces fresh coordinate vectors.

use nalgebra::{Rotation2, Vector2};

use crate::config::PolarBand;
use crate::frame::Mask;

/// Polar description of terrain relative to the rover heading. Distances
/// are in rectified pixels, angles in radians measured from the forward
/// axis, positive to the left.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarReading {
    pub distances: Vec<f64>,
    pub angles: Vec<f64>,
}

impl PolarReading {
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Convert the on pixels of a mask to rover-centric coordinates.
///
/// The rover's reference point sits at the bottom-center of the rectified
/// image: forward-x = -(row - height), lateral-y = -(col - width/2). This
/// flips the row axis (image rows grow downward, forward grows away from
/// the rover) and centers the lateral offset on the image midline.
pub fn rover_coords(mask: &Mask) -> (Vec<f64>, Vec<f64>) {
    let height = mask.height() as f64;
    let half_width = mask.width() as f64 / 2.0;

    let mut xs = Vec::with_capacity(mask.count_on());
    let mut ys = Vec::with_capacity(xs.capacity());
    for (col, row) in mask.on_pixels() {
        xs.push(-(row as f64 - height));
        ys.push(-(col as f64 - half_width));
    }
    (xs, ys)
}

/// Convert rover-centric coordinates to polar readings and apply the
/// distance band filter.
///
/// The filter removes the union of two index sets computed against the
/// unfiltered distances: readings with distance > `min_distance` and
/// readings with distance < `max_distance`, preserving the relative order
/// of whatever survives. With the stock band (min 30 < max 60) the two
/// sets cover every index, so the filtered reading is empty.
/// TODO: confirm the intended band before retuning; the cutoffs as written
/// cannot retain anything while min_distance < max_distance.
pub fn to_polar(xs: &[f64], ys: &[f64], band: &PolarBand) -> PolarReading {
    debug_assert_eq!(xs.len(), ys.len());

    let mut reading = PolarReading::default();
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let dist = (x * x + y * y).sqrt();
        if dist > band.min_distance || dist < band.max_distance {
            continue;
        }
        reading.distances.push(dist);
        reading.angles.push(y.atan2(x));
    }
    reading
}

/// Rotate rover-centric coordinates by the vehicle yaw (degrees,
/// counter-clockwise positive).
pub fn rotate_pix(xs: &[f64], ys: &[f64], yaw_deg: f64) -> (Vec<f64>, Vec<f64>) {
    let rotation = Rotation2::new(yaw_deg.to_radians());

    let mut xr = Vec::with_capacity(xs.len());
    let mut yr = Vec::with_capacity(ys.len());
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let v = rotation * Vector2::new(x, y);
        xr.push(v.x);
        yr.push(v.y);
    }
    (xr, yr)
}

/// Scale rotated coordinates down to map cells and translate by the
/// vehicle's world position.
pub fn translate_pix(
    xs: &[f64],
    ys: &[f64],
    xpos: f64,
    ypos: f64,
    scale: f64,
) -> (Vec<f64>, Vec<f64>) {
    let xt = xs.iter().map(|x| x / scale + xpos).collect();
    let yt = ys.iter().map(|y| y / scale + ypos).collect();
    (xt, yt)
}

/// World map cell indices (x column indices, y row indices) of one mask's
/// classified pixels. Both vectors always have equal length and every index
/// is already clipped into the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldHits(pub Vec<usize>, pub Vec<usize>);

impl WorldHits {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Map rover-centric pixels into world map cell indices: rotate by yaw,
/// scale and translate, floor to integers and clip both axes into
/// [0, world_size - 1]. The returned indices are always valid for a map of
/// the given size.
pub fn pix_to_world(
    xs: &[f64],
    ys: &[f64],
    xpos: f64,
    ypos: f64,
    yaw_deg: f64,
    world_size: usize,
    scale: f64,
) -> WorldHits {
    let (xr, yr) = rotate_pix(xs, ys, yaw_deg);
    let (xt, yt) = translate_pix(&xr, &yr, xpos, ypos, scale);

    let limit = (world_size - 1) as i64;
    let clip = |v: f64| (v.floor() as i64).clamp(0, limit) as usize;
    let xw = xt.iter().map(|&x| clip(x)).collect();
    let yw = yt.iter().map(|&y| clip(y)).collect();
    WorldHits(xw, yw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn band(min: f64, max: f64) -> PolarBand {
        PolarBand {
            min_distance: min,
            max_distance: max,
        }
    }

    #[test]
    fn test_rover_coords_lengths_match_on_count() {
        let mut mask = Mask::new(6, 4);
        mask.set(1, 0, true);
        mask.set(3, 2, true);
        mask.set(5, 3, true);

        let (xs, ys) = rover_coords(&mask);
        assert_eq!(xs.len(), ys.len());
        assert_eq!(xs.len(), mask.count_on());
    }

    #[test]
    fn test_pixel_straight_ahead() {
        // A pixel at the top-center of the mask is directly ahead of the
        // rover at the full mask height.
        let mut mask = Mask::new(320, 160);
        mask.set(160, 0, true);

        let (xs, ys) = rover_coords(&mask);
        assert_eq!(xs, vec![160.0]);
        assert_eq!(ys, vec![0.0]);

        // A pass-through band: everything is at most INFINITY away and at
        // least 0 away.
        let polar = to_polar(&xs, &ys, &band(f64::INFINITY, 0.0));
        assert_relative_eq!(polar.distances[0], 160.0);
        assert_relative_eq!(polar.angles[0], 0.0);
    }

    #[test]
    fn test_polar_angle_sign() {
        // Lateral-left points get positive angles.
        let polar = to_polar(&[10.0, 10.0], &[10.0, -10.0], &band(f64::INFINITY, 0.0));
        assert!(polar.angles[0] > 0.0);
        assert!(polar.angles[1] < 0.0);
        assert_relative_eq!(polar.angles[0], std::f64::consts::FRAC_PI_4);
    }

    #[test]
    fn test_polar_band_defaults_drop_everything() {
        // Pins the fielded band behavior: with min_distance (30) below
        // max_distance (60) the two drop conditions cover every reading,
        // near, mid and far alike.
        let xs = vec![10.0, 45.0, 100.0];
        let ys = vec![0.0, 0.0, 0.0];
        let polar = to_polar(&xs, &ys, &PolarBand::default());
        assert!(polar.is_empty());
    }

    #[test]
    fn test_polar_band_inverted_keeps_annulus() {
        // With the cutoffs swapped the filter behaves as a plain annulus:
        // keep distance <= min and >= max simultaneously only works when
        // max <= min.
        let xs = vec![10.0, 45.0, 100.0];
        let ys = vec![0.0, 0.0, 0.0];
        let polar = to_polar(&xs, &ys, &band(60.0, 30.0));
        assert_eq!(polar.distances, vec![45.0]);
        assert_eq!(polar.angles.len(), 1);
    }

    #[test]
    fn test_rotate_zero_yaw_is_identity() {
        let xs = vec![3.0, -7.5, 0.0];
        let ys = vec![-2.0, 4.0, 9.0];
        let (xr, yr) = rotate_pix(&xs, &ys, 0.0);
        for i in 0..3 {
            assert_relative_eq!(xr[i], xs[i]);
            assert_relative_eq!(yr[i], ys[i]);
        }
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let (xr, yr) = rotate_pix(&[1.0], &[0.0], 90.0);
        assert_relative_eq!(xr[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(yr[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translate_scales_before_offset() {
        let (xt, yt) = translate_pix(&[50.0], &[-20.0], 100.0, 80.0, 10.0);
        assert_relative_eq!(xt[0], 105.0);
        assert_relative_eq!(yt[0], 78.0);
    }

    #[test]
    fn test_world_indices_always_in_bounds() {
        // Extreme poses and coordinates must still clip into the map.
        let xs = vec![1e6, -1e6, 0.0, 159.0];
        let ys = vec![-1e6, 1e6, 0.0, -160.0];
        for yaw in [0.0, 37.0, 180.0, 359.0] {
            for (px, py) in [(0.0, 0.0), (199.0, 199.0), (-500.0, 900.0)] {
                let hits = pix_to_world(&xs, &ys, px, py, yaw, 200, 10.0);
                assert_eq!(hits.len(), xs.len());
                for (&x, &y) in hits.0.iter().zip(hits.1.iter()) {
                    assert!(x <= 199);
                    assert!(y <= 199);
                }
            }
        }
    }

    #[test]
    fn test_world_floor_and_clip() {
        // A point at rover origin lands exactly on the rover's cell.
        let hits = pix_to_world(&[0.0], &[0.0], 99.7, 50.2, 45.0, 200, 10.0);
        assert_eq!(hits.0, vec![99]);
        assert_eq!(hits.1, vec![50]);

        // Negative world coordinates clip to zero.
        let hits = pix_to_world(&[100.0], &[0.0], 0.0, 0.0, 180.0, 200, 10.0);
        assert_eq!(hits.0, vec![0]);
        assert_eq!(hits.1, vec![0]);
    }
}
