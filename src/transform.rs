//! Perspective rectification of camera frames
//!
//! Maps the forward camera's trapezoidal view of the ground plane onto a
//! top-down (bird's-eye) grid using a fixed 4-point homography. The
//! transform is computed once at pipeline setup from the calibration
//! quadrilaterals; per frame we only resample.

use crate::error::PerceptionError;
use crate::frame::Frame;

/// Perspective transformation (3x3 homography) between the camera view and
/// the rectified top-down view.
#[derive(Debug, Clone)]
pub struct PerspectiveTransform {
    /// The 3x3 transformation matrix stored in row-major order
    matrix: [f64; 9],
    /// Inverse matrix for reverse mapping (used for warping)
    inverse: [f64; 9],
    /// Frame dimensions the transform was built for
    width: usize,
    height: usize,
}

impl PerspectiveTransform {
    /// Compute the perspective transform mapping 4 source points to 4
    /// destination points, using the Direct Linear Transform (DLT)
    /// algorithm. Output frames share the input dimensions.
    ///
    /// Fails with [`PerceptionError::DegenerateCalibration`] when the point
    /// sets cannot define a homography (coincident or collinear points).
    pub fn new(
        src: [(f64, f64); 4],
        dst: [(f64, f64); 4],
        width: usize,
        height: usize,
    ) -> Result<Self, PerceptionError> {
        let matrix = compute_homography(src, dst).ok_or_else(|| {
            PerceptionError::DegenerateCalibration(
                "source points do not span a quadrilateral".into(),
            )
        })?;
        let inverse = compute_homography(dst, src).ok_or_else(|| {
            PerceptionError::DegenerateCalibration(
                "destination points do not span a quadrilateral".into(),
            )
        })?;

        Ok(Self {
            matrix,
            inverse,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Transform a point from source to destination coordinates.
    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        apply_homography(&self.matrix, x, y)
    }

    /// Transform a point from destination to source coordinates (inverse).
    #[inline]
    pub fn inverse_transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        apply_homography(&self.inverse, x, y)
    }

    /// Resample the input frame through the homography, producing a
    /// rectified frame of identical dimensions. Destination pixels whose
    /// source coordinates fall outside the image read as black; those
    /// regions are discarded by the downstream thresholds anyway.
    pub fn warp(&self, src: &Frame) -> Result<Frame, PerceptionError> {
        if src.width() != self.width || src.height() != self.height {
            return Err(PerceptionError::ShapeMismatch {
                what: "camera frame",
                got_width: src.width(),
                got_height: src.height(),
                want_width: self.width,
                want_height: self.height,
            });
        }

        let mut out = Frame::new(self.width, self.height);
        for dst_y in 0..self.height {
            for dst_x in 0..self.width {
                let (src_x, src_y) = self.inverse_transform_point(dst_x as f64, dst_y as f64);
                let pixel = bilinear_sample(src, src_x, src_y);
                out.set_pixel(dst_x, dst_y, pixel);
            }
        }
        Ok(out)
    }
}

/// Compute a 3x3 homography matrix from 4 point correspondences using the
/// Direct Linear Transform (DLT) algorithm.
///
/// For each correspondence (x,y) -> (x',y') we get two linear equations in
/// the eight unknown matrix entries (h9 is fixed at 1), giving an 8x8
/// system. Returns `None` when the system is singular.
fn compute_homography(src: [(f64, f64); 4], dst: [(f64, f64); 4]) -> Option<[f64; 9]> {
    let mut a = [[0.0f64; 8]; 8];
    let mut b = [0.0f64; 8];

    for i in 0..4 {
        let (x, y) = src[i];
        let (xp, yp) = dst[i];

        let row1 = i * 2;
        let row2 = i * 2 + 1;

        a[row1][0] = x;
        a[row1][1] = y;
        a[row1][2] = 1.0;
        a[row1][6] = -xp * x;
        a[row1][7] = -xp * y;
        b[row1] = xp;

        a[row2][3] = x;
        a[row2][4] = y;
        a[row2][5] = 1.0;
        a[row2][6] = -yp * x;
        a[row2][7] = -yp * y;
        b[row2] = yp;
    }

    let h = solve_linear_system(&mut a, &mut b)?;

    Some([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0])
}

/// Solve an 8x8 linear system using Gaussian elimination with partial
/// pivoting. Returns `None` when the matrix is singular.
fn solve_linear_system(a: &mut [[f64; 8]; 8], b: &mut [f64; 8]) -> Option<[f64; 8]> {
    let n = 8;

    for col in 0..n {
        // Find pivot
        let mut max_row = col;
        let mut max_val = a[col][col].abs();
        for row in (col + 1)..n {
            if a[row][col].abs() > max_val {
                max_val = a[row][col].abs();
                max_row = row;
            }
        }

        if max_row != col {
            a.swap(col, max_row);
            b.swap(col, max_row);
        }

        let pivot = a[col][col];
        if pivot.abs() < 1e-10 {
            return None;
        }

        for row in (col + 1)..n {
            let factor = a[row][col] / pivot;
            for j in col..n {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Some(x)
}

/// Apply a homography matrix to a point.
#[inline]
fn apply_homography(h: &[f64; 9], x: f64, y: f64) -> (f64, f64) {
    let w = h[6] * x + h[7] * y + h[8];
    if w.abs() < 1e-10 {
        return (x, y);
    }
    let xp = (h[0] * x + h[1] * y + h[2]) / w;
    let yp = (h[3] * x + h[4] * y + h[5]) / w;
    (xp, yp)
}

/// Bilinear interpolation with a constant black border: neighbors outside
/// the image contribute zero instead of clamping to the edge.
#[inline]
fn bilinear_sample(src: &Frame, x: f64, y: f64) -> [u8; 3] {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let fetch = |px: i64, py: i64| -> [f64; 3] {
        if px < 0 || py < 0 || px >= src.width() as i64 || py >= src.height() as i64 {
            return [0.0; 3];
        }
        let p = src.pixel(px as usize, py as usize);
        [p[0] as f64, p[1] as f64, p[2] as f64]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let mut result = [0u8; 3];
    for c in 0..3 {
        let value = p00[c] * (1.0 - fx) * (1.0 - fy)
            + p10[c] * fx * (1.0 - fy)
            + p01[c] * (1.0 - fx) * fy
            + p11[c] * fx * fy;
        result[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    result
}
