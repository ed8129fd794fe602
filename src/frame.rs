//! Pixel grid types shared by the perception pipeline
//!
//! Two fixed-shape buffers flow through the pipeline: `Frame`, an
//! interleaved RGB image (camera input, rectified view, debug output), and
//! `Mask`, a single-channel binary grid produced by the terrain classifier.
//! Both are plain row-major `Vec`s; nothing here owns a color space or a
//! coordinate frame, that is the job of the modules consuming them.

/// An H×W RGB image with 8-bit interleaved channels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Create a black frame of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 3],
        }
    }

    /// Wrap an existing interleaved RGB buffer. Returns `None` when the
    /// buffer length does not match `width * height * 3`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        if data.len() != width * height * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read the RGB triple at (col, row). Caller guarantees bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let off = (y * self.width + x) * 3;
        [self.data[off], self.data[off + 1], self.data[off + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let off = (y * self.width + x) * 3;
        self.data[off] = rgb[0];
        self.data[off + 1] = rgb[1];
        self.data[off + 2] = rgb[2];
    }

    /// Raw interleaved bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// An H×W binary grid; each cell is 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Mask {
    /// Create an all-zero mask of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.width + x] = on as u8;
    }

    /// Number of set cells.
    pub fn count_on(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Iterate the (col, row) positions of all set cells in row-major order.
    pub fn on_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(move |(i, _)| (i % width, i / width))
    }
}
