//! PNG snapshots for offline inspection
//!
//! Debug-only helpers that dump the vision image or the accumulated world
//! map to disk. Nothing in the pipeline depends on these; they exist so a
//! mission run can be inspected after the fact.

use anyhow::{Context, Result};
use std::path::Path;

use crate::frame::Frame;
use crate::map::{MapChannel, WorldMap};

/// Save an RGB frame as a PNG file.
pub fn save_frame_png(frame: &Frame, path: &Path) -> Result<()> {
    let img = image::RgbImage::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.data().to_vec(),
    )
    .context("frame buffer does not match its dimensions")?;

    img.save(path)
        .with_context(|| format!("Failed to write frame snapshot to {:?}", path))?;
    tracing::info!("Saved frame snapshot to {:?}", path);
    Ok(())
}

/// Save the world map as a PNG, one color channel per map channel
/// (R = obstacle, G = sample, B = ground), each normalized to its own peak
/// count. Row 0 of the map is the bottom row of the image so the map reads
/// with world-y up.
pub fn save_worldmap_png(map: &WorldMap, path: &Path) -> Result<()> {
    let size = map.size() as u32;
    let channels = [MapChannel::Obstacle, MapChannel::Sample, MapChannel::Ground];

    let mut peaks = [0.0f32; 3];
    for (i, &ch) in channels.iter().enumerate() {
        for y in 0..map.size() {
            for x in 0..map.size() {
                peaks[i] = peaks[i].max(map.get(x, y, ch));
            }
        }
    }

    let img = image::RgbImage::from_fn(size, size, |x, y| {
        let map_y = (size - 1 - y) as usize;
        let mut rgb = [0u8; 3];
        for (i, &ch) in channels.iter().enumerate() {
            if peaks[i] > 0.0 {
                let v = map.get(x as usize, map_y, ch) / peaks[i];
                rgb[i] = (v * 255.0).round() as u8;
            }
        }
        image::Rgb(rgb)
    });

    img.save(path)
        .with_context(|| format!("Failed to write world map snapshot to {:?}", path))?;
    tracing::info!("Saved world map snapshot to {:?}", path);
    Ok(())
}
