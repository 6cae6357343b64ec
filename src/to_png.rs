#![cfg(feature = "host")]
//! Host-side PNG previews of a [`PixelStore`].

use crate::led_matrix::{CHIP_SIZE, PixelStore};
use png::{BitDepth, ColorType, Encoder};
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const LIT_RGB: [u8; 3] = [255, 32, 16];
const UNLIT_RGB: [u8; 3] = [48, 8, 8];
const BACKGROUND_RGB: [u8; 3] = [0, 0, 0];
const CHIP_GAP_RGB: [u8; 3] = [24, 24, 24];

/// Render a `PixelStore` into a PNG file sized to the requested maximum dimension.
///
/// Each LED is drawn as a round dot; chip boundaries are drawn as thin grey lines.
///
/// # Errors
///
/// Returns an error if the file cannot be created or the PNG cannot be encoded.
pub fn write_pixels_png<const N: usize>(
    pixels: &PixelStore<N>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let panel_width = u32::try_from(pixels.col_depth())?;
    let panel_height = u32::try_from(pixels.row_depth())?;
    let cell_size = select_cell_size(panel_width, panel_height, target_max_dimension);
    let (width, height, bytes) = panel_pixels(pixels, cell_size);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&bytes)?;
    writer.finish()?;
    Ok(())
}

/// Render a `PixelStore` into raw 8-bit RGB bytes, returning `(width, height, bytes)`.
#[must_use]
pub fn panel_pixels<const N: usize>(pixels: &PixelStore<N>, cell_size: u32) -> (u32, u32, Vec<u8>) {
    assert!(cell_size >= 4, "cell_size must be at least 4");
    let columns = pixels.col_depth() as u32;
    let rows = pixels.row_depth() as u32;
    let width = columns * cell_size;
    let height = rows * cell_size;
    let mut bytes = vec![0u8; (width * height * 3) as usize];
    let center = (cell_size - 1) as i32 / 2;
    let radius = (cell_size as i32 - 2) / 2;
    let radius_sq = radius * radius;

    for y in 0..height {
        for x in 0..width {
            let row = (y / cell_size) as usize;
            let col = (x / cell_size) as usize;
            let local_x = (x % cell_size) as i32 - center;
            let local_y = (y % cell_size) as i32 - center;
            let on_chip_edge = (x % (cell_size * CHIP_SIZE as u32) == 0 && x > 0)
                || (y % (cell_size * CHIP_SIZE as u32) == 0 && y > 0);

            // Guide lines stay in the gaps between LED discs.
            let rgb = if local_x * local_x + local_y * local_y <= radius_sq {
                if pixels.pixel(row, col).unwrap_or(false) {
                    LIT_RGB
                } else {
                    UNLIT_RGB
                }
            } else if on_chip_edge {
                CHIP_GAP_RGB
            } else {
                BACKGROUND_RGB
            };

            let index = ((y * width + x) * 3) as usize;
            bytes[index..index + 3].copy_from_slice(&rgb);
        }
    }

    (width, height, bytes)
}

fn select_cell_size(panel_width: u32, panel_height: u32, target_max_dimension: u32) -> u32 {
    assert!(target_max_dimension > 0, "target_max_dimension must be positive");
    let largest = panel_width.max(panel_height).max(1);
    (target_max_dimension / largest).max(4)
}
