//! The pixel model of one panel: a cube per chip, viewed as one logical grid.

use core::{convert::Infallible, fmt};

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Pixel, Size},
};

use super::geometry::{CHIP_SIZE, ChipCell, Geometry};
use crate::{Error, Result};

/// Lit/unlit state of every LED on a panel of `N` chips.
///
/// The per-chip cubes are the only storage. The logical grid
/// ([`pixel`](Self::pixel), [`set_pixel`](Self::set_pixel), and the
/// [`embedded-graphics`](https://docs.rs/embedded-graphics) [`DrawTarget`])
/// reads and writes the same bits through [`Geometry`], so a write through
/// either API is immediately visible through the other.
///
/// Bit `8 * local_row + local_col` of a cube is one LED.
///
/// # Example
///
/// ```
/// use max7221_panel::led_matrix::PixelStore;
///
/// // Two chips side by side: an 8×16 grid.
/// let mut pixels = PixelStore::<2>::new(1)?;
/// pixels.set_pixel(0, 9, true)?;
///
/// assert_eq!(pixels.cube(2)?, 0b10);
/// assert!(pixels.pixel(0, 9)?);
/// # Ok::<(), max7221_panel::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelStore<const N: usize> {
    geometry: Geometry,
    cubes: [u64; N],
}

impl<const N: usize> PixelStore<N> {
    /// Create a blank store for `N` chips tiled into `chip_rows` rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if `N` is not a positive multiple of `chip_rows`.
    pub const fn new(chip_rows: usize) -> Result<Self> {
        match Geometry::new(N, chip_rows) {
            Ok(geometry) => Ok(Self {
                geometry,
                cubes: [0; N],
            }),
            Err(err) => Err(err),
        }
    }

    /// The panel tiling.
    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Height of the logical grid in LEDs.
    #[must_use]
    pub const fn row_depth(&self) -> usize {
        self.geometry.row_depth()
    }

    /// Width of the logical grid in LEDs.
    #[must_use]
    pub const fn col_depth(&self) -> usize {
        self.geometry.col_depth()
    }

    /// Every chip's cube, indexed by chain position minus one.
    #[must_use]
    pub const fn cubes(&self) -> &[u64; N] {
        &self.cubes
    }

    /// The cube of the chip at 1-based chain position `chip`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] unless `chip` is in `1..=N`.
    pub fn cube(&self, chip: usize) -> Result<u64> {
        let index = self.geometry.chip_index(chip)?;
        self.cubes
            .get(index)
            .copied()
            .ok_or(Error::InvalidChip(chip))
    }

    /// Replace the cube of the chip at 1-based chain position `chip`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] unless `chip` is in `1..=N`.
    pub fn set_cube(&mut self, chip: usize, value: u64) -> Result<()> {
        let index = self.geometry.chip_index(chip)?;
        let cube = self.cubes.get_mut(index).ok_or(Error::InvalidChip(chip))?;
        *cube = value;
        Ok(())
    }

    /// Whether the LED at logical `(row, col)` is lit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the coordinate is off the panel.
    pub fn pixel(&self, row: usize, col: usize) -> Result<bool> {
        let cell = self.geometry.locate(row, col)?;
        Ok(self.cell(cell))
    }

    /// Light or blank the LED at logical `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the coordinate is off the panel.
    pub fn set_pixel(&mut self, row: usize, col: usize, lit: bool) -> Result<()> {
        let cell = self.geometry.locate(row, col)?;
        self.set_cell(cell, lit);
        Ok(())
    }

    /// Blank every LED.
    pub fn blank(&mut self) {
        self.fill(false);
    }

    /// Light or blank every LED.
    pub fn fill(&mut self, lit: bool) {
        self.cubes = [if lit { u64::MAX } else { 0 }; N];
    }

    /// The 8 row bytes of one chip. Byte `i` is bits `8i..8i + 8` of its cube.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] unless `chip` is in `1..=N`.
    pub fn row_bytes(&self, chip: usize) -> Result<[u8; CHIP_SIZE]> {
        Ok(self.cube(chip)?.to_le_bytes())
    }

    /// One byte per chip holding local row `local_row` of the logical grid.
    ///
    /// Walks that row of every chip-row band across the full grid width, so every
    /// logical cell of the row is classified through [`Geometry::locate`] exactly
    /// once. Bit `b` of chip `c`'s byte is local column `b`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `local_row >= 8`.
    pub fn grid_row_payload(&self, local_row: usize) -> Result<[u8; N]> {
        if local_row >= CHIP_SIZE {
            return Err(Error::OutOfRange {
                row: local_row,
                col: 0,
            });
        }
        let mut payload = [0_u8; N];
        for band in 0..self.geometry.chip_rows() {
            let row = band * CHIP_SIZE + local_row;
            for col in 0..self.geometry.col_depth() {
                let cell = self.geometry.locate(row, col)?;
                if self.cell(cell) {
                    let byte = payload
                        .get_mut(cell.chip_index)
                        .ok_or(Error::InvalidChip(cell.chip_index.saturating_add(1)))?;
                    *byte |= 1_u8 << cell.local_col;
                }
            }
        }
        Ok(payload)
    }

    fn cell(&self, cell: ChipCell) -> bool {
        self.cubes
            .get(cell.chip_index)
            .is_some_and(|cube| (cube >> cell.bit()) & 1 == 1)
    }

    fn set_cell(&mut self, cell: ChipCell, lit: bool) {
        if let Some(cube) = self.cubes.get_mut(cell.chip_index) {
            let mask = 1_u64 << cell.bit();
            if lit {
                *cube |= mask;
            } else {
                *cube &= !mask;
            }
        }
    }
}

/// Renders the logical grid, one line per row, `#` for lit and `.` for blank.
impl<const N: usize> fmt::Display for PixelStore<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.row_depth() {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..self.col_depth() {
                let lit = self.pixel(row, col).map_err(|_| fmt::Error)?;
                f.write_str(if lit { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

impl<const N: usize> OriginDimensions for PixelStore<N> {
    fn size(&self) -> Size {
        Size::new(self.col_depth() as u32, self.row_depth() as u32)
    }
}

impl<const N: usize> DrawTarget for PixelStore<N> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(col), Ok(row)) = (usize::try_from(coord.x), usize::try_from(coord.y)) else {
                continue;
            };
            // Off-panel pixels are clipped.
            if let Ok(cell) = self.geometry.locate(row, col) {
                self.set_cell(cell, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> core::result::Result<(), Self::Error> {
        self.fill(color.is_on());
        Ok(())
    }
}
