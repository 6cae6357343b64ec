//! Panel tiling and the mapping between logical pixels and chip cells.
//!
//! See [`Geometry`] for the layout rules and examples.

use crate::{Error, Result};

/// Side length, in LEDs, of one chip's square matrix.
pub const CHIP_SIZE: usize = 8;

/// Validated description of how `num_chips` chips tile a rectangular panel.
///
/// Chips are numbered along the chain, left to right within a chip row, then
/// top to bottom across chip rows. The logical grid uses a screen-style
/// convention: `(0, 0)` is the top-left LED, `row` increases downward and
/// `col` increases to the right.
///
/// ```text
/// 6 chips, 2 chip rows (16×24 logical grid):
///
///   chip0  chip1  chip2
///   chip3  chip4  chip5
/// ```
///
/// # Example
///
/// ```
/// use max7221_panel::led_matrix::{ChipCell, Geometry};
///
/// let geometry = Geometry::new(6, 2)?;
/// assert_eq!((geometry.row_depth(), geometry.col_depth()), (16, 24));
///
/// let cell = geometry.locate(9, 17)?;
/// assert_eq!(cell, ChipCell::new(5, 1, 1));
/// assert_eq!(geometry.position(cell)?, (9, 17));
/// # Ok::<(), max7221_panel::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    num_chips: usize,
    chip_rows: usize,
    chip_cols: usize,
}

impl Geometry {
    /// Tile `num_chips` chips into `chip_rows` rows of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if either count is zero or if
    /// `num_chips` is not a multiple of `chip_rows`.
    pub const fn new(num_chips: usize, chip_rows: usize) -> Result<Self> {
        if num_chips == 0 || chip_rows == 0 || num_chips % chip_rows != 0 {
            return Err(Error::InvalidGeometry {
                num_chips,
                chip_rows,
            });
        }
        Ok(Self {
            num_chips,
            chip_rows,
            chip_cols: num_chips / chip_rows,
        })
    }

    /// Number of chips in the chain.
    #[must_use]
    pub const fn num_chips(&self) -> usize {
        self.num_chips
    }

    /// Number of chip rows in the tiling.
    #[must_use]
    pub const fn chip_rows(&self) -> usize {
        self.chip_rows
    }

    /// Number of chip columns in the tiling.
    #[must_use]
    pub const fn chip_cols(&self) -> usize {
        self.chip_cols
    }

    /// Height of the logical grid in LEDs.
    #[must_use]
    pub const fn row_depth(&self) -> usize {
        self.chip_rows * CHIP_SIZE
    }

    /// Width of the logical grid in LEDs.
    #[must_use]
    pub const fn col_depth(&self) -> usize {
        self.chip_cols * CHIP_SIZE
    }

    /// Map a logical coordinate to the chip cell that drives it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `row >= row_depth()` or `col >= col_depth()`.
    pub const fn locate(&self, row: usize, col: usize) -> Result<ChipCell> {
        if row >= self.row_depth() || col >= self.col_depth() {
            return Err(Error::OutOfRange { row, col });
        }
        Ok(ChipCell {
            chip_index: (row / CHIP_SIZE) * self.chip_cols + col / CHIP_SIZE,
            local_row: row % CHIP_SIZE,
            local_col: col % CHIP_SIZE,
        })
    }

    /// Map a chip cell back to its logical coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] (carrying the 1-based chain position) if the
    /// chip index is past the end of the chain, and [`Error::OutOfRange`] if a
    /// local coordinate is not below [`CHIP_SIZE`].
    pub const fn position(&self, cell: ChipCell) -> Result<(usize, usize)> {
        if cell.chip_index >= self.num_chips {
            return Err(Error::InvalidChip(cell.chip_index.saturating_add(1)));
        }
        if cell.local_row >= CHIP_SIZE || cell.local_col >= CHIP_SIZE {
            return Err(Error::OutOfRange {
                row: cell.local_row,
                col: cell.local_col,
            });
        }
        let band_row = cell.chip_index / self.chip_cols;
        let band_col = cell.chip_index % self.chip_cols;
        Ok((
            band_row * CHIP_SIZE + cell.local_row,
            band_col * CHIP_SIZE + cell.local_col,
        ))
    }

    /// Convert a 1-based chain position into a 0-based chip index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] unless `chip` is in `1..=num_chips()`.
    pub const fn chip_index(&self, chip: usize) -> Result<usize> {
        if chip == 0 || chip > self.num_chips {
            return Err(Error::InvalidChip(chip));
        }
        Ok(chip - 1)
    }
}

/// One LED addressed by chip rather than by logical coordinate.
///
/// `chip_index` is 0-based (chain position minus one).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipCell {
    /// 0-based index of the chip along the chain.
    pub chip_index: usize,
    /// Row within the chip, `0..8`.
    pub local_row: usize,
    /// Column within the chip, `0..8`.
    pub local_col: usize,
}

impl ChipCell {
    /// Create a chip cell. Not validated until passed to [`Geometry::position`].
    #[must_use]
    pub const fn new(chip_index: usize, local_row: usize, local_col: usize) -> Self {
        Self {
            chip_index,
            local_row,
            local_col,
        }
    }

    /// Bit position of this cell inside the chip's 64-bit cube.
    #[must_use]
    pub const fn bit(&self) -> u32 {
        (self.local_row * CHIP_SIZE + self.local_col) as u32
    }
}
