//! A device abstraction for panels of daisy-chained MAX7221/MAX7219 8×8 LED matrices.
//!
//! [`LedMatrix`] drives `N` chips that share one SPI bus and one chip-select
//! (LOAD) line, tiled into a rectangular panel. Draw into its [`PixelStore`]
//! (by logical pixel, by per-chip cube, or with
//! [`embedded-graphics`](https://docs.rs/embedded-graphics)), then push the
//! result to hardware with [`LedMatrix::flush_grid`] or [`LedMatrix::flush_cubes`].
//!
//! # Example: Light a Diagonal
//!
//! ```rust,no_run
//! use embedded_hal::{delay::DelayNs, spi::SpiDevice};
//! use max7221_panel::{Result, led_matrix::LedMatrix};
//!
//! fn example(spi: impl SpiDevice, delay: impl DelayNs) -> Result<()> {
//!     // Four chips wired as a 2×2 square: a 16×16 panel.
//!     let mut matrix = LedMatrix::<_, _, 4>::new(spi, delay, 2)?;
//!     matrix.begin()?;
//!
//!     for index in 0..16 {
//!         matrix.pixels_mut().set_pixel(index, index, true)?;
//!     }
//!     matrix.flush_grid()
//! }
//! ```
//!
//! # Example: Draw with embedded-graphics
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::BinaryColor,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//! use embedded_hal::{delay::DelayNs, spi::SpiDevice};
//! use max7221_panel::{Result, led_matrix::LedMatrix};
//!
//! fn example(spi: impl SpiDevice, delay: impl DelayNs) -> Result<()> {
//!     // Four chips in one row: an 8×32 panel.
//!     let mut matrix = LedMatrix::<_, _, 4>::new(spi, delay, 1)?;
//!     matrix.begin()?;
//!
//!     Rectangle::new(Point::new(0, 0), Size::new(32, 8))
//!         .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!         .draw(matrix.pixels_mut())?;
//!     matrix.flush_grid()
//! }
//! ```

pub mod chain;
pub mod geometry;
pub mod pixels;

pub use chain::{ChainFrame, ChipChain, Register};
pub use geometry::{CHIP_SIZE, ChipCell, Geometry};
pub use pixels::PixelStore;

use embassy_time::Duration;
use embedded_hal::{delay::DelayNs, spi::SpiDevice};

use crate::{Error, Result};

/// Default pause after each bring-up step and between per-chip broadcasts.
///
/// Chips on long chains have been seen to ignore commands that arrive back to back.
pub const SETTLE_PAUSE_DEFAULT: Duration = Duration::from_millis(10);

/// Default brightness written during [`LedMatrix::begin`].
pub const INTENSITY_DEFAULT: u8 = 255 / 10;

const SCAN_ALL_ROWS: u8 = 0x07;
const NO_DECODE: u8 = 0x00;
const SHUTDOWN: u8 = 0x00;
const NORMAL_OPERATION: u8 = 0x01;
const TEST_OFF: u8 = 0x00;
const TEST_ON: u8 = 0x01;

/// Runtime settings for an [`LedMatrix`].
///
/// ```
/// use embassy_time::Duration;
/// use max7221_panel::led_matrix::{INTENSITY_DEFAULT, LedMatrixConfig};
///
/// let config = LedMatrixConfig::new().with_settle_pause(Duration::from_millis(2));
/// assert_eq!(config.intensity, INTENSITY_DEFAULT);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedMatrixConfig {
    /// Pause after each bring-up step and between per-chip broadcasts.
    pub settle_pause: Duration,
    /// Brightness written to every chip by [`LedMatrix::begin`].
    pub intensity: u8,
}

impl LedMatrixConfig {
    /// The default settings: [`SETTLE_PAUSE_DEFAULT`] and [`INTENSITY_DEFAULT`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settle_pause: SETTLE_PAUSE_DEFAULT,
            intensity: INTENSITY_DEFAULT,
        }
    }

    /// Replace the settle pause.
    #[must_use]
    pub const fn with_settle_pause(self, settle_pause: Duration) -> Self {
        Self {
            settle_pause,
            ..self
        }
    }

    /// Replace the bring-up brightness.
    #[must_use]
    pub const fn with_intensity(self, intensity: u8) -> Self {
        Self { intensity, ..self }
    }
}

impl Default for LedMatrixConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Which chips a configuration command reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// Every chip, `1..=N`.
    All,
    /// One chip, by 1-based chain position.
    Chip(usize),
}

/// A negative index means every chip; any other value is a chain position.
impl From<i32> for Target {
    fn from(index: i32) -> Self {
        usize::try_from(index).map_or(Self::All, Self::Chip)
    }
}

/// A panel of `N` daisy-chained MAX7221/MAX7219 chips behind one [`SpiDevice`].
///
/// Chip positions are 1-based along the chain. Every operation that sends
/// takes `&mut self` and completes its bursts before returning, so the bus is
/// never shared mid-burst. Nothing is read back from the chips: a dead or
/// miswired chip is not detected.
///
/// See the [module documentation](mod@crate::led_matrix) for examples.
pub struct LedMatrix<SPI, D, const N: usize> {
    chain: ChipChain<SPI, N>,
    delay: D,
    pixels: PixelStore<N>,
    config: LedMatrixConfig,
    intensity: [u8; N],
    shutdown: bool,
}

impl<SPI, D, const N: usize> LedMatrix<SPI, D, N>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    /// Create a panel of `N` chips tiled into `chip_rows` rows, with default settings.
    ///
    /// Nothing is sent until [`begin`](Self::begin) or another sending method is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if `N` is not a positive multiple of `chip_rows`.
    pub fn new(spi: SPI, delay: D, chip_rows: usize) -> Result<Self> {
        Self::new_with_config(spi, delay, chip_rows, LedMatrixConfig::new())
    }

    /// Create a panel with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] if `N` is not a positive multiple of `chip_rows`.
    pub fn new_with_config(
        spi: SPI,
        delay: D,
        chip_rows: usize,
        config: LedMatrixConfig,
    ) -> Result<Self> {
        let pixels = PixelStore::new(chip_rows)?;
        Ok(Self {
            chain: ChipChain::new(spi),
            delay,
            pixels,
            config,
            intensity: [0; N],
            shutdown: true,
        })
    }

    /// Bring every chip into a known state and blank the panel.
    ///
    /// For each chip, in chain order: display test off, scan all 8 rows,
    /// configured brightness, no BCD decode, blank rows, normal operation.
    /// Each step is followed by the configured settle pause.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the transport fails.
    pub fn begin(&mut self) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "LedMatrix::begin: {} chips as {}x{}",
            N,
            self.pixels.geometry().chip_rows(),
            self.pixels.geometry().chip_cols()
        );
        self.pixels.blank();
        for chip in 1..=N {
            self.send_settled(chip, Register::DisplayTest, TEST_OFF)?;
            self.send_settled(chip, Register::ScanLimit, SCAN_ALL_ROWS)?;
            self.send_settled(chip, Register::Intensity, self.config.intensity)?;
            self.remember_intensity(chip, self.config.intensity)?;
            self.send_settled(chip, Register::DecodeMode, NO_DECODE)?;
            self.send_cube(chip)?;
            self.settle();
            self.send_settled(chip, Register::Shutdown, NORMAL_OPERATION)?;
        }
        self.shutdown = false;
        Ok(())
    }

    /// Put every chip into shutdown (`true`) or normal operation (`false`).
    ///
    /// Display data is kept by the chips while shut down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the transport fails.
    pub fn set_shutdown(&mut self, shutdown: bool) -> Result<()> {
        let value = if shutdown { SHUTDOWN } else { NORMAL_OPERATION };
        for chip in 1..=N {
            self.send_settled(chip, Register::Shutdown, value)?;
        }
        self.shutdown = shutdown;
        Ok(())
    }

    /// Light every LED on every chip (`true`) or return to normal operation (`false`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the transport fails.
    pub fn set_display_test(&mut self, on: bool) -> Result<()> {
        let value = if on { TEST_ON } else { TEST_OFF };
        for chip in 1..=N {
            self.send_settled(chip, Register::DisplayTest, value)?;
        }
        Ok(())
    }

    /// Set brightness on one chip or on all of them.
    ///
    /// `target` accepts a [`Target`] or a signed index, where a negative index
    /// means every chip. Broadcasting pauses between chips; a single chip is
    /// written immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] for a chain position outside `1..=N`, or
    /// [`Error::Spi`] if the transport fails.
    pub fn set_intensity(&mut self, level: u8, target: impl Into<Target>) -> Result<()> {
        match target.into() {
            Target::All => {
                for chip in 1..=N {
                    self.send_settled(chip, Register::Intensity, level)?;
                    self.remember_intensity(chip, level)?;
                }
            }
            Target::Chip(chip) => {
                self.chain.send_to_one(chip, Register::Intensity, level)?;
                self.remember_intensity(chip, level)?;
            }
        }
        Ok(())
    }

    /// Blank the pixel store and, if `flush` is true, push blank cubes to every chip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the transport fails.
    pub fn clear(&mut self, flush: bool) -> Result<()> {
        self.pixels.blank();
        if flush {
            self.flush_cubes()?;
        }
        Ok(())
    }

    /// Send every chip's cube as 8 targeted row writes per chip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the transport fails.
    pub fn flush_cubes(&mut self) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::debug!("LedMatrix::flush_cubes: {} chips", N);
        for chip in 1..=N {
            self.send_cube(chip)?;
        }
        Ok(())
    }

    /// Send the logical grid as 8 broadcast row commands, one per local row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the transport fails.
    pub fn flush_grid(&mut self) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::debug!("LedMatrix::flush_grid: {} chips", N);
        for local_row in 0..CHIP_SIZE {
            let payload = self.pixels.grid_row_payload(local_row)?;
            self.chain
                .send_row_to_all(row_register(local_row)?, &payload)?;
        }
        Ok(())
    }

    /// Write one raw row byte to one chip. `row_selector` is in `1..=8`.
    ///
    /// The chip's cube is updated to match, so a later flush resends the same byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRowSelector`], [`Error::InvalidChip`], or [`Error::Spi`].
    pub fn write_row(&mut self, chip: usize, row_selector: u8, data: u8) -> Result<()> {
        let register = Register::digit(row_selector)?;
        let shift = u32::from(CHIP_SIZE as u8 - row_selector) * 8;
        let cube = self.pixels.cube(chip)?;
        let updated = (cube & !(0xFF_u64 << shift)) | (u64::from(data) << shift);
        self.pixels.set_cube(chip, updated)?;
        self.chain.send_to_one(chip, register, data)
    }

    /// Store a 64-bit cube for one chip and send it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] for a chain position outside `1..=N`, or
    /// [`Error::Spi`] if the transport fails.
    pub fn write_cube(&mut self, chip: usize, value: u64) -> Result<()> {
        self.pixels.set_cube(chip, value)?;
        self.send_cube(chip)
    }

    /// The panel tiling.
    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        self.pixels.geometry()
    }

    /// Number of chips in the chain.
    #[must_use]
    pub const fn num_chips(&self) -> usize {
        N
    }

    /// Height of the logical grid in LEDs.
    #[must_use]
    pub const fn row_depth(&self) -> usize {
        self.pixels.row_depth()
    }

    /// Width of the logical grid in LEDs.
    #[must_use]
    pub const fn col_depth(&self) -> usize {
        self.pixels.col_depth()
    }

    /// The settings this panel was created with.
    #[must_use]
    pub const fn config(&self) -> &LedMatrixConfig {
        &self.config
    }

    /// The brightness last sent to `chip`, or `0` if none has been sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] for a chain position outside `1..=N`.
    pub fn intensity(&self, chip: usize) -> Result<u8> {
        let index = self.geometry().chip_index(chip)?;
        self.intensity
            .get(index)
            .copied()
            .ok_or(Error::InvalidChip(chip))
    }

    /// Whether the chips were last put into shutdown. True until [`begin`](Self::begin).
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Read-only view of both pixel representations.
    #[must_use]
    pub const fn pixels(&self) -> &PixelStore<N> {
        &self.pixels
    }

    /// Mutable pixel store. Changes reach the chips on the next flush.
    pub const fn pixels_mut(&mut self) -> &mut PixelStore<N> {
        &mut self.pixels
    }

    /// Give back the SPI device and the delay.
    pub fn release(self) -> (SPI, D) {
        (self.chain.release(), self.delay)
    }

    fn send_cube(&mut self, chip: usize) -> Result<()> {
        let rows = self.pixels.row_bytes(chip)?;
        for (local_row, data) in rows.into_iter().enumerate() {
            self.chain
                .send_to_one(chip, row_register(local_row)?, data)?;
        }
        Ok(())
    }

    fn send_settled(&mut self, chip: usize, register: Register, data: u8) -> Result<()> {
        self.chain.send_to_one(chip, register, data)?;
        self.settle();
        Ok(())
    }

    fn settle(&mut self) {
        let micros = u32::try_from(self.config.settle_pause.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(micros);
    }

    fn remember_intensity(&mut self, chip: usize, level: u8) -> Result<()> {
        let index = self.geometry().chip_index(chip)?;
        let slot = self
            .intensity
            .get_mut(index)
            .ok_or(Error::InvalidChip(chip))?;
        *slot = level;
        Ok(())
    }
}

// Local row `r` (cube byte `r`) is driven by row selector `8 - r`.
fn row_register(local_row: usize) -> Result<Register> {
    let row_selector = CHIP_SIZE
        .checked_sub(local_row)
        .and_then(|selector| u8::try_from(selector).ok())
        .ok_or(Error::OutOfRange {
            row: local_row,
            col: 0,
        })?;
    Register::digit(row_selector)
}
