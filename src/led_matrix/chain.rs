//! Daisy-chain framing for MAX7221/MAX7219 chips that share one chip-select line.
//!
//! Every chip holds a 16-bit shift register. Bytes clocked into the first chip
//! fall through to the next one, and all chips latch whatever word they hold
//! when chip select rises. A burst therefore always carries exactly one word
//! per chip. [`ChainFrame`] builds that burst; [`ChipChain`] sends it.

use embedded_hal::spi::SpiDevice;

use crate::{Error, Result};

/// The chip's register map, at the addresses given in the MAX7221 datasheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Ignored by the chip. Used to pad bursts for chips that must not change.
    NoOp = 0x00,
    /// Row selector 1.
    Digit0 = 0x01,
    /// Row selector 2.
    Digit1 = 0x02,
    /// Row selector 3.
    Digit2 = 0x03,
    /// Row selector 4.
    Digit3 = 0x04,
    /// Row selector 5.
    Digit4 = 0x05,
    /// Row selector 6.
    Digit5 = 0x06,
    /// Row selector 7.
    Digit6 = 0x07,
    /// Row selector 8.
    Digit7 = 0x08,
    /// BCD decode per digit. `0x00` means raw segment/LED data.
    DecodeMode = 0x09,
    /// Brightness. The chip uses the low nibble.
    Intensity = 0x0A,
    /// Number of scanned rows minus one. `0x07` scans all eight.
    ScanLimit = 0x0B,
    /// `0x00` shuts the display down, `0x01` is normal operation.
    Shutdown = 0x0C,
    /// `0x01` lights every LED, `0x00` is normal operation.
    DisplayTest = 0x0F,
}

impl Register {
    const DIGITS: [Self; 8] = [
        Self::Digit0,
        Self::Digit1,
        Self::Digit2,
        Self::Digit3,
        Self::Digit4,
        Self::Digit5,
        Self::Digit6,
        Self::Digit7,
    ];

    /// Wire address of this register.
    #[must_use]
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// The digit register addressed by a row selector in `1..=8`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRowSelector`] for any other selector.
    pub const fn digit(row_selector: u8) -> Result<Self> {
        match row_selector {
            1..=8 => Ok(Self::DIGITS[(row_selector - 1) as usize]),
            _ => Err(Error::InvalidRowSelector(row_selector)),
        }
    }

    /// The row selector of a digit register, or `None` for control registers.
    #[must_use]
    pub const fn row_selector(self) -> Option<u8> {
        match self {
            Self::Digit0
            | Self::Digit1
            | Self::Digit2
            | Self::Digit3
            | Self::Digit4
            | Self::Digit5
            | Self::Digit6
            | Self::Digit7 => Some(self.addr()),
            _ => None,
        }
    }
}

const NO_OP_WORD: [u8; 2] = [Register::NoOp.addr(), 0x00];

/// One burst for a chain of `N` chips: exactly `N` 16-bit words in transmit order.
///
/// ```
/// use max7221_panel::led_matrix::{ChainFrame, Register};
///
/// let frame = ChainFrame::<4>::targeted(2, Register::Intensity, 0x05)?;
/// assert_eq!(frame.words(), [0x0000, 0x0A05, 0x0000, 0x0000]);
///
/// let frame = ChainFrame::<3>::row_broadcast(Register::Digit0, &[0xA1, 0xB2, 0xC3])?;
/// assert_eq!(frame.words(), [0x01C3, 0x01B2, 0x01A1]);
/// # Ok::<(), max7221_panel::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainFrame<const N: usize> {
    words: [[u8; 2]; N],
}

impl<const N: usize> ChainFrame<N> {
    /// A burst in which every chip receives a no-op.
    #[must_use]
    pub const fn no_op() -> Self {
        Self {
            words: [NO_OP_WORD; N],
        }
    }

    /// A burst that writes `data` to `register` on one chip and no-ops everywhere else.
    ///
    /// Positions before `chip` are transmitted first, then the command, then the
    /// positions after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] unless `chip` is in `1..=N`.
    pub fn targeted(chip: usize, register: Register, data: u8) -> Result<Self> {
        if chip == 0 || chip > N {
            return Err(Error::InvalidChip(chip));
        }
        let mut frame = Self::no_op();
        if let Some(word) = frame.words.get_mut(chip - 1) {
            *word = [register.addr(), data];
        }
        Ok(frame)
    }

    /// A burst that writes a chip-specific byte to the same register on every chip.
    ///
    /// `per_chip[i]` is destined for chain position `i + 1`. Words are transmitted
    /// from the highest chain position down to the lowest, since the first word
    /// shifted in travels farthest down the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless `per_chip.len() == N`.
    pub fn row_broadcast(register: Register, per_chip: &[u8]) -> Result<Self> {
        if per_chip.len() != N {
            return Err(Error::LengthMismatch {
                expected: N,
                actual: per_chip.len(),
            });
        }
        let mut frame = Self::no_op();
        for (word, data) in frame.words.iter_mut().zip(per_chip.iter().rev()) {
            *word = [register.addr(), *data];
        }
        Ok(frame)
    }

    /// The words in transmit order, register byte in the high half.
    #[must_use]
    pub fn words(&self) -> [u16; N] {
        self.words.map(u16::from_be_bytes)
    }

    /// The bytes exactly as they go on the wire.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.words.as_flattened()
    }
}

impl<const N: usize> Default for ChainFrame<N> {
    fn default() -> Self {
        Self::no_op()
    }
}

/// Sends [`ChainFrame`]s to a chain of `N` chips over one [`SpiDevice`].
///
/// Each frame goes out as a single `SpiDevice::write`, so chip select stays
/// asserted for the whole burst and the chips latch exactly once. Taking
/// `&mut self` keeps bursts from interleaving.
pub struct ChipChain<SPI, const N: usize> {
    spi: SPI,
}

impl<SPI, const N: usize> ChipChain<SPI, N>
where
    SPI: SpiDevice,
{
    /// Wrap an SPI device whose chip select drives the chain's LOAD line.
    #[must_use]
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Transmit a prepared frame as one chip-select window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if the transport fails.
    pub fn send(&mut self, frame: &ChainFrame<N>) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::trace!("ChipChain::send: {=[u8]:x}", frame.as_bytes());
        self.spi
            .write(frame.as_bytes())
            .map_err(|err| Error::spi(&err))
    }

    /// Write one register on one chip; every other chip receives a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChip`] for a position outside `1..=N`, or
    /// [`Error::Spi`] if the transport fails.
    pub fn send_to_one(&mut self, chip: usize, register: Register, data: u8) -> Result<()> {
        let frame = ChainFrame::targeted(chip, register, data)?;
        self.send(&frame)
    }

    /// Write the same register on every chip, each with its own data byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless `per_chip` has `N` entries, or
    /// [`Error::Spi`] if the transport fails.
    pub fn send_row_to_all(&mut self, register: Register, per_chip: &[u8]) -> Result<()> {
        let frame = ChainFrame::row_broadcast(register, per_chip)?;
        self.send(&frame)
    }

    /// Give back the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}
