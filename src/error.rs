use core::convert::Infallible;

use derive_more::derive::{Display, Error};
use embedded_hal::spi::ErrorKind;

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Every variant except [`Error::Spi`] reports a programming error in the caller
/// (bad coordinates, bad chain position, bad tiling). Retrying will not help.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A logical `(row, col)` coordinate lies outside the panel.
    #[display("coordinate ({row}, {col}) is outside the panel")]
    OutOfRange {
        /// Logical row that was requested.
        row: usize,
        /// Logical column that was requested.
        col: usize,
    },

    /// A chain position lies outside `1..=num_chips`.
    #[display("chip {_0} is not in the chain")]
    InvalidChip(#[error(not(source))] usize),

    /// A per-chip payload does not have one entry per chip.
    #[display("expected {expected} per-chip bytes, got {actual}")]
    LengthMismatch {
        /// Number of chips in the chain.
        expected: usize,
        /// Length of the payload that was supplied.
        actual: usize,
    },

    /// The chip count cannot be tiled into `chip_rows` equal rows.
    #[display("{num_chips} chips cannot be tiled into {chip_rows} rows")]
    InvalidGeometry {
        /// Number of chips in the chain.
        num_chips: usize,
        /// Requested number of chip rows.
        chip_rows: usize,
    },

    /// A digit-row selector outside `1..=8`.
    #[display("row selector {_0} is not a digit register")]
    InvalidRowSelector(#[error(not(source))] u8),

    // `#[error(not(source))]` below tells `derive_more` that `embedded_hal::spi::ErrorKind`
    // does not implement Rust's `core::error::Error` trait.
    /// The SPI transport reported a failure.
    #[display("SPI transfer failed: {_0:?}")]
    Spi(#[error(not(source))] ErrorKind),
}

impl Error {
    /// Convert any `embedded-hal` SPI error into this crate's error.
    pub(crate) fn spi<E: embedded_hal::spi::Error>(err: &E) -> Self {
        Self::Spi(err.kind())
    }
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
