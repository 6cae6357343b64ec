//! Drive a panel of daisy-chained MAX7221/MAX7219 8×8 LED matrices as one pixel grid.
//!
//! The chips share one SPI bus and one chip-select (LOAD) line and may be tiled
//! into any rows×columns arrangement. See [`led_matrix`] to get started.
//!
//! # Glossary
//!
//! - **Chain:** chips wired so serial data shifts through one chip into the next,
//!   all latching together when chip select rises.
//! - **Cube:** a 64-bit bitmap of one chip's 8×8 LEDs. Bit `8 * row + col` is one LED.
//! - **Logical grid:** the whole panel's pixels, addressed by `(row, col)` without
//!   regard to chip boundaries.
//! - **Targeted command:** a burst that writes a real register on exactly one chip
//!   and a no-op on every other chip.
//! - **Broadcast row command:** a burst that writes the same row register on every
//!   chip, each with its own data byte.
//! - **Settle pause:** a fixed delay between bring-up steps that keeps long chains
//!   from dropping commands.
#![cfg_attr(not(any(test, feature = "host")), no_std)]

mod error;
pub mod led_matrix;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
