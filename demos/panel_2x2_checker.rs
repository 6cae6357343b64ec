#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_rp::{
    gpio::{Level, Output},
    spi::{Config, Spi},
};
use embassy_time::{Delay, Duration, Timer};
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use embedded_hal_bus::spi::ExclusiveDevice;
use max7221_panel::{Result, led_matrix::LedMatrix};
use {defmt_rtt as _, panic_probe as _};

// Four chips wired as a 2x2 square: chips 1-2 on top, 3-4 below.
const CHIP_ROWS: usize = 2;
const SPI_HZ: u32 = 10_000_000;

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().await.unwrap_err();
    panic!("{err}");
}

async fn inner_main() -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let mut config = Config::default();
    config.frequency = SPI_HZ;
    // DIN on GP19, CLK on GP18, LOAD on GP17.
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, config);
    let load = Output::new(p.PIN_17, Level::High);
    let device = ExclusiveDevice::new(spi, load, Delay)?;

    let mut matrix = LedMatrix::<_, _, 4>::new(device, Delay, CHIP_ROWS)?;
    matrix.begin()?;

    // Checkerboard of 2x2 squares, then invert it forever.
    let mut inverted = false;
    loop {
        let pixels = matrix.pixels_mut();
        pixels.blank();
        for square_row in 0..8_i32 {
            for square_col in 0..8_i32 {
                if (square_row + square_col) % 2 == i32::from(inverted) {
                    Rectangle::new(Point::new(square_col * 2, square_row * 2), Size::new(2, 2))
                        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                        .draw(pixels)?;
                }
            }
        }
        matrix.flush_grid()?;
        defmt::info!("checkerboard inverted={}", inverted);

        inverted = !inverted;
        Timer::after(Duration::from_millis(500)).await;
    }
}
