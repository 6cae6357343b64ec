//! Recording SPI bus, chip-select pin, and delay for host tests.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind, Operation, SpiBus, SpiDevice};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Select,
    Bytes(Vec<u8>),
    Deselect,
}

#[derive(Clone, Debug, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Split the log into chip-select windows, each as 16-bit words.
    ///
    /// Panics if bytes appear outside a window or a window is left open.
    pub fn bursts(&self) -> Vec<Vec<u16>> {
        let mut bursts = Vec::new();
        let mut open: Option<Vec<u8>> = None;
        for event in self.events() {
            match event {
                Event::Select => {
                    assert!(open.is_none(), "chip select asserted twice");
                    open = Some(Vec::new());
                }
                Event::Bytes(bytes) => open
                    .as_mut()
                    .expect("bytes sent with chip select released")
                    .extend(bytes),
                Event::Deselect => {
                    let bytes = open.take().expect("chip select released twice");
                    assert!(bytes.len() % 2 == 0, "burst is not whole words");
                    bursts.push(
                        bytes
                            .chunks_exact(2)
                            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                            .collect(),
                    );
                }
            }
        }
        assert!(open.is_none(), "chip select left asserted");
        bursts
    }
}

pub struct RecordingBus(Log);

impl spi::ErrorType for RecordingBus {
    type Error = Infallible;
}

impl SpiBus for RecordingBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.0.push(Event::Bytes(words.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.0.push(Event::Bytes(words.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct RecordingPin(Log);

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.push(Event::Select);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.push(Event::Deselect);
        Ok(())
    }
}

pub type RecordingDevice = ExclusiveDevice<RecordingBus, RecordingPin, NoDelay>;

/// An SPI device whose chip select and bytes land in the returned log.
pub fn recording_device() -> (RecordingDevice, Log) {
    let log = Log::default();
    let device = ExclusiveDevice::new_no_delay(RecordingBus(log.clone()), RecordingPin(log.clone()))
        .unwrap_or_else(|never| match never {});
    // Construction parks chip select high.
    log.clear();
    (device, log)
}

#[derive(Clone, Debug, Default)]
pub struct Pauses(Rc<RefCell<Vec<u32>>>);

impl Pauses {
    pub fn count(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn all(&self) -> Vec<u32> {
        self.0.borrow().clone()
    }
}

/// A delay that returns immediately and remembers every requested pause in nanoseconds.
pub struct RecordingDelay(Pauses);

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.0.borrow_mut().push(ns);
    }
}

pub fn recording_delay() -> (RecordingDelay, Pauses) {
    let pauses = Pauses::default();
    (RecordingDelay(pauses.clone()), pauses)
}

/// An SPI device that rejects every transaction.
pub struct FailingDevice;

impl spi::ErrorType for FailingDevice {
    type Error = ErrorKind;
}

impl SpiDevice for FailingDevice {
    fn transaction(&mut self, _operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }
}
