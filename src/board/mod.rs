pub mod esp8266;
pub mod loopback;

use crate::driver::spi::{PortConfig, Transaction};
use crate::utils::Result;

/// Word-level access to an SPI controller.
///
/// Port ids are checked before any of these are called.
pub trait SPIActions {
    /// Programs mode, clock and duplex; returns the divider actually achieved.
    fn setup(&mut self, id: usize, config: &PortConfig) -> u32;
    fn send(&mut self, id: usize, bitlen: u8, data: u32);
    fn send_recv(&mut self, id: usize, bitlen: u8, data: u32) -> u32;
    /// Stages `bitlen` bits of `data` in the MOSI buffer at bit `offset`.
    fn set_mosi(&mut self, id: usize, offset: u16, bitlen: u8, data: u32) -> Result<()>;
    fn get_miso(&mut self, id: usize, offset: u16, bitlen: u8) -> u32;
    /// Runs every phase of `tx` as a single hardware operation.
    fn transaction(&mut self, id: usize, tx: &Transaction) -> Result<()>;
}

#[cfg(feature = "board_esp8266")]
pub type BusImpl = esp8266::spi::SPIImpl;

#[cfg(not(feature = "board_esp8266"))]
pub type BusImpl = loopback::Loopback;
