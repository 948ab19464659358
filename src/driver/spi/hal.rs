//! `embedded-hal` view of a configured port, so off-the-shelf device drivers
//! can sit on top of the bus.

use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::spi::FullDuplex;

use super::{Received, SpiBus, StreamItem};
use crate::board::SPIActions;
use crate::utils::Error;

pub struct SpiPort<'a, T: SPIActions> {
    spi: &'a SpiBus<T>,
    id: usize,
    pending: Option<u8>,
}

impl<'a, T: SPIActions> SpiPort<'a, T> {
    pub fn new(spi: &'a SpiBus<T>, id: usize) -> Result<Self, Error> {
        spi.port(id)?;
        Ok(Self { spi, id, pending: None })
    }
}

impl<'a, T: SPIActions> Transfer<u8> for SpiPort<'a, T> {
    type Error = Error;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Error> {
        if words.is_empty() {
            return Ok(words);
        }
        let result = self.spi.send_recv(self.id, &[StreamItem::Text(words)])?;
        if let Some(Received::Text(echo)) = result.received.first() {
            words.copy_from_slice(echo);
        }
        Ok(words)
    }
}

impl<'a, T: SPIActions> Write<u8> for SpiPort<'a, T> {
    type Error = Error;

    fn write(&mut self, words: &[u8]) -> Result<(), Error> {
        if !words.is_empty() {
            self.spi.send(self.id, &[StreamItem::Text(words)])?;
        }
        Ok(())
    }
}

impl<'a, T: SPIActions> FullDuplex<u8> for SpiPort<'a, T> {
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Error> {
        self.pending.take().ok_or(nb::Error::WouldBlock)
    }

    fn send(&mut self, word: u8) -> nb::Result<(), Error> {
        if self.pending.is_some() {
            return Err(nb::Error::WouldBlock);
        }
        let result = self.spi.send_recv(self.id, &[StreamItem::Scalar(word as u32)])?;
        if let Some(Received::Scalar(echo)) = result.received.first() {
            self.pending = Some(*echo as u8);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::loopback::Loopback;
    use crate::config::*;
    use crate::driver::spi::SetupArgs;

    fn bus() -> SpiBus<Loopback> {
        let spi = SpiBus::new(Loopback::new());
        let args = SetupArgs { mode: MASTER, cpol: CPOL_LOW, cpha: CPHA_LOW, databits: 8, clock_div: 8, full_duplex: None };
        spi.setup(1, &args).unwrap();
        spi
    }

    #[test]
    fn transfer_replaces_words_with_the_echo() {
        let spi = bus();
        spi.with_bus(|b| b.set_echo_xor(0xff));
        let mut port = SpiPort::new(&spi, 1).unwrap();
        let mut buf = [0x00, 0x0f, 0xf0];
        assert_eq!(port.transfer(&mut buf).unwrap(), &[0xff, 0xf0, 0x0f]);
        port.write(&[1, 2]).unwrap();
        spi.with_bus(|b| assert_eq!(b.sent(1), &[0x00, 0x0f, 0xf0, 1, 2]));
    }

    #[test]
    fn full_duplex_holds_one_word() {
        let spi = bus();
        let mut port = SpiPort::new(&spi, 1).unwrap();
        assert_eq!(port.read(), Err(nb::Error::WouldBlock));
        port.send(0x5a).unwrap();
        assert_eq!(port.send(0x11), Err(nb::Error::WouldBlock));
        assert_eq!(port.read(), Ok(0x5a));
    }

    #[test]
    fn unknown_port_is_refused() {
        let spi = bus();
        assert_eq!(SpiPort::new(&spi, NUM_SPI).err(), Some(Error::InvalidPort(NUM_SPI)));
    }
}
