//! SPI module as seen from the scripting layer.
//!
//! `SpiBus` owns the controller and the per-port settings and exposes the
//! seven script-facing operations. Every operation checks the port id first
//! and runs to completion before returning.

pub mod bits;
pub mod hal;
mod port;
mod stream;
mod transaction;

pub use port::{ClockPhase, ClockPolarity, Duplex, PortConfig, PortRegistry, Role, SetupArgs};
pub use stream::{Received, StreamItem, StreamResult};
pub use transaction::Transaction;

use alloc::vec::Vec;
use spin::Mutex;

use crate::board::SPIActions;
use crate::config::DEFAULT_RECV_WORD;
use crate::utils::Result;

pub struct SpiBus<T: SPIActions> {
    bus: Mutex<T>,
    ports: PortRegistry,
}

impl<T: SPIActions> SpiBus<T> {
    pub fn new(bus: T) -> Self {
        Self {
            bus: Mutex::new(bus),
            ports: PortRegistry::new(),
        }
    }

    /// Current settings of port `id`, `None` until it has been set up.
    pub fn port(&self, id: usize) -> Result<Option<PortConfig>> {
        self.ports.get(id)
    }

    /// Runs `f` with exclusive access to the controller.
    pub fn with_bus<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.bus.lock())
    }

    /// `spi.setup(id, mode, cpol, cpha, databits, clock_div, [full_duplex])`
    pub fn setup(&self, id: usize, args: &SetupArgs) -> Result<u32> {
        self.ports.configure(&mut *self.bus.lock(), id, args)
    }

    /// `wrote = spi.send(id, data1, [data2], ..., [datan])`
    pub fn send(&self, id: usize, items: &[StreamItem]) -> Result<usize> {
        let databits = self.ports.databits(id)?;
        let result = stream::stream(&mut *self.bus.lock(), id, databits, items, false)?;
        Ok(result.written)
    }

    /// `wrote, [data1], ..., [datan] = spi.send_recv(id, data1, [data2], ..., [datan])`
    pub fn send_recv(&self, id: usize, items: &[StreamItem]) -> Result<StreamResult> {
        let databits = self.ports.databits(id)?;
        stream::stream(&mut *self.bus.lock(), id, databits, items, true)
    }

    /// `read = spi.recv(id, size, [default data])`
    pub fn recv(&self, id: usize, size: usize, default: Option<u32>) -> Result<Option<Vec<u8>>> {
        let databits = self.ports.databits(id)?;
        let default = default.unwrap_or(DEFAULT_RECV_WORD);
        stream::recv(&mut *self.bus.lock(), id, databits, size, default)
    }

    /// `spi.set_mosi(id, offset, bitlen, data1, [data2], ..., [datan])`
    pub fn set_mosi(&self, id: usize, offset: usize, bitlen: usize, values: &[u32]) -> Result<()> {
        self.ports.check_id(id)?;
        bits::set_bits(&mut *self.bus.lock(), id, offset, bitlen, values)
    }

    /// `data = spi.get_miso(id, offset, bitlen, num)`
    pub fn get_miso(&self, id: usize, offset: usize, bitlen: usize, count: usize) -> Result<Vec<u32>> {
        self.ports.check_id(id)?;
        bits::get_bits(&mut *self.bus.lock(), id, offset, bitlen, count)
    }

    /// `spi.transaction(id, cmd_bitlen, cmd_data, addr_bitlen, addr_data, mosi_bitlen, dummy_bitlen, miso_bitlen)`
    pub fn transaction(&self, id: usize, tx: &Transaction) -> Result<()> {
        self.ports.check_id(id)?;
        transaction::run_transaction(&mut *self.bus.lock(), id, tx)
    }
}

impl<T: SPIActions + Default> Default for SpiBus<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::loopback::Loopback;
    use crate::config::*;
    use crate::utils::Error;

    fn configured(databits: i32) -> SpiBus<Loopback> {
        let spi = SpiBus::new(Loopback::new());
        let args = SetupArgs {
            mode: MASTER,
            cpol: CPOL_LOW,
            cpha: CPHA_LOW,
            databits,
            clock_div: 16,
            full_duplex: None,
        };
        spi.setup(0, &args).unwrap();
        spi
    }

    #[test]
    fn every_operation_checks_the_port_first() {
        let spi = configured(8);
        let bad = NUM_SPI;
        assert_eq!(spi.send(bad, &[1u32.into()]), Err(Error::InvalidPort(bad)));
        assert_eq!(spi.send_recv(bad, &[1u32.into()]), Err(Error::InvalidPort(bad)));
        assert_eq!(spi.recv(bad, 0, None), Err(Error::InvalidPort(bad)));
        assert_eq!(spi.set_mosi(bad, 999, 0, &[]), Err(Error::InvalidPort(bad)));
        assert_eq!(spi.get_miso(bad, 0, 8, 1), Err(Error::InvalidPort(bad)));
        let tx = Transaction { mosi_bitlen: 999, ..Transaction::default() };
        assert_eq!(spi.transaction(bad, &tx), Err(Error::InvalidPort(bad)));
        assert_eq!(spi.port(bad), Err(Error::InvalidPort(bad)));
    }

    #[test]
    fn streaming_uses_the_configured_width() {
        let spi = configured(4);
        let r = spi.send_recv(0, &[0xffu32.into()]).unwrap();
        assert_eq!(r.received, [Received::Scalar(0xf)]);
        spi.with_bus(|bus| assert_eq!(bus.sent(0), &[0xff]));
    }

    #[test]
    fn unconfigured_port_cannot_stream() {
        let spi = SpiBus::new(Loopback::new());
        assert_eq!(spi.send(1, &["x".into()]), Err(Error::InvalidArgument("databits")));
        assert_eq!(spi.recv(1, 0, None), Ok(None));
    }

    #[test]
    fn recv_defaults_to_all_ones() {
        let spi = configured(8);
        assert_eq!(spi.recv(0, 2, None), Ok(Some([0xff, 0xff].to_vec())));
        assert_eq!(spi.recv(0, 1, Some(0x3c)), Ok(Some([0x3c].to_vec())));
    }
}
