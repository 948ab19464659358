//! Software controller with MISO tied to MOSI.
//!
//! Each port keeps its own 512-bit buffer shared by both directions, the
//! same way the hardware `W` bank is shared. Every streamed word comes back
//! masked to the word width. Only the most recent `SENT_HISTORY` words sent
//! are kept per port.

use alloc::vec::Vec;
use log::*;

use super::SPIActions;
use crate::config::{BUFFER_BITS, BUFFER_WORDS, NUM_SPI};
use crate::driver::spi::bits::{extract, splice};
use crate::driver::spi::{PortConfig, Transaction};
use crate::utils::{Error, Result};

pub const SENT_HISTORY: usize = 64;

#[derive(Default)]
struct Port {
    buffer: [u32; BUFFER_WORDS],
    sent: Vec<u32>,
}

#[derive(Default)]
pub struct Loopback {
    ports: [Port; NUM_SPI],
    setups: usize,
    sends: usize,
    exchanges: usize,
    mosi_writes: usize,
    miso_reads: usize,
    transactions: usize,
    last_transaction: Option<(usize, Transaction)>,
    fail_mosi_after: Option<usize>,
    fail_transactions: bool,
    echo_xor: u32,
}

fn word_mask(bitlen: u8) -> u32 {
    match bitlen {
        0 => 0,
        n if n >= 32 => u32::MAX,
        n => (1u32 << n) - 1,
    }
}

impl Port {
    fn record(&mut self, data: u32) {
        if self.sent.len() == SENT_HISTORY {
            self.sent.remove(0);
        }
        self.sent.push(data);
    }
}

impl Loopback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `n` more MOSI writes succeed, then reports failure for the rest.
    pub fn fail_mosi_after(&mut self, n: usize) {
        self.fail_mosi_after = Some(self.mosi_writes + n);
    }

    pub fn fail_transactions(&mut self, fail: bool) {
        self.fail_transactions = fail;
    }

    /// Flips bits of every echoed word, to tell echoes apart from what was sent.
    pub fn set_echo_xor(&mut self, xor: u32) {
        self.echo_xor = xor;
    }

    /// Last words sent on port `id`, oldest first.
    pub fn sent(&self, id: usize) -> &[u32] {
        &self.ports[id].sent
    }

    pub fn setup_calls(&self) -> usize {
        self.setups
    }

    pub fn sends(&self) -> usize {
        self.sends
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges
    }

    pub fn mosi_writes(&self) -> usize {
        self.mosi_writes
    }

    pub fn miso_reads(&self) -> usize {
        self.miso_reads
    }

    pub fn transactions(&self) -> usize {
        self.transactions
    }

    pub fn last_transaction(&self) -> Option<(usize, Transaction)> {
        self.last_transaction
    }
}

impl SPIActions for Loopback {
    fn setup(&mut self, id: usize, config: &PortConfig) -> u32 {
        trace!("loopback{}: setup {:?}", id, config);
        self.setups += 1;
        config.clock_div
    }

    fn send(&mut self, id: usize, _bitlen: u8, data: u32) {
        self.sends += 1;
        self.ports[id].record(data);
    }

    fn send_recv(&mut self, id: usize, bitlen: u8, data: u32) -> u32 {
        self.exchanges += 1;
        self.ports[id].record(data);
        (data & word_mask(bitlen)) ^ self.echo_xor
    }

    fn set_mosi(&mut self, id: usize, offset: u16, bitlen: u8, data: u32) -> Result<()> {
        let (offset, bitlen) = (offset as usize, bitlen as usize);
        if offset + bitlen > BUFFER_BITS {
            return Err(Error::HardwareFailure);
        }
        if let Some(limit) = self.fail_mosi_after {
            if self.mosi_writes >= limit {
                return Err(Error::HardwareFailure);
            }
        }
        self.mosi_writes += 1;
        splice(&mut self.ports[id].buffer, offset, bitlen, data);
        Ok(())
    }

    fn get_miso(&mut self, id: usize, offset: u16, bitlen: u8) -> u32 {
        self.miso_reads += 1;
        extract(&self.ports[id].buffer, offset as usize, bitlen as usize)
    }

    fn transaction(&mut self, id: usize, tx: &Transaction) -> Result<()> {
        self.transactions += 1;
        self.last_transaction = Some((id, *tx));
        if self.fail_transactions {
            Err(Error::HardwareFailure)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sent_history_is_bounded() {
        let mut bus = Loopback::new();
        for i in 0..1000u32 {
            bus.send(0, 8, i);
        }
        bus.send_recv(0, 8, 1000);
        assert_eq!(bus.sent(0).len(), SENT_HISTORY);
        assert_eq!(bus.sent(0).first(), Some(&(1001 - SENT_HISTORY as u32)));
        assert_eq!(bus.sent(0).last(), Some(&1000));
        assert_eq!(bus.sends(), 1000);
        assert_eq!(bus.exchanges(), 1);
        assert!(bus.sent(1).is_empty());
    }
}
