use log::*;

use crate::board::SPIActions;
use crate::config::*;
use crate::utils::{Error, Result};

/// One structured exchange: command, address, MOSI data, dummy cycles, MISO data.
///
/// MOSI data is staged in the bit buffer beforehand with `set_mosi`; MISO
/// data lands in the same buffer and is read back with `get_miso`. Each
/// segment is bounded on its own, the sum is left to the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transaction {
    pub cmd_bitlen: usize,
    pub cmd_data: u16,
    pub addr_bitlen: usize,
    pub addr_data: u32,
    pub mosi_bitlen: usize,
    pub dummy_bitlen: usize,
    pub miso_bitlen: usize,
}

impl Transaction {
    pub fn validate(&self) -> Result<()> {
        let segments = [
            (self.cmd_bitlen, MAX_CMD_BITLEN, "cmd_bitlen"),
            (self.addr_bitlen, MAX_ADDR_BITLEN, "addr_bitlen"),
            (self.mosi_bitlen, MAX_MOSI_BITLEN, "mosi_bitlen"),
            (self.dummy_bitlen, MAX_DUMMY_BITLEN, "dummy_bitlen"),
            (self.miso_bitlen, MAX_MISO_BITLEN, "miso_bitlen"),
        ];
        for &(bitlen, max, name) in segments.iter() {
            if bitlen > max {
                return Err(Error::Range(name));
            }
        }
        Ok(())
    }
}

/// Validates every segment and hands the whole exchange to the controller at once.
pub fn run_transaction<T: SPIActions>(bus: &mut T, id: usize, tx: &Transaction) -> Result<()> {
    tx.validate()?;
    debug!(
        "spi{} transaction: cmd {}b addr {}b mosi {}b dummy {}b miso {}b",
        id, tx.cmd_bitlen, tx.addr_bitlen, tx.mosi_bitlen, tx.dummy_bitlen, tx.miso_bitlen
    );
    bus.transaction(id, tx).map_err(|_| {
        error!("spi{}: transaction failed", id);
        Error::TransactionFailed
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::loopback::Loopback;

    fn maxed() -> Transaction {
        Transaction {
            cmd_bitlen: MAX_CMD_BITLEN,
            cmd_data: 0x9f,
            addr_bitlen: MAX_ADDR_BITLEN,
            addr_data: 0x00ab_cdef,
            mosi_bitlen: MAX_MOSI_BITLEN,
            dummy_bitlen: MAX_DUMMY_BITLEN,
            miso_bitlen: MAX_MISO_BITLEN,
        }
    }

    #[test]
    fn each_segment_is_bounded_on_its_own() {
        let mut bus = Loopback::new();
        let cases = [
            (Transaction { cmd_bitlen: 17, ..maxed() }, "cmd_bitlen"),
            (Transaction { addr_bitlen: 33, ..maxed() }, "addr_bitlen"),
            (Transaction { mosi_bitlen: 513, ..maxed() }, "mosi_bitlen"),
            (Transaction { dummy_bitlen: 257, ..maxed() }, "dummy_bitlen"),
            (Transaction { miso_bitlen: 512, ..maxed() }, "miso_bitlen"),
        ];
        for (tx, name) in cases.iter() {
            assert_eq!(run_transaction(&mut bus, 0, tx), Err(Error::Range(*name)));
        }
        assert_eq!(bus.transactions(), 0);
    }

    #[test]
    fn maximal_segments_run_as_one_call() {
        let mut bus = Loopback::new();
        run_transaction(&mut bus, 1, &maxed()).unwrap();
        assert_eq!(bus.transactions(), 1);
        assert_eq!(bus.last_transaction(), Some((1, maxed())));
    }

    #[test]
    fn empty_transaction_is_legal() {
        let mut bus = Loopback::new();
        run_transaction(&mut bus, 0, &Transaction::default()).unwrap();
        assert_eq!(bus.transactions(), 1);
    }

    #[test]
    fn controller_failure_is_not_retried() {
        let mut bus = Loopback::new();
        bus.fail_transactions(true);
        assert_eq!(run_transaction(&mut bus, 0, &maxed()), Err(Error::TransactionFailed));
        assert_eq!(bus.transactions(), 1);
    }
}
