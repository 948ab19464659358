use super::register::*;
use core::ops::{Deref, DerefMut};
use log::*;

use crate::board::esp8266::clock::spi_clock_hz;
use crate::board::esp8266::MMIO;
use crate::board::SPIActions;
use crate::config::{BUFFER_BITS, BUFFER_WORDS, NUM_SPI};
use crate::driver::spi::bits::{extract, splice};
use crate::driver::spi::{ClockPhase, ClockPolarity, Duplex, PortConfig, Role, Transaction};
use crate::utils::{Error, Result};

/** SPI registers encapsulation */

#[derive(Copy, Clone)]
pub enum SPIDevice {
    SPI,
    HSPI,
    Other(usize),
}

impl Deref for SPIDevice {
    type Target = RegisterBlock;
    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.base_addr() as *mut RegisterBlock) }
    }
}

impl DerefMut for SPIDevice {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *(self.base_addr() as *mut RegisterBlock) }
    }
}

impl SPIDevice {
    fn base_addr(&self) -> usize {
        match self {
            SPIDevice::SPI => MMIO[0].0,
            SPIDevice::HSPI => MMIO[1].0,
            SPIDevice::Other(val) => *val,
        }
    }
}

#[doc = "ESP8266 SPI/HSPI register layout"]
#[repr(C)]
pub struct RegisterBlock {
    #[doc = "0x00: Command register, USR starts a transaction"]
    pub cmd: CMD,
    #[doc = "0x04: Address phase value"]
    pub addr: ADDR,
    #[doc = "0x08: Control register (bit order)"]
    pub ctrl: CTRL,
    #[doc = "0x0C: Reserved"]
    _reserved0: RESERVED,
    #[doc = "0x10: Reserved"]
    _reserved1: RESERVED,
    #[doc = "0x14: Reserved"]
    _reserved2: RESERVED,
    #[doc = "0x18: Clock divider register"]
    pub clock: CLOCK,
    #[doc = "0x1C: User transaction flags"]
    pub user: USER,
    #[doc = "0x20: Address, MOSI, MISO and dummy bit lengths"]
    pub user1: USER1,
    #[doc = "0x24: Command bit length and value"]
    pub user2: USER2,
    #[doc = "0x28: Reserved"]
    _reserved3: RESERVED,
    #[doc = "0x2C: Pin register (clock idle level)"]
    pub pin: PIN,
    #[doc = "0x30: Slave register"]
    pub slave: SLAVE,
    #[doc = "0x34: Reserved"]
    _reserved4: RESERVED,
    #[doc = "0x38: Reserved"]
    _reserved5: RESERVED,
    #[doc = "0x3C: Reserved"]
    _reserved6: RESERVED,
    #[doc = "0x40-0x7C: W0..W15, the 512-bit data buffer shared by MOSI and MISO"]
    pub w: [W; BUFFER_WORDS],
}

impl RegisterBlock {
    /// All-zero block, for driving the controller logic against plain memory.
    pub const fn zeroed() -> Self {
        const ZERO: W = W::new(0);
        Self {
            cmd: CMD::new(0),
            addr: ADDR::new(0),
            ctrl: CTRL::new(0),
            _reserved0: RESERVED::new(0),
            _reserved1: RESERVED::new(0),
            _reserved2: RESERVED::new(0),
            clock: CLOCK::new(0),
            user: USER::new(0),
            user1: USER1::new(0),
            user2: USER2::new(0),
            _reserved3: RESERVED::new(0),
            pin: PIN::new(0),
            slave: SLAVE::new(0),
            _reserved4: RESERVED::new(0),
            _reserved5: RESERVED::new(0),
            _reserved6: RESERVED::new(0),
            w: [ZERO; BUFFER_WORDS],
        }
    }

    fn load_buffer(&self) -> [u32; BUFFER_WORDS] {
        let mut words = [0u32; BUFFER_WORDS];
        for (word, reg) in words.iter_mut().zip(self.w.iter()) {
            *word = reg.read();
        }
        words
    }
}

pub struct SPIImpl {
    devices: [SPIDevice; NUM_SPI],
}

/** SPI abstraction implementation */

impl SPIImpl {
    pub fn new() -> Self {
        Self::with_devices([SPIDevice::SPI, SPIDevice::HSPI])
    }

    pub fn with_devices(devices: [SPIDevice; NUM_SPI]) -> Self {
        Self { devices }
    }
}

impl Default for SPIImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl SPIImpl {
    fn wait_idle(&self, id: usize) {
        while self.devices[id].cmd.is_busy() {
            // loop
        }
    }

    /// Loads phase flags and lengths for `tx` without starting it.
    fn program(&mut self, id: usize, tx: &Transaction) {
        let spi = &mut *self.devices[id];
        let mut phases = UserFlags::empty();
        phases.set(UserFlags::COMMAND, tx.cmd_bitlen > 0);
        phases.set(UserFlags::ADDR, tx.addr_bitlen > 0);
        phases.set(UserFlags::MOSI, tx.mosi_bitlen > 0);
        phases.set(UserFlags::DUMMY, tx.dummy_bitlen > 0);
        phases.set(UserFlags::MISO, tx.miso_bitlen > 0);
        spi.user.set_phases(phases);

        spi.user2.set_command(tx.cmd_bitlen, tx.cmd_data);
        spi.addr.set_address(tx.addr_bitlen, tx.addr_data);
        spi.user1.set_addr_bitlen(tx.addr_bitlen);
        spi.user1.set_mosi_bitlen(tx.mosi_bitlen);
        spi.user1.set_miso_bitlen(tx.miso_bitlen);
        spi.user1.set_dummy_cyclelen(tx.dummy_bitlen);
    }

    fn run(&mut self, id: usize, tx: &Transaction) {
        self.wait_idle(id);
        self.program(id, tx);
        self.devices[id].cmd.start();
        self.wait_idle(id);
    }

    fn write_field(&mut self, id: usize, offset: usize, bitlen: usize, data: u32) {
        if bitlen == 0 {
            return;
        }
        let spi = &mut *self.devices[id];
        let mut words = spi.load_buffer();
        splice(&mut words, offset, bitlen, data);
        for i in offset / 32..=(offset + bitlen - 1) / 32 {
            spi.w[i].write(words[i]);
        }
    }

    fn word_transaction(bitlen: u8, receive: bool) -> Transaction {
        Transaction {
            mosi_bitlen: bitlen as usize,
            miso_bitlen: if receive { bitlen as usize } else { 0 },
            ..Transaction::default()
        }
    }
}

impl SPIActions for SPIImpl {
    fn setup(&mut self, id: usize, config: &PortConfig) -> u32 {
        self.wait_idle(id);
        let spi = &mut *self.devices[id];

        spi.slave.set_slave_mode(config.mode == Role::Slave);
        spi.pin.set_idle_edge(config.clock_polarity == ClockPolarity::High);

        let mut flags = UserFlags::CS_SETUP | UserFlags::CS_HOLD;
        // sample on the trailing edge when CPHA is set, inverted again by CPOL
        let out_edge = (config.clock_phase == ClockPhase::High) != (config.clock_polarity == ClockPolarity::High);
        flags.set(UserFlags::CK_OUT_EDGE, out_edge);
        flags.set(UserFlags::DUPLEX, config.duplex == Duplex::Full);
        spi.user.set_flags(flags);

        spi.ctrl.set_msb_first(true);
        let achieved = spi.clock.set_divider(config.clock_div);
        info!("spi{}: clock_div {} -> {} ({} Hz)", id, config.clock_div, achieved, spi_clock_hz(achieved));
        achieved
    }

    fn send(&mut self, id: usize, bitlen: u8, data: u32) {
        self.wait_idle(id);
        self.write_field(id, 0, bitlen as usize, data);
        self.run(id, &Self::word_transaction(bitlen, false));
    }

    fn send_recv(&mut self, id: usize, bitlen: u8, data: u32) -> u32 {
        self.wait_idle(id);
        self.write_field(id, 0, bitlen as usize, data);
        self.run(id, &Self::word_transaction(bitlen, true));
        extract(&self.devices[id].load_buffer(), 0, bitlen as usize)
    }

    fn set_mosi(&mut self, id: usize, offset: u16, bitlen: u8, data: u32) -> Result<()> {
        let (offset, bitlen) = (offset as usize, bitlen as usize);
        if id >= NUM_SPI || bitlen == 0 || offset + bitlen > BUFFER_BITS {
            return Err(Error::HardwareFailure);
        }
        self.wait_idle(id);
        self.write_field(id, offset, bitlen, data);
        Ok(())
    }

    fn get_miso(&mut self, id: usize, offset: u16, bitlen: u8) -> u32 {
        self.wait_idle(id);
        extract(&self.devices[id].load_buffer(), offset as usize, bitlen as usize)
    }

    fn transaction(&mut self, id: usize, tx: &Transaction) -> Result<()> {
        if id >= NUM_SPI {
            return Err(Error::HardwareFailure);
        }
        self.run(id, tx);
        Ok(())
    }
}
