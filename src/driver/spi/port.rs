use embedded_hal::spi::{Mode as HalMode, Phase, Polarity};
use log::*;
use spin::Mutex;

use crate::board::SPIActions;
use crate::config::*;
use crate::utils::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Master,
    Slave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPolarity {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Half,
    Full,
}

impl TryFrom<u32> for Role {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            MASTER => Ok(Role::Master),
            SLAVE => Ok(Role::Slave),
            _ => Err(Error::InvalidArgument("mode")),
        }
    }
}

impl TryFrom<u32> for ClockPolarity {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            CPOL_LOW => Ok(ClockPolarity::Low),
            CPOL_HIGH => Ok(ClockPolarity::High),
            _ => Err(Error::InvalidArgument("cpol")),
        }
    }
}

impl TryFrom<u32> for ClockPhase {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            CPHA_LOW => Ok(ClockPhase::Low),
            CPHA_HIGH => Ok(ClockPhase::High),
            _ => Err(Error::InvalidArgument("cpha")),
        }
    }
}

impl TryFrom<u32> for Duplex {
    type Error = Error;
    fn try_from(v: u32) -> Result<Self> {
        match v {
            HALFDUPLEX => Ok(Duplex::Half),
            FULLDUPLEX => Ok(Duplex::Full),
            _ => Err(Error::InvalidArgument("full_duplex")),
        }
    }
}

/// Per-port settings, written by `configure` and read by every other operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfig {
    pub mode: Role,
    pub clock_polarity: ClockPolarity,
    pub clock_phase: ClockPhase,
    /// Unit width used when streaming; 0 is accepted here and rejected on first use
    pub databits: u8,
    pub clock_div: u32,
    pub duplex: Duplex,
}

impl PortConfig {
    pub fn hal_mode(&self) -> HalMode {
        HalMode {
            polarity: match self.clock_polarity {
                ClockPolarity::Low => Polarity::IdleLow,
                ClockPolarity::High => Polarity::IdleHigh,
            },
            phase: match self.clock_phase {
                ClockPhase::Low => Phase::CaptureOnFirstTransition,
                ClockPhase::High => Phase::CaptureOnSecondTransition,
            },
        }
    }
}

/// Raw arguments of a setup call, as handed over by the scripting layer.
#[derive(Debug, Clone, Copy)]
pub struct SetupArgs {
    pub mode: u32,
    pub cpol: u32,
    pub cpha: u32,
    pub databits: i32,
    pub clock_div: u32,
    pub full_duplex: Option<u32>,
}

impl SetupArgs {
    /// Validates every field; the clock divider falls back to the default below the minimum.
    pub fn validate(&self) -> Result<PortConfig> {
        let mode = Role::try_from(self.mode)?;
        let clock_polarity = ClockPolarity::try_from(self.cpol)?;
        let clock_phase = ClockPhase::try_from(self.cpha)?;
        if self.databits < 0 || self.databits > MAX_DATABITS {
            return Err(Error::InvalidArgument("databits"));
        }
        let clock_div = if self.clock_div < MIN_CLOCK_DIV {
            warn!(
                "clock_div {} below {}, defaulting to {}",
                self.clock_div, MIN_CLOCK_DIV, DEFAULT_CLOCK_DIV
            );
            DEFAULT_CLOCK_DIV
        } else {
            self.clock_div
        };
        let duplex = Duplex::try_from(self.full_duplex.unwrap_or(FULLDUPLEX))?;
        Ok(PortConfig {
            mode,
            clock_polarity,
            clock_phase,
            databits: self.databits as u8,
            clock_div,
            duplex,
        })
    }
}

pub struct PortRegistry {
    ports: Mutex<[Option<PortConfig>; NUM_SPI]>,
}

impl PortRegistry {
    pub const fn new() -> Self {
        Self {
            ports: Mutex::new([None; NUM_SPI]),
        }
    }

    pub fn check_id(&self, id: usize) -> Result<()> {
        if id < NUM_SPI {
            Ok(())
        } else {
            Err(Error::InvalidPort(id))
        }
    }

    pub fn get(&self, id: usize) -> Result<Option<PortConfig>> {
        self.check_id(id)?;
        Ok(self.ports.lock()[id])
    }

    /// Word width for streaming; an unconfigured port has width 0.
    pub fn databits(&self, id: usize) -> Result<u8> {
        Ok(self.get(id)?.map_or(0, |c| c.databits))
    }

    /// Validates, records the port settings and programs the controller.
    ///
    /// Returns the divider the controller actually achieved.
    pub fn configure<T: SPIActions>(&self, bus: &mut T, id: usize, args: &SetupArgs) -> Result<u32> {
        self.check_id(id)?;
        let config = args.validate()?;
        self.ports.lock()[id] = Some(config);
        let effective = bus.setup(id, &config);
        debug!(
            "spi{} setup: {:?} databits={} clock_div={} -> {}",
            id, config.mode, config.databits, config.clock_div, effective
        );
        Ok(effective)
    }
}
