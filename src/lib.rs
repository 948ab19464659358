#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[macro_use]
extern crate bitflags;

pub mod board;
pub mod config;
pub mod driver;
pub mod utils;

pub use driver::spi::{Received, SetupArgs, SpiBus, StreamItem, StreamResult, Transaction};
pub use utils::{Error, Result};

/// Bus over the controller selected by the board feature.
pub type DefaultBus = SpiBus<board::BusImpl>;
