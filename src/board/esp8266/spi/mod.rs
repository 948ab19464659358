mod layout;
pub mod register;

pub use layout::{RegisterBlock, SPIDevice, SPIImpl};
