pub mod logger;
pub mod error;

pub use logger::init;
pub use error::{Error, Result};
