use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Port id outside of `0..NUM_SPI`
    InvalidPort(usize),
    /// Enum-like argument with an unknown value
    InvalidArgument(&'static str),
    /// Offset or bit length outside its documented domain
    Range(&'static str),
    /// A bit buffer write would run past bit 512
    Overflow { offset: usize, bitlen: usize },
    /// Required trailing arguments are missing
    Arity(&'static str),
    TransactionFailed,
    HardwareFailure,
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPort(id) => write!(f, "spi {} does not exist", id),
            Error::InvalidArgument(name) => write!(f, "wrong arg type: {}", name),
            Error::Range(name) => write!(f, "{} out of range", name),
            Error::Overflow { offset, bitlen } => write!(
                f,
                "data range exceeded > 512 bits (offset {}, bitlen {})",
                offset, bitlen
            ),
            Error::Arity(name) => write!(f, "too few args: {}", name),
            Error::TransactionFailed => write!(f, "transaction failed"),
            Error::HardwareFailure => write!(f, "failed"),
        }
    }
}
