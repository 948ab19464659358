/* PORTS */
pub const NUM_SPI: usize = 2;

/* BIT BUFFER */
pub const BUFFER_BITS: usize = 512;
pub const BUFFER_WORDS: usize = BUFFER_BITS / 32;
pub const MAX_FIELD_BITS: usize = 32;

/* TRANSACTION SEGMENT CEILINGS */
pub const MAX_CMD_BITLEN: usize = 16;
pub const MAX_ADDR_BITLEN: usize = 32;
pub const MAX_MOSI_BITLEN: usize = 512;
pub const MAX_DUMMY_BITLEN: usize = 256;
pub const MAX_MISO_BITLEN: usize = 511;

/* CLOCK */
pub const MIN_CLOCK_DIV: u32 = 4;
pub const DEFAULT_CLOCK_DIV: u32 = 8;

/* STREAMING */
pub const MAX_DATABITS: i32 = 32;
pub const DATABITS_8: u8 = 8;
pub const DEFAULT_RECV_WORD: u32 = 0xffff_ffff;

/* SCRIPTING CONSTANTS */
pub const MASTER: u32 = 1;
pub const SLAVE: u32 = 0;
pub const CPOL_LOW: u32 = 0;
pub const CPOL_HIGH: u32 = 1;
pub const CPHA_LOW: u32 = 0;
pub const CPHA_HIGH: u32 = 1;
pub const HALFDUPLEX: u32 = 0;
pub const FULLDUPLEX: u32 = 1;
