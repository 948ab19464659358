pub mod clock;
pub mod spi;

//MMIO
pub const MMIO: &[(usize, usize)] = &[
    (0x60000200, 0x100),    //spi
    (0x60000100, 0x100),    //hspi
];
