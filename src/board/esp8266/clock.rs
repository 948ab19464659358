pub const APB_CLK: usize = 80_000_000;

/// Widest prescaler the `SPI_CLOCK` register holds (13 bits, stored minus one).
pub const CLKDIV_PRE_MAX: u32 = 1 << 13;

/// Clock counter length; the SPI clock is `APB_CLK / (prescaler * CLKCNT)`.
pub const CLKCNT: u32 = 2;

/// Splits a requested divider into `(prescaler, achieved divider)`.
///
/// The counter is fixed at 2, so odd dividers round down and the
/// prescaler saturates at `CLKDIV_PRE_MAX`.
///
/// 8: (4, 8) 10 MHz
///
/// 9: (4, 8) 10 MHz
///
/// 40: (20, 40) 2 MHz
pub const fn split_divider(div: u32) -> (u32, u32) {
    let mut pre = div / CLKCNT;
    if pre == 0 {
        pre = 1;
    }
    if pre > CLKDIV_PRE_MAX {
        pre = CLKDIV_PRE_MAX;
    }
    (pre, pre * CLKCNT)
}

pub const fn spi_clock_hz(div: u32) -> usize {
    let (_, achieved) = split_divider(div);
    APB_CLK / achieved as usize
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dividers_round_to_what_the_counter_can_do() {
        assert_eq!(split_divider(8), (4, 8));
        assert_eq!(split_divider(9), (4, 8));
        assert_eq!(split_divider(10), (5, 10));
        assert_eq!(split_divider(u32::MAX), (CLKDIV_PRE_MAX, CLKDIV_PRE_MAX * 2));
        assert_eq!(spi_clock_hz(40), 2_000_000);
    }
}
