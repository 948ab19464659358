use core::marker::PhantomData;

use super::super::clock::{split_divider, CLKCNT};

#[doc = "Universal register structure"]
#[repr(C)]
pub struct Reg<T: Sized + Clone + Copy, U> {
    value: T,
    p: PhantomData<U>,
}

impl<T: Sized + Clone + Copy, U> Reg<T, U> {
    pub const fn new(initval: T) -> Self {
        Self {
            value: initval,
            p: PhantomData,
        }
    }
}

impl<T: Sized + Clone + Copy, U> Reg<T, U> {
    pub fn read(&self) -> T {
        let ptr: *const T = &self.value;
        unsafe { ptr.read_volatile() }
    }
    pub fn write(&mut self, val: T) {
        let ptr: *mut T = &mut self.value;
        unsafe {
            ptr.write_volatile(val);
        }
    }
}

impl<U> Reg<u32, U> {
    fn set_field(&mut self, shift: u32, width: u32, value: u32) {
        let mask = ((1u32 << width) - 1) << shift;
        let r = self.read();
        self.write((r & !mask) | ((value << shift) & mask));
    }

    fn set_bit(&mut self, bit: u32, on: bool) {
        self.set_field(bit, 1, on as u32);
    }
}

/// Bit lengths are programmed minus one; an unused phase stays 0.
fn len_field(bitlen: usize) -> u32 {
    bitlen.saturating_sub(1) as u32
}

pub struct _RESERVED;
pub type RESERVED = Reg<u32, _RESERVED>;

pub struct _CMD;
pub type CMD = Reg<u32, _CMD>;
impl CMD {
    const USR: u32 = 18;

    /// Kicks off the user-defined transaction programmed in USER/USER1/USER2
    pub fn start(&mut self) {
        self.set_bit(Self::USR, true);
    }
    /// Hardware clears USR once the transaction is done
    pub fn is_busy(&self) -> bool {
        self.read() & (1 << Self::USR) != 0
    }
}

pub struct _ADDR;
pub type ADDR = Reg<u32, _ADDR>;
impl ADDR {
    /// The address phase shifts out from bit 31 downwards.
    pub fn set_address(&mut self, bitlen: usize, addr: u32) {
        let v = match bitlen {
            0 => 0,
            n if n >= 32 => addr,
            n => addr << (32 - n),
        };
        self.write(v);
    }
}

pub struct _CTRL;
pub type CTRL = Reg<u32, _CTRL>;
impl CTRL {
    const WR_BIT_ORDER: u32 = 26;
    const RD_BIT_ORDER: u32 = 25;

    pub fn set_msb_first(&mut self, msb: bool) {
        self.set_bit(Self::WR_BIT_ORDER, !msb);
        self.set_bit(Self::RD_BIT_ORDER, !msb);
    }
}

pub struct _CLOCK;
pub type CLOCK = Reg<u32, _CLOCK>;
impl CLOCK {
    /// Programs `prescaler * CLKCNT` and returns the divider achieved.
    pub fn set_divider(&mut self, div: u32) -> u32 {
        let (pre, achieved) = split_divider(div);
        let n = CLKCNT - 1;
        // equ_sysclk off, high half-period = n / 2, low = n
        self.write(((pre - 1) & 0x1fff) << 18 | (n & 0x3f) << 12 | ((n / 2) & 0x3f) << 6 | (n & 0x3f));
        achieved
    }
    pub fn prescaler(&self) -> u32 {
        ((self.read() >> 18) & 0x1fff) + 1
    }
}

bitflags! {
    pub struct UserFlags: u32 {
        const COMMAND       = 1 << 31;
        const ADDR          = 1 << 30;
        const DUMMY         = 1 << 29;
        const MISO          = 1 << 28;
        const MOSI          = 1 << 27;
        const CK_OUT_EDGE   = 1 << 7;
        const CS_SETUP      = 1 << 5;
        const CS_HOLD       = 1 << 4;
        const DUPLEX        = 1 << 0;
    }
}

impl UserFlags {
    /// Flags that select transaction phases, rewritten for every transaction
    pub const PHASES: UserFlags = UserFlags::from_bits_truncate(
        UserFlags::COMMAND.bits()
            | UserFlags::ADDR.bits()
            | UserFlags::DUMMY.bits()
            | UserFlags::MISO.bits()
            | UserFlags::MOSI.bits(),
    );
}

pub struct _USER;
pub type USER = Reg<u32, _USER>;
impl USER {
    pub fn flags(&self) -> UserFlags {
        UserFlags::from_bits_truncate(self.read())
    }
    pub fn set_flags(&mut self, flags: UserFlags) {
        self.write(flags.bits());
    }
    pub fn set_phases(&mut self, phases: UserFlags) {
        let mut flags = self.flags();
        flags.remove(UserFlags::PHASES);
        flags.insert(phases & UserFlags::PHASES);
        self.set_flags(flags);
    }
}

pub struct _USER1;
pub type USER1 = Reg<u32, _USER1>;
impl USER1 {
    pub fn set_addr_bitlen(&mut self, bitlen: usize) {
        self.set_field(26, 6, len_field(bitlen));
    }
    pub fn set_mosi_bitlen(&mut self, bitlen: usize) {
        self.set_field(17, 9, len_field(bitlen));
    }
    pub fn set_miso_bitlen(&mut self, bitlen: usize) {
        self.set_field(8, 9, len_field(bitlen));
    }
    pub fn set_dummy_cyclelen(&mut self, bitlen: usize) {
        self.set_field(0, 8, len_field(bitlen));
    }
}

pub struct _USER2;
pub type USER2 = Reg<u32, _USER2>;
impl USER2 {
    /// The command goes out low byte first, MSB aligned within 16 bits.
    pub fn set_command(&mut self, bitlen: usize, cmd: u16) {
        let aligned = if bitlen == 0 { 0 } else { cmd << (16 - bitlen.min(16)) as u32 };
        let swapped = aligned.swap_bytes();
        self.write(len_field(bitlen) << 28 | swapped as u32);
    }
}

pub struct _PIN;
pub type PIN = Reg<u32, _PIN>;
impl PIN {
    /// CPOL: clock level while idle
    pub fn set_idle_edge(&mut self, high: bool) {
        self.set_bit(29, high);
    }
}

pub struct _SLAVE;
pub type SLAVE = Reg<u32, _SLAVE>;
impl SLAVE {
    pub fn set_slave_mode(&mut self, slave: bool) {
        self.set_bit(30, slave);
    }
}

pub struct _W;
pub type W = Reg<u32, _W>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn user1_lengths_are_stored_minus_one() {
        let mut user1 = USER1::new(0);
        user1.set_mosi_bitlen(512);
        user1.set_miso_bitlen(8);
        user1.set_dummy_cyclelen(256);
        user1.set_addr_bitlen(0);
        assert_eq!(user1.read(), 511 << 17 | 7 << 8 | 255);
    }

    #[test]
    fn command_is_aligned_and_byte_swapped() {
        let mut user2 = USER2::new(0);
        user2.set_command(8, 0x9f);
        assert_eq!(user2.read(), 7 << 28 | 0x009f);
        user2.set_command(16, 0x1234);
        assert_eq!(user2.read(), 15 << 28 | 0x3412);
    }

    #[test]
    fn address_is_msb_aligned() {
        let mut addr = ADDR::new(0);
        addr.set_address(24, 0x00ab_cdef);
        assert_eq!(addr.read(), 0xabcd_ef00);
        addr.set_address(32, 0x1234_5678);
        assert_eq!(addr.read(), 0x1234_5678);
    }

    #[test]
    fn phases_leave_mode_flags_alone() {
        let mut user = USER::new(0);
        user.set_flags(UserFlags::DUPLEX | UserFlags::CS_HOLD | UserFlags::MISO);
        user.set_phases(UserFlags::MOSI | UserFlags::COMMAND);
        assert_eq!(user.flags(), UserFlags::DUPLEX | UserFlags::CS_HOLD | UserFlags::MOSI | UserFlags::COMMAND);
    }

    #[test]
    fn clock_register_holds_the_prescaler() {
        let mut clock = CLOCK::new(0);
        assert_eq!(clock.set_divider(10), 10);
        assert_eq!(clock.prescaler(), 5);
        assert_eq!(clock.read() & (1 << 31), 0);
    }
}
