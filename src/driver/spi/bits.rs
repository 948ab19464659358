//! Addressing of the 512-bit MOSI/MISO staging buffer.
//!
//! Bit offset 0 is the most significant bit of byte 0. Bytes sit
//! little-endian inside each 32-bit buffer word, the way the controller's
//! `W0..W15` registers hold them. A field may straddle byte and word
//! boundaries.

use alloc::vec::Vec;
use log::*;

use crate::board::SPIActions;
use crate::config::{BUFFER_BITS, MAX_FIELD_BITS};
use crate::utils::{Error, Result};

pub fn check_offset(offset: usize) -> Result<()> {
    if offset < BUFFER_BITS {
        Ok(())
    } else {
        Err(Error::Range("offset"))
    }
}

pub fn check_bitlen(bitlen: usize) -> Result<()> {
    if (1..=MAX_FIELD_BITS).contains(&bitlen) {
        Ok(())
    } else {
        Err(Error::Range("bitlen"))
    }
}

/// Writes `values` back to back starting at `offset`.
///
/// Bounds are checked per value: values before an overflowing one stay
/// written, values after it are never attempted.
pub fn set_bits<T: SPIActions>(
    bus: &mut T,
    id: usize,
    offset: usize,
    bitlen: usize,
    values: &[u32],
) -> Result<()> {
    check_offset(offset)?;
    check_bitlen(bitlen)?;
    if values.is_empty() {
        return Err(Error::Arity("data"));
    }

    let mut offset = offset;
    for &data in values {
        if offset + bitlen > BUFFER_BITS {
            return Err(Error::Overflow { offset, bitlen });
        }
        bus.set_mosi(id, offset as u16, bitlen as u8, data)
            .map_err(|e| {
                error!("spi{}: set_mosi at {} failed", id, offset);
                e
            })?;
        offset += bitlen;
    }
    Ok(())
}

/// Reads `count` consecutive `bitlen`-wide fields starting at `offset`.
pub fn get_bits<T: SPIActions>(
    bus: &mut T,
    id: usize,
    offset: usize,
    bitlen: usize,
    count: usize,
) -> Result<Vec<u32>> {
    check_offset(offset)?;
    check_bitlen(bitlen)?;
    match bitlen.checked_mul(count).and_then(|n| n.checked_add(offset)) {
        Some(end) if end <= BUFFER_BITS => {}
        _ => return Err(Error::Range("offset")),
    }

    Ok((0..count)
        .map(|i| bus.get_miso(id, (offset + bitlen * i) as u16, bitlen as u8))
        .collect())
}

fn byte_at(words: &[u32], index: usize) -> u8 {
    (words[index / 4] >> ((index % 4) * 8)) as u8
}

fn set_byte_at(words: &mut [u32], index: usize, byte: u8) {
    let shift = (index % 4) * 8;
    let word = &mut words[index / 4];
    *word = (*word & !(0xffu32 << shift)) | ((byte as u32) << shift);
}

/// Stores the low `bitlen` bits of `value` at `offset`, MSB first.
pub fn splice(words: &mut [u32], offset: usize, bitlen: usize, value: u32) {
    debug_assert!(offset + bitlen <= words.len() * 32);
    let mut pos = offset;
    let mut remaining = bitlen;
    while remaining > 0 {
        let bit = pos % 8;
        let take = (8 - bit).min(remaining);
        let shift = 8 - bit - take;
        let chunk = ((value as u64 >> (remaining - take)) & ((1 << take) - 1)) as u8;
        let mask = (((1u16 << take) - 1) as u8) << shift;
        let current = byte_at(words, pos / 8);
        set_byte_at(words, pos / 8, (current & !mask) | (chunk << shift));
        pos += take;
        remaining -= take;
    }
}

/// Reads `bitlen` bits at `offset`, MSB first, into the low bits of the result.
pub fn extract(words: &[u32], offset: usize, bitlen: usize) -> u32 {
    debug_assert!(offset + bitlen <= words.len() * 32);
    let mut pos = offset;
    let mut remaining = bitlen;
    let mut acc: u64 = 0;
    while remaining > 0 {
        let bit = pos % 8;
        let take = (8 - bit).min(remaining);
        let shift = 8 - bit - take;
        let chunk = (byte_at(words, pos / 8) >> shift) as u64 & ((1 << take) - 1);
        acc = (acc << take) | chunk;
        pos += take;
        remaining -= take;
    }
    acc as u32
}
