//! Bit-field access and pixel addressing.
//!
//! These are the only primitives through which pixel bits are read or
//! written. Multi-byte pixels are little-endian in memory; sub-byte
//! pixels share a byte and are located by [`pixel_bit_offset`].

use crate::format::BitOrder;

/// Extract `len` bits at `offset` from `val`.
#[inline]
pub fn get_bits(offset: u32, len: u32, val: u32) -> u32 {
    debug_assert!(len >= 1 && offset + len <= 32);
    if len >= 32 {
        val >> offset
    } else {
        (val >> offset) & ((1u32 << len) - 1)
    }
}

/// Store `val` into the `len`-bit field at `offset` of `target`.
/// Bits outside the field are left untouched.
#[inline]
pub fn set_bits(offset: u32, len: u32, target: &mut u32, val: u32) {
    debug_assert!(len >= 1 && offset + len <= 32);
    let mask = if len >= 32 { u32::MAX } else { (1u32 << len) - 1 };
    *target = (*target & !(mask << offset)) | ((val & mask) << offset);
}

/// Byte-sized [`get_bits`], for read-modify-write on shared edge bytes.
#[inline]
pub fn get_bits8(offset: u32, len: u32, val: u8) -> u8 {
    debug_assert!(len >= 1 && offset + len <= 8);
    if len >= 8 {
        val >> offset
    } else {
        (val >> offset) & ((1u8 << len) - 1)
    }
}

/// Byte-sized [`set_bits`].
#[inline]
pub fn set_bits8(offset: u32, len: u32, target: &mut u8, val: u8) {
    debug_assert!(len >= 1 && offset + len <= 8);
    let mask: u8 = if len >= 8 { 0xff } else { (1u8 << len) - 1 };
    *target = (*target & !(mask << offset)) | ((val & mask) << offset);
}

/// Byte offset of pixel (x, y) from the buffer base. For sub-byte
/// formats several pixels share the returned byte.
#[inline]
pub fn pixel_byte_offset(bpp: u32, pitch: i32, x: i32, y: i32) -> usize {
    debug_assert!(x >= 0 && y >= 0);
    let row = (y * pitch) as usize;
    if bpp >= 8 {
        row + (bpp / 8) as usize * x as usize
    } else {
        row + x as usize / (8 / bpp) as usize
    }
}

/// In-byte bit offset of pixel x. Always 0 for byte-aligned formats;
/// below 8bpp the bit order decides which end of the byte pixel 0
/// occupies.
#[inline]
pub fn pixel_bit_offset(bpp: u32, order: BitOrder, x: i32) -> u32 {
    if bpp >= 8 {
        return 0;
    }
    let ppb = 8 / bpp; // pixels per byte
    let off = (x as u32 % ppb) * bpp;
    match order {
        BitOrder::DownBit => off,
        BitOrder::UpBit => (8 - bpp) - off,
    }
}
