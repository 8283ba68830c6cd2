//! Pixel format descriptors and layout validation.
//!
//! A [`PixelFormat`] describes how the channels of a pixel are packed
//! into 1-32 bits. Formats are validated once at construction and
//! immutable afterwards; every other component borrows them read-only.

use std::fmt;

use thiserror::Error;

use crate::bits::get_bits;
use crate::Pixel;

pub const ALLOWED_SIZES: [u32; 7] = [1, 2, 4, 8, 16, 24, 32];

/// Which end of a byte the first sub-byte pixel occupies.
/// Only meaningful for formats below 8bpp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    /// Pixel 0 at the least significant bits.
    DownBit,
    /// Pixel 0 at the most significant bits.
    UpBit,
}

/// A named bitfield within a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channel {
    pub name: char,
    pub offset: u32,
    pub size: u32,
}

/// The channel families supported by the converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelSet {
    Rgb,
    Rgba,
    Gray,
    GrayAlpha,
    /// Validates and addresses fine, but cannot be converted.
    Other,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid pixel size {0}bpp (allowed: 1, 2, 4, 8, 16, 24, 32)")]
    InvalidSize(u32),
    #[error("{0}bpp requires an explicit bit order")]
    MissingBitOrder(u32),
    #[error("bit order is meaningless for {0}bpp")]
    UnexpectedBitOrder(u32),
    #[error("duplicate channel '{0}'")]
    DuplicateChannel(char),
    #[error("channel '{0}' has zero width")]
    ZeroSizeChannel(char),
    #[error("channel '{name}' ({offset}+{size} bits) exceeds {bpp}bpp pixel")]
    OutOfRange {
        name: char,
        offset: u32,
        size: u32,
        bpp: u32,
    },
    #[error("channels '{name}' and '{other}' overlap at bit {bit}")]
    Overlap { name: char, other: char, bit: u32 },
}

/// Immutable description of one pixel format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelFormat {
    name: String,
    bpp: u32,
    bit_order: BitOrder,
    channels: Vec<Channel>,
    /// Per-bit ownership map, `'x'` marks padding. Diagnostics only.
    bits: Vec<char>,
}

impl PixelFormat {
    /// Validate a channel layout and build the descriptor.
    ///
    /// `bit_order` must be given iff `bpp < 8`. Channels are
    /// `(name, offset, size)` triples; their bit ranges must lie inside
    /// the pixel and must not overlap.
    pub fn build(
        name: &str,
        bpp: u32,
        bit_order: Option<BitOrder>,
        channels: &[(char, u32, u32)],
    ) -> Result<PixelFormat, LayoutError> {
        if !ALLOWED_SIZES.contains(&bpp) {
            return Err(LayoutError::InvalidSize(bpp));
        }
        let bit_order = match (bpp < 8, bit_order) {
            (true, Some(order)) => order,
            (true, None) => return Err(LayoutError::MissingBitOrder(bpp)),
            (false, Some(_)) => return Err(LayoutError::UnexpectedBitOrder(bpp)),
            (false, None) => BitOrder::DownBit,
        };

        let mut bits = vec!['x'; bpp as usize];
        let mut chans = Vec::with_capacity(channels.len());
        for &(cname, offset, size) in channels {
            if chans.iter().any(|c: &Channel| c.name == cname) {
                return Err(LayoutError::DuplicateChannel(cname));
            }
            if size == 0 {
                return Err(LayoutError::ZeroSizeChannel(cname));
            }
            if offset + size > bpp {
                return Err(LayoutError::OutOfRange {
                    name: cname,
                    offset,
                    size,
                    bpp,
                });
            }
            for bit in offset..offset + size {
                let owner = &mut bits[bit as usize];
                if *owner != 'x' {
                    return Err(LayoutError::Overlap {
                        name: cname,
                        other: *owner,
                        bit,
                    });
                }
                *owner = cname;
            }
            chans.push(Channel {
                name: cname,
                offset,
                size,
            });
        }

        Ok(PixelFormat {
            name: name.to_owned(),
            bpp,
            bit_order,
            channels: chans,
            bits,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bpp(&self) -> u32 {
        self.bpp
    }

    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    pub fn is_sub_byte(&self) -> bool {
        self.bpp < 8
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Per-bit ownership map recorded by the validator.
    pub fn ownership(&self) -> &[char] {
        &self.bits
    }

    pub fn channel(&self, name: char) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Extract the value of a named channel from a pixel.
    pub fn channel_value(&self, name: char, p: Pixel) -> Option<u32> {
        self.channel(name).map(|c| get_bits(c.offset, c.size, p))
    }

    pub fn channel_set(&self) -> ChannelSet {
        let mut names: Vec<char> = self.channels.iter().map(|c| c.name).collect();
        names.sort_unstable();
        match names.as_slice() {
            ['B', 'G', 'R'] => ChannelSet::Rgb,
            ['A', 'B', 'G', 'R'] => ChannelSet::Rgba,
            ['V'] => ChannelSet::Gray,
            ['A', 'V'] => ChannelSet::GrayAlpha,
            _ => ChannelSet::Other,
        }
    }

    /// Format a pixel value with its channels broken out,
    /// e.g. `<RGB565 ffff R=31 G=63 B=31>`.
    pub fn describe_pixel(&self, p: Pixel) -> String {
        use fmt::Write;
        let mut out = String::new();
        let _ = write!(
            out,
            "<{} {:0width$x}",
            self.name,
            p,
            width = (self.bpp as usize + 3) / 4
        );
        for c in &self.channels {
            let _ = write!(out, " {}={}", c.name, get_bits(c.offset, c.size, p));
        }
        out.push('>');
        out
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}bpp", self.name, self.bpp)?;
        if self.is_sub_byte() {
            write!(f, ", {:?}", self.bit_order)?;
        }
        write!(f, ") [{}]", self.bits.iter().collect::<String>())?;
        for c in &self.channels {
            write!(f, " {}:{}+{}", c.name, c.offset, c.size)?;
        }
        Ok(())
    }
}

pub mod registry;
