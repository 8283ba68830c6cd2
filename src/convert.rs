//! Channel-semantic conversion between pixel formats.
//!
//! A [`Converter`] is built once per (source, destination) pair: every
//! destination channel gets exactly one rule, resolved from the channel
//! names at build time. Converting a pixel then just executes the
//! precomputed rule list, with no name matching on the hot path.
//!
//! The rules, per destination channel:
//! 1. copy (with width rescale) when the source has the same channel;
//! 2. alpha defaults to fully opaque when the source has none;
//! 3. gray is the truncating unweighted average of R, G, B;
//! 4. R, G and B each receive the gray value verbatim.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use log::debug;
use thiserror::Error;

use crate::bits::{get_bits, set_bits};
use crate::format::{ChannelSet, PixelFormat};
use crate::scale::scale;
use crate::Pixel;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("format {0} is not convertible (RGB/RGBA/V/VA families, channels of at most 8 bits)")]
    UnsupportedFormat(String),
    #[error("no rule for channel '{channel}' of {dst} when converting from {src}")]
    UnsupportedChannel {
        src: String,
        dst: String,
        channel: char,
    },
}

#[derive(Clone, Copy, Debug)]
enum ChannelRule {
    Copy { src_offset: u32, src_size: u32 },
    Opaque,
    RgbAverage {
        r: (u32, u32),
        g: (u32, u32),
        b: (u32, u32),
    },
    GrayBroadcast { src_offset: u32, src_size: u32 },
}

#[derive(Clone, Copy, Debug)]
struct ChannelOp {
    dst_offset: u32,
    dst_size: u32,
    rule: ChannelRule,
}

/// Precomputed per-channel conversion for one format pair.
#[derive(Clone, Debug)]
pub struct Converter {
    ops: Vec<ChannelOp>,
}

impl Converter {
    pub fn build(src: &PixelFormat, dst: &PixelFormat) -> Result<Converter, ConvertError> {
        for f in [src, dst] {
            if f.channel_set() == ChannelSet::Other {
                return Err(ConvertError::UnsupportedFormat(f.name().to_owned()));
            }
            // the scale kernel covers channel widths up to 8 bits
            if f.channels().iter().any(|c| c.size > 8) {
                return Err(ConvertError::UnsupportedFormat(f.name().to_owned()));
            }
        }

        let has_rgb = ['R', 'G', 'B'].iter().all(|&n| src.channel(n).is_some());
        let mut ops = Vec::with_capacity(dst.channels().len());
        for c2 in dst.channels() {
            let rule = if let Some(c1) = src.channel(c2.name) {
                ChannelRule::Copy {
                    src_offset: c1.offset,
                    src_size: c1.size,
                }
            } else if c2.name == 'A' {
                ChannelRule::Opaque
            } else if c2.name == 'V' && has_rgb {
                let chan = |n| {
                    let c = src.channel(n).unwrap();
                    (c.offset, c.size)
                };
                ChannelRule::RgbAverage {
                    r: chan('R'),
                    g: chan('G'),
                    b: chan('B'),
                }
            } else if matches!(c2.name, 'R' | 'G' | 'B') && src.channel('V').is_some() {
                let v = src.channel('V').unwrap();
                ChannelRule::GrayBroadcast {
                    src_offset: v.offset,
                    src_size: v.size,
                }
            } else {
                return Err(ConvertError::UnsupportedChannel {
                    src: src.name().to_owned(),
                    dst: dst.name().to_owned(),
                    channel: c2.name,
                });
            };
            ops.push(ChannelOp {
                dst_offset: c2.offset,
                dst_size: c2.size,
                rule,
            });
        }
        Ok(Converter { ops })
    }

    /// Convert one pixel value. Executes the precomputed rule list only.
    pub fn convert(&self, p: Pixel) -> Pixel {
        let mut out: Pixel = 0;
        for op in &self.ops {
            let val = match op.rule {
                ChannelRule::Copy {
                    src_offset,
                    src_size,
                }
                | ChannelRule::GrayBroadcast {
                    src_offset,
                    src_size,
                } => scale(src_size, op.dst_size, get_bits(src_offset, src_size, p)),
                ChannelRule::Opaque => {
                    if op.dst_size >= 32 {
                        u32::MAX
                    } else {
                        (1 << op.dst_size) - 1
                    }
                }
                ChannelRule::RgbAverage { r, g, b } => {
                    let part =
                        |(off, size)| scale(size, op.dst_size, get_bits(off, size, p));
                    (part(r) + part(g) + part(b)) / 3
                }
            };
            set_bits(op.dst_offset, op.dst_size, &mut out, val);
        }
        out
    }
}

type CacheKey = (String, String);

static CACHE: OnceLock<RwLock<HashMap<CacheKey, Arc<Converter>>>> = OnceLock::new();

/// Converter for the pair, built at most a handful of times per
/// process. Duplicate builds under a race are benign (equal results);
/// insert-if-absent keeps the first one. Formats are keyed by name, so
/// caller-built formats should use names distinct from each other and
/// from the registry.
pub fn cached_converter(
    src: &PixelFormat,
    dst: &PixelFormat,
) -> Result<Arc<Converter>, ConvertError> {
    let cache = CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    let key = (src.name().to_owned(), dst.name().to_owned());
    if let Some(conv) = cache.read().unwrap().get(&key) {
        return Ok(conv.clone());
    }
    let built = Arc::new(Converter::build(src, dst)?);
    debug!(
        "built converter {} -> {} ({} channel ops)",
        src.name(),
        dst.name(),
        built.ops.len()
    );
    let mut write = cache.write().unwrap();
    Ok(write.entry(key).or_insert(built).clone())
}
