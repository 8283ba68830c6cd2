//! Rectangle copies between pixel buffers.
//!
//! [`blit`] copies between same-format buffers, picking the cheapest
//! correct strategy for the given alignment; [`blit_convert`] is the
//! slow-but-always-correct sibling for differing formats. Rectangle
//! bounds are the caller's contract and only checked in debug builds;
//! use [`blit_clipped`] when the rectangle may hang over an edge.

use log::{debug, trace};

use crate::bits::{get_bits8, pixel_bit_offset, set_bits8};
use crate::convert::{cached_converter, ConvertError};
use crate::format::BitOrder;
use crate::pixmap::{ConstPixmap, Pixmap};

/// Copy a `w` x `h` rectangle at (sx, sy) of `src` to (dx, dy) of
/// `dst`. Both pixmaps must share a format and the rectangle must lie
/// inside both.
pub fn blit(
    src: &impl ConstPixmap,
    sx: i32,
    sy: i32,
    w: i32,
    h: i32,
    dst: &mut impl Pixmap,
    dx: i32,
    dy: i32,
) {
    debug_assert_eq!(src.format(), dst.format());
    debug_assert!(sx >= 0 && sy >= 0 && dx >= 0 && dy >= 0 && w >= 0 && h >= 0);
    debug_assert!(sx + w <= src.width() && sy + h <= src.height());
    debug_assert!(dx + w <= dst.width() && dy + h <= dst.height());

    if w == 0 || h == 0 {
        return;
    }

    let bpp = src.bpp();

    // whole line-blocks with a single copy
    if sx == 0 && dx == 0 && w == src.width() && w == dst.width() && src.pitch() == dst.pitch()
    {
        trace!("blit: whole-buffer copy, {} rows", h);
        let len = src.pitch() as usize * h as usize;
        let from = unsafe { std::slice::from_raw_parts(src.ptr(sy), len) };
        let to = unsafe { std::slice::from_raw_parts_mut(dst.mut_ptr(dy), len) };
        to.copy_from_slice(from);
        return;
    }

    if bpp >= 8 {
        // every pixel boundary is a byte boundary, copy row by row
        trace!("blit: per-row copy, {}x{} at {}bpp", w, h, bpp);
        let bytes = (bpp / 8) as usize;
        let len = bytes * w as usize;
        let sx_bytes = bytes * sx as usize;
        let dx_bytes = bytes * dx as usize;
        for i in 0..h {
            let from =
                unsafe { std::slice::from_raw_parts(src.ptr(sy + i).add(sx_bytes), len) };
            let to = unsafe {
                std::slice::from_raw_parts_mut(dst.mut_ptr(dy + i).add(dx_bytes), len)
            };
            to.copy_from_slice(from);
        }
        return;
    }

    let order = src.format().bit_order();
    let ppb = (8 / bpp) as i32; // pixels per byte
    let first_byte = sx / ppb;
    let last_byte = (sx + w - 1) / ppb;
    let same_align = pixel_bit_offset(bpp, order, sx) == pixel_bit_offset(bpp, order, dx);
    if same_align && last_byte > first_byte {
        trace!("blit: sub-byte edge-merge, {}x{} at {}bpp", w, h, bpp);
        blit_edge_merge(src, sx, sy, w, h, dst, dx, dy);
        return;
    }

    trace!("blit: per-pixel fallback, {}x{} at {}bpp", w, h, bpp);
    blit_naive(src, sx, sy, w, h, dst, dx, dy);
}

/// Sub-byte path for rectangles with identical bit alignment in source
/// and destination: whole interior bytes are copied directly, the
/// partial first/last byte of each row is merged bit-wise so pixels
/// outside the rectangle survive.
fn blit_edge_merge(
    src: &impl ConstPixmap,
    sx: i32,
    sy: i32,
    w: i32,
    h: i32,
    dst: &mut impl Pixmap,
    dx: i32,
    dy: i32,
) {
    let bpp = src.bpp();
    let order = src.format().bit_order();
    let ppb = (8 / bpp) as i32;

    // pixels into the first and past the last whole byte
    let head = (sx % ppb) as u32;
    let tail = ((sx + w) % ppb) as u32;

    // fields owned by the rectangle inside the two partial bytes
    let (head_off, head_len) = match order {
        BitOrder::DownBit => (head * bpp, 8 - head * bpp),
        BitOrder::UpBit => (0, 8 - head * bpp),
    };
    let (tail_off, tail_len) = match order {
        BitOrder::DownBit => (0, tail * bpp),
        BitOrder::UpBit => (8 - tail * bpp, tail * bpp),
    };

    let head_s = (sx / ppb) as usize;
    let head_d = (dx / ppb) as usize;
    let copy_s = head_s + (head != 0) as usize;
    let copy_d = head_d + (head != 0) as usize;
    let copy_len = ((sx + w) / ppb) as usize - copy_s;
    let tail_s = ((sx + w) / ppb) as usize;
    let tail_d = ((dx + w) / ppb) as usize;

    for i in 0..h {
        let sp = src.ptr(sy + i);
        let dp = dst.mut_ptr(dy + i);
        unsafe {
            if head != 0 {
                let mut byte = *dp.add(head_d);
                set_bits8(
                    head_off,
                    head_len,
                    &mut byte,
                    get_bits8(head_off, head_len, *sp.add(head_s)),
                );
                *dp.add(head_d) = byte;
            }
            if copy_len > 0 {
                let from = std::slice::from_raw_parts(sp.add(copy_s), copy_len);
                let to = std::slice::from_raw_parts_mut(dp.add(copy_d), copy_len);
                to.copy_from_slice(from);
            }
            if tail != 0 {
                let mut byte = *dp.add(tail_d);
                set_bits8(
                    tail_off,
                    tail_len,
                    &mut byte,
                    get_bits8(tail_off, tail_len, *sp.add(tail_s)),
                );
                *dp.add(tail_d) = byte;
            }
        }
    }
}

/// Per-pixel reference copy. Always correct, used when the faster
/// paths are inapplicable.
fn blit_naive(
    src: &impl ConstPixmap,
    sx: i32,
    sy: i32,
    w: i32,
    h: i32,
    dst: &mut impl Pixmap,
    dx: i32,
    dy: i32,
) {
    for y in 0..h {
        for x in 0..w {
            dst.put_pixel(dx + x, dy + y, src.pixel(sx + x, sy + y));
        }
    }
}

/// Rectangle copy between buffers of different formats, converting
/// every pixel through the cached per-pair converter. Same-format
/// inputs are delegated to [`blit`].
pub fn blit_convert(
    src: &impl ConstPixmap,
    sx: i32,
    sy: i32,
    w: i32,
    h: i32,
    dst: &mut impl Pixmap,
    dx: i32,
    dy: i32,
) -> Result<(), ConvertError> {
    if src.format() == dst.format() {
        blit(src, sx, sy, w, h, dst, dx, dy);
        return Ok(());
    }

    debug_assert!(sx >= 0 && sy >= 0 && dx >= 0 && dy >= 0 && w >= 0 && h >= 0);
    debug_assert!(sx + w <= src.width() && sy + h <= src.height());
    debug_assert!(dx + w <= dst.width() && dy + h <= dst.height());

    let converter = cached_converter(src.format(), dst.format())?;
    if w == 0 || h == 0 {
        return Ok(());
    }
    trace!(
        "blit_convert: {} -> {}, {}x{}",
        src.format().name(),
        dst.format().name(),
        w,
        h
    );
    for y in 0..h {
        for x in 0..w {
            dst.put_pixel(dx + x, dy + y, converter.convert(src.pixel(sx + x, sy + y)));
        }
    }
    Ok(())
}

/// [`blit`] with the rectangle clipped against both pixmaps; whole-rect
/// misses are a no-op. Negative destination offsets shift the source
/// origin accordingly.
pub fn blit_clipped(
    src: &impl ConstPixmap,
    sx: i32,
    sy: i32,
    w: i32,
    h: i32,
    dst: &mut impl Pixmap,
    dx: i32,
    dy: i32,
) {
    if w <= 0 || h <= 0 {
        return;
    }

    let (mut x0, mut y0) = (sx, sy);
    let (mut x1, mut y1) = (sx + w - 1, sy + h - 1);
    let (mut x2, mut y2) = (dx, dy);

    if x2 >= dst.width() || y2 >= dst.height() {
        return;
    }

    if x2 < 0 {
        x0 -= x2;
        x2 = 0;
    }
    if y2 < 0 {
        y0 -= y2;
        y2 = 0;
    }

    x0 = x0.max(0);
    y0 = y0.max(0);
    x1 = x1.min(src.width() - 1);
    y1 = y1.min(src.height() - 1);
    if x1 < x0 || y1 < y0 {
        return;
    }

    let src_w = x1 - x0 + 1;
    let src_h = y1 - y0 + 1;
    let dst_w = dst.width() - x2;
    let dst_h = dst.height() - y2;

    if src_w > dst_w {
        x1 -= src_w - dst_w;
    }
    if src_h > dst_h {
        y1 -= src_h - dst_h;
    }

    debug!(
        "clipped blit {}x{} at ({}, {}) -> ({}, {})",
        x1 - x0 + 1,
        y1 - y0 + 1,
        x0,
        y0,
        x2,
        y2
    );
    blit(src, x0, y0, x1 - x0 + 1, y1 - y0 + 1, dst, x2, y2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::registry;
    use crate::format::PixelFormat;
    use crate::pixmap::PixmapBuffer;

    fn mask(bpp: u32) -> u32 {
        if bpp >= 32 {
            u32::MAX
        } else {
            (1u32 << bpp) - 1
        }
    }

    fn patterned(fmt: &PixelFormat, w: i32, h: i32, seed: u32) -> PixmapBuffer {
        let mut buf = PixmapBuffer::new(fmt, w, h, None);
        for y in 0..h {
            for x in 0..w {
                let v = seed
                    .wrapping_mul(0x9e3779b9)
                    .wrapping_add(x as u32 * 7)
                    .wrapping_add(y as u32 * 131);
                buf.put_pixel(x, y, v & mask(fmt.bpp()));
            }
        }
        buf
    }

    #[test]
    fn test_rgb565_rectangle() {
        // 3x2 at (1, 1) of a 4x4 source to (0, 0) of a 3x2 destination,
        // checked against hand-written little-endian rows
        let mut src = PixmapBuffer::new(registry::rgb565(), 4, 4, None);
        for y in 0..4 {
            for x in 0..4 {
                src.put_pixel(x, y, 0x1000 + (y * 4 + x) as u32);
            }
        }
        let mut dst = PixmapBuffer::new(registry::rgb565(), 3, 2, None);
        blit(&src, 1, 1, 3, 2, &mut dst, 0, 0);
        assert_eq!(
            dst.data(),
            &[
                0x05, 0x10, 0x06, 0x10, 0x07, 0x10, // src pixels (1,1)..(3,1)
                0x09, 0x10, 0x0a, 0x10, 0x0b, 0x10, // src pixels (1,2)..(3,2)
            ]
        );
    }

    #[test]
    fn test_sub_byte_edge_merge() {
        // 2bpp DownBit, 4 pixels starting at x=1: straddles the byte
        // boundary, so both edge bytes must be merged
        let mut src = PixmapBuffer::new(registry::v2(), 8, 1, None);
        src.mut_data()[0] = 0b1110_0100; // pixels 0..4 = 0, 1, 2, 3
        src.mut_data()[1] = 0b0000_0001; // pixel 4 = 1
        let mut dst = PixmapBuffer::new(registry::v2(), 8, 1, None);
        dst.mut_data().fill(0xff);

        blit(&src, 1, 0, 4, 1, &mut dst, 1, 0);
        assert_eq!(dst.data()[0], 0b1110_0111); // pixel 0 kept at 0b11
        assert_eq!(dst.data()[1], 0b1111_1101); // pixels 5..8 kept at 0b11
    }

    #[test]
    fn test_whole_buffer_path() {
        let src = patterned(registry::rgba8888(), 16, 8, 1);
        let mut dst = PixmapBuffer::new(registry::rgba8888(), 16, 8, None);
        blit(&src, 0, 0, 16, 8, &mut dst, 0, 0);
        assert_eq!(src.data(), dst.data());
    }

    #[test]
    fn test_degenerate_rect_is_noop() {
        let src = patterned(registry::v8(), 4, 4, 2);
        let mut dst = PixmapBuffer::new(registry::v8(), 4, 4, None);
        blit(&src, 1, 1, 0, 3, &mut dst, 0, 0);
        blit(&src, 1, 1, 3, 0, &mut dst, 0, 0);
        assert!(dst.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_all_strategies_match_naive() {
        // master property: whatever path blit picks, the result is
        // byte-identical to the per-pixel reference copy
        let formats = [
            registry::v1(),
            registry::v1_ub(),
            registry::v2(),
            registry::v2_ub(),
            registry::v4(),
            registry::v4_ub(),
            registry::v8(),
            registry::rgb565(),
            registry::rgb888(),
            registry::rgba8888(),
        ];
        let rects = [
            // (sx, sy, w, h, dx, dy) inside 16x8 -> 16x8
            (0, 0, 16, 8, 0, 0),  // whole buffer
            (0, 1, 16, 4, 0, 3),  // full rows, different y
            (1, 1, 13, 5, 1, 2),  // same alignment
            (1, 0, 13, 6, 3, 1),  // sub-byte: different alignment at 2/4bpp
            (2, 2, 3, 3, 2, 4),   // narrow
            (5, 0, 1, 8, 9, 0),   // single column
            (0, 0, 9, 1, 7, 7),   // tail straddles a byte
            (0, 0, 9, 2, 0, 5),   // aligned head, partial tail
            (4, 0, 8, 3, 8, 2),   // byte-aligned interior only
        ];
        for fmt in formats {
            for &(sx, sy, w, h, dx, dy) in &rects {
                let src = patterned(fmt, 16, 8, 3);
                let mut fast = patterned(fmt, 16, 8, 4);
                let mut reference = patterned(fmt, 16, 8, 4);

                blit(&src, sx, sy, w, h, &mut fast, dx, dy);
                blit_naive(&src, sx, sy, w, h, &mut reference, dx, dy);
                assert_eq!(
                    fast.data(),
                    reference.data(),
                    "{} rect ({}, {}, {}, {}) -> ({}, {})",
                    fmt.name(),
                    sx,
                    sy,
                    w,
                    h,
                    dx,
                    dy
                );
            }
        }
    }

    #[test]
    fn test_blit_convert_rgb888_to_v8() {
        let mut src = PixmapBuffer::new(registry::rgb888(), 2, 1, None);
        src.put_pixel(0, 0, 255 | (128 << 8)); // R=255 G=128 B=0
        src.put_pixel(1, 0, 0x606060);
        let mut dst = PixmapBuffer::new(registry::v8(), 2, 1, None);
        blit_convert(&src, 0, 0, 2, 1, &mut dst, 0, 0).unwrap();
        assert_eq!(dst.pixel(0, 0), 127);
        assert_eq!(dst.pixel(1, 0), 0x60);
    }

    #[test]
    fn test_blit_convert_into_sub_byte() {
        let mut src = PixmapBuffer::new(registry::v8(), 4, 1, None);
        for x in 0..4 {
            src.put_pixel(x, 0, (x as u32) << 6); // 0x00, 0x40, 0x80, 0xc0
        }
        let mut dst = PixmapBuffer::new(registry::v2(), 4, 1, None);
        blit_convert(&src, 0, 0, 4, 1, &mut dst, 0, 0).unwrap();
        assert_eq!(dst.data()[0], 0b1110_0100);
    }

    #[test]
    fn test_blit_convert_unsupported() {
        let xy = PixelFormat::build("XY44", 8, None, &[('X', 0, 4), ('Y', 4, 4)]).unwrap();
        let src = PixmapBuffer::new(&xy, 2, 2, None);
        let mut dst = PixmapBuffer::new(registry::v8(), 2, 2, None);
        assert!(blit_convert(&src, 0, 0, 2, 2, &mut dst, 0, 0).is_err());
    }

    #[test]
    fn test_blit_convert_same_format_delegates() {
        let src = patterned(registry::rgb565(), 4, 4, 5);
        let mut dst = PixmapBuffer::new(registry::rgb565(), 4, 4, None);
        blit_convert(&src, 0, 0, 4, 4, &mut dst, 0, 0).unwrap();
        assert_eq!(src.data(), dst.data());
    }

    #[test]
    fn test_clipped_inside_behaves_like_blit() {
        let src = patterned(registry::v8(), 8, 8, 6);
        let mut a = PixmapBuffer::new(registry::v8(), 8, 8, None);
        let mut b = PixmapBuffer::new(registry::v8(), 8, 8, None);
        blit(&src, 2, 2, 4, 4, &mut a, 1, 1);
        blit_clipped(&src, 2, 2, 4, 4, &mut b, 1, 1);
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_clipped_negative_dst_offset() {
        let mut src = PixmapBuffer::new(registry::v8(), 4, 4, None);
        src.fill(1);
        let mut dst = PixmapBuffer::new(registry::v8(), 4, 4, None);
        blit_clipped(&src, 0, 0, 4, 4, &mut dst, -2, -1);
        // only the overlapping 2x3 corner lands at (0, 0)
        for y in 0..4 {
            for x in 0..4 {
                let expect = if x < 2 && y < 3 { 1 } else { 0 };
                assert_eq!(dst.pixel(x, y), expect, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_clipped_overhanging_rect() {
        let mut src = PixmapBuffer::new(registry::v8(), 4, 4, None);
        src.fill(1);
        let mut dst = PixmapBuffer::new(registry::v8(), 4, 4, None);
        blit_clipped(&src, 2, 2, 4, 4, &mut dst, 3, 3);
        // source clipped to 2x2, destination clipped to 1x1
        assert_eq!(dst.pixel(3, 3), 1);
        assert_eq!(dst.data().iter().map(|&b| b as u32).sum::<u32>(), 1);
    }

    #[test]
    fn test_clipped_miss_is_noop() {
        let mut src = PixmapBuffer::new(registry::v8(), 4, 4, None);
        src.fill(1);
        let mut dst = PixmapBuffer::new(registry::v8(), 4, 4, None);
        blit_clipped(&src, 0, 0, 4, 4, &mut dst, 4, 0);
        blit_clipped(&src, 0, 0, 4, 4, &mut dst, 0, 4);
        blit_clipped(&src, 0, 0, 4, 4, &mut dst, -5, 0);
        blit_clipped(&src, 4, 4, 2, 2, &mut dst, 0, 0);
        assert!(dst.data().iter().all(|&b| b == 0));
    }
}
