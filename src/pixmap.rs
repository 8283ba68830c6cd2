//! Pixel buffer views.
//!
//! The blit and convert engines only need read/write access to a byte
//! buffer with a known pitch; these types provide exactly that, either
//! borrowing caller memory ([`ConstPixmapView`], [`PixmapView`]) or
//! owning it ([`PixmapBuffer`]). The format descriptor is borrowed and
//! never mutated.

use crate::bits::{pixel_bit_offset, pixel_byte_offset, get_bits, set_bits, set_bits8};
use crate::format::PixelFormat;
use crate::Pixel;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl<T> From<(T, T)> for Point
where
    T: Into<i32>,
{
    fn from(value: (T, T)) -> Self {
        Point {
            x: value.0.into(),
            y: value.1.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl<T> From<(T, T)> for Size
where
    T: Into<i32>,
{
    fn from(value: (T, T)) -> Self {
        Size {
            width: value.0.into(),
            height: value.1.into(),
        }
    }
}

pub fn minimum_pitch(bpp: u32, width: i32) -> i32 {
    (width * bpp as i32 + 7) / 8
}

#[derive(Clone, Copy, Debug)]
pub struct PixmapHeader<'f> {
    data_len: usize,
    format: &'f PixelFormat,
    width: i32,
    pitch: i32,
    height: i32,
}

impl<'f> PixmapHeader<'f> {
    pub fn new(
        format: &'f PixelFormat,
        data_len: usize,
        width: i32,
        height: i32,
        pitch: Option<i32>,
    ) -> Self {
        let minimum_pitch = minimum_pitch(format.bpp(), width);
        let pitch = pitch.unwrap_or(minimum_pitch);
        assert!(
            pitch >= minimum_pitch,
            "invalid pitch {} for width {} with format {}",
            pitch,
            width,
            format
        );
        assert!(
            width > 0 && height > 0,
            "invalid width {} and height {}",
            width,
            height
        );
        assert!(
            data_len >= (height * pitch) as usize,
            "invalid data len {} for height {} and pitch {}",
            data_len,
            height,
            pitch
        );
        PixmapHeader {
            data_len,
            format,
            width,
            pitch,
            height,
        }
    }

    fn subimg(&self, pt: Point, size: Size) -> (Self, usize) {
        // sub-pixmaps must start on a byte boundary
        assert!((pt.x * self.format.bpp() as i32) % 8 == 0);
        assert!(pt.x >= 0 && pt.x < self.width && pt.x + size.width <= self.width);
        assert!(pt.y >= 0 && pt.y < self.height && pt.y + size.height <= self.height);
        let offset = (pt.y * self.pitch) as usize
            + pixel_byte_offset(self.format.bpp(), self.pitch, pt.x, 0);
        (
            Self {
                data_len: self.data_len - offset,
                format: self.format,
                width: size.width,
                pitch: self.pitch,
                height: size.height,
            },
            offset,
        )
    }
}

pub trait HasPixmapHeader {
    fn header(&self) -> PixmapHeader<'_>;
}

pub trait ConstPixmap: HasPixmapHeader {
    fn data(&self) -> &[u8];

    fn bpp(&self) -> u32 {
        self.header().format.bpp()
    }
    fn format(&self) -> &PixelFormat {
        self.header().format
    }
    fn width(&self) -> i32 {
        self.header().width
    }
    fn height(&self) -> i32 {
        self.header().height
    }
    fn pitch(&self) -> i32 {
        self.header().pitch
    }
    fn is_continuous(&self) -> bool {
        self.pitch() == minimum_pitch(self.bpp(), self.width())
    }
    fn size(&self) -> Size {
        (self.width(), self.height()).into()
    }
    fn ptr(&self, row: i32) -> *const u8 {
        self.data()[((row * self.pitch()) as usize)..].as_ptr()
    }
    fn subimg(&self, pt: Point, size: Size) -> ConstPixmapView {
        let (sub_hdr, offset) = self.header().subimg(pt, size);
        ConstPixmapView {
            header: sub_hdr,
            data: &self.data()[offset..],
        }
    }
    fn view(&self) -> ConstPixmapView {
        ConstPixmapView {
            header: self.header(),
            data: self.data(),
        }
    }

    /// Read the pixel at (x, y). Multi-byte formats are little-endian;
    /// only the `(bpp+7)/8` bytes of the pixel are touched.
    fn pixel(&self, x: i32, y: i32) -> Pixel {
        debug_assert!(x >= 0 && x < self.width() && y >= 0 && y < self.height());
        let fmt = self.format();
        let bpp = fmt.bpp();
        let bit = pixel_bit_offset(bpp, fmt.bit_order(), x);
        let off = pixel_byte_offset(bpp, self.pitch(), x, y);
        let data = self.data();
        let mut word: u32 = 0;
        for i in 0..((bpp + 7) / 8) as usize {
            word |= (data[off + i] as u32) << (8 * i);
        }
        get_bits(bit, bpp, word)
    }
}

pub trait Pixmap: ConstPixmap {
    fn mut_data(&mut self) -> &mut [u8];

    fn mut_ptr(&mut self, row: i32) -> *mut u8 {
        let offset = (row * self.pitch()) as usize;
        self.mut_data()[offset..].as_mut_ptr()
    }
    /// Write the pixel at (x, y). Read-modify-write, so neighboring
    /// pixels sharing a byte are preserved.
    fn put_pixel(&mut self, x: i32, y: i32, p: Pixel) {
        debug_assert!(x >= 0 && x < self.width() && y >= 0 && y < self.height());
        let fmt = self.format();
        let bpp = fmt.bpp();
        let order = fmt.bit_order();
        let pitch = self.pitch();
        let bit = pixel_bit_offset(bpp, order, x);
        let off = pixel_byte_offset(bpp, pitch, x, y);
        let nbytes = ((bpp + 7) / 8) as usize;
        let data = self.mut_data();
        let mut word: u32 = 0;
        for i in 0..nbytes {
            word |= (data[off + i] as u32) << (8 * i);
        }
        set_bits(bit, bpp, &mut word, p);
        for i in 0..nbytes {
            data[off + i] = (word >> (8 * i)) as u8;
        }
    }

    /// Fill every pixel with the same value.
    fn fill(&mut self, p: Pixel) {
        let bpp = self.bpp();
        let width = self.width();
        let height = self.height();
        let pitch = self.pitch() as usize;
        if bpp < 8 {
            // the packed byte pattern is the same for both bit orders
            let mut pattern = 0u8;
            for i in 0..8 / bpp {
                set_bits8(i * bpp, bpp, &mut pattern, p as u8);
            }
            let row_len = minimum_pitch(bpp, width) as usize;
            let data = self.mut_data();
            for y in 0..height as usize {
                data[y * pitch..y * pitch + row_len].fill(pattern);
            }
        } else {
            let nbytes = (bpp / 8) as usize;
            let data = self.mut_data();
            for y in 0..height as usize {
                let row = &mut data[y * pitch..y * pitch + nbytes * width as usize];
                for chunk in row.chunks_exact_mut(nbytes) {
                    for (i, byte) in chunk.iter_mut().enumerate() {
                        *byte = (p >> (8 * i)) as u8;
                    }
                }
            }
        }
    }
}

pub struct ConstPixmapView<'a> {
    header: PixmapHeader<'a>,
    data: &'a [u8],
}

impl<'a> ConstPixmapView<'a> {
    pub fn new(
        format: &'a PixelFormat,
        data: &'a [u8],
        width: i32,
        height: i32,
        pitch: Option<i32>,
    ) -> Self {
        let header = PixmapHeader::new(format, data.len(), width, height, pitch);
        ConstPixmapView { header, data }
    }
}

impl<'a> HasPixmapHeader for ConstPixmapView<'a> {
    fn header(&self) -> PixmapHeader<'_> {
        self.header
    }
}

impl<'a> ConstPixmap for ConstPixmapView<'a> {
    fn data(&self) -> &[u8] {
        self.data
    }
}

pub struct PixmapView<'a> {
    header: PixmapHeader<'a>,
    data: &'a mut [u8],
}

impl<'a> PixmapView<'a> {
    pub fn new(
        format: &'a PixelFormat,
        data: &'a mut [u8],
        width: i32,
        height: i32,
        pitch: Option<i32>,
    ) -> Self {
        let header = PixmapHeader::new(format, data.len(), width, height, pitch);
        PixmapView { header, data }
    }

    pub fn mut_subimg(&mut self, pt: Point, size: Size) -> PixmapView<'_> {
        let (sub_hdr, offset) = self.header.subimg(pt, size);
        PixmapView {
            header: sub_hdr,
            data: &mut self.data[offset..],
        }
    }

    pub fn mut_view(&mut self) -> PixmapView<'_> {
        PixmapView {
            header: self.header,
            data: &mut self.data[..],
        }
    }
}

impl<'a> HasPixmapHeader for PixmapView<'a> {
    fn header(&self) -> PixmapHeader<'_> {
        self.header
    }
}

impl<'a> ConstPixmap for PixmapView<'a> {
    fn data(&self) -> &[u8] {
        self.data
    }
}

impl<'a> Pixmap for PixmapView<'a> {
    fn mut_data(&mut self) -> &mut [u8] {
        self.data
    }
}

pub struct PixmapBuffer<'f> {
    data: Vec<u8>,
    header: PixmapHeader<'f>,
}

impl<'f> PixmapBuffer<'f> {
    pub fn new(format: &'f PixelFormat, width: i32, height: i32, pitch: Option<i32>) -> Self {
        let minimum_pitch = minimum_pitch(format.bpp(), width);
        let pitch = pitch.unwrap_or(minimum_pitch);
        let data = vec![0; (pitch * height) as usize];
        let header = PixmapHeader::new(format, data.len(), width, height, Some(pitch));
        Self { data, header }
    }

    pub fn mut_subimg(&mut self, pt: Point, size: Size) -> PixmapView<'_> {
        let (sub_hdr, offset) = self.header.subimg(pt, size);
        PixmapView {
            header: sub_hdr,
            data: &mut self.data[offset..],
        }
    }

    pub fn mut_view(&mut self) -> PixmapView<'_> {
        PixmapView {
            header: self.header,
            data: &mut self.data[..],
        }
    }
}

impl<'f> HasPixmapHeader for PixmapBuffer<'f> {
    fn header(&self) -> PixmapHeader<'_> {
        self.header
    }
}

impl<'f> ConstPixmap for PixmapBuffer<'f> {
    fn data(&self) -> &[u8] {
        self.data.as_slice()
    }
}

impl<'f> Pixmap for PixmapBuffer<'f> {
    fn mut_data(&mut self) -> &mut [u8] {
        self.data.as_mut_slice()
    }
}
