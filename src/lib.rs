pub mod bits;
pub mod blit;
pub mod convert;
pub mod format;
pub mod pixmap;
pub mod scale;

/// A single pixel value, right-aligned in the low `bpp` bits.
pub type Pixel = u32;

pub use blit::{blit, blit_clipped, blit_convert};
pub use convert::{cached_converter, ConvertError, Converter};
pub use format::{BitOrder, Channel, ChannelSet, LayoutError, PixelFormat};
pub use pixmap::{ConstPixmap, ConstPixmapView, Pixmap, PixmapBuffer, PixmapView, Point, Size};
pub use scale::scale;
