//! Built-in pixel formats.
//!
//! The table is built lazily on first access and read-only afterwards;
//! the descriptors may be shared freely across threads.

use std::sync::OnceLock;

use super::{BitOrder, PixelFormat};

static REGISTRY: OnceLock<Vec<PixelFormat>> = OnceLock::new();

fn build_table() -> Vec<PixelFormat> {
    let build = |name, bpp, order, chans: &[(char, u32, u32)]| {
        PixelFormat::build(name, bpp, order, chans).expect("builtin format table is valid")
    };
    use BitOrder::{DownBit, UpBit};
    vec![
        build("RGB888", 24, None, &[('R', 0, 8), ('G', 8, 8), ('B', 16, 8)]),
        build("RGBx8888", 32, None, &[('R', 0, 8), ('G', 8, 8), ('B', 16, 8)]),
        build(
            "RGBA8888",
            32,
            None,
            &[('R', 0, 8), ('G', 8, 8), ('B', 16, 8), ('A', 24, 8)],
        ),
        build("RGB565", 16, None, &[('R', 0, 5), ('G', 5, 6), ('B', 11, 5)]),
        build("V8", 8, None, &[('V', 0, 8)]),
        build("V4", 4, Some(DownBit), &[('V', 0, 4)]),
        build("V2", 2, Some(DownBit), &[('V', 0, 2)]),
        build("V1", 1, Some(DownBit), &[('V', 0, 1)]),
        build("V4_UB", 4, Some(UpBit), &[('V', 0, 4)]),
        build("V2_UB", 2, Some(UpBit), &[('V', 0, 2)]),
        build("V1_UB", 1, Some(UpBit), &[('V', 0, 1)]),
        build("VA12", 4, Some(DownBit), &[('A', 1, 2), ('V', 3, 1)]),
    ]
}

pub fn registry() -> &'static [PixelFormat] {
    REGISTRY.get_or_init(build_table)
}

pub fn format_by_name(name: &str) -> Option<&'static PixelFormat> {
    registry().iter().find(|f| f.name() == name)
}

fn builtin(name: &str) -> &'static PixelFormat {
    format_by_name(name).expect("builtin format present")
}

pub fn rgb888() -> &'static PixelFormat {
    builtin("RGB888")
}

pub fn rgbx8888() -> &'static PixelFormat {
    builtin("RGBx8888")
}

pub fn rgba8888() -> &'static PixelFormat {
    builtin("RGBA8888")
}

pub fn rgb565() -> &'static PixelFormat {
    builtin("RGB565")
}

pub fn v8() -> &'static PixelFormat {
    builtin("V8")
}

pub fn v4() -> &'static PixelFormat {
    builtin("V4")
}

pub fn v2() -> &'static PixelFormat {
    builtin("V2")
}

pub fn v1() -> &'static PixelFormat {
    builtin("V1")
}

pub fn v4_ub() -> &'static PixelFormat {
    builtin("V4_UB")
}

pub fn v2_ub() -> &'static PixelFormat {
    builtin("V2_UB")
}

pub fn v1_ub() -> &'static PixelFormat {
    builtin("V1_UB")
}

pub fn va12() -> &'static PixelFormat {
    builtin("VA12")
}
