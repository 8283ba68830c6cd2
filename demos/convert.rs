use std::path::PathBuf;

use clap::Parser;
use log::info;

use pixblit::format::registry;
use pixblit::pixmap::{ConstPixmap, Pixmap, PixmapBuffer};
use pixblit::{blit, blit_convert};

/// Render a gradient, round-trip it through a packed format and save
/// the result as PNG.
#[derive(Parser)]
struct Args {
    /// Intermediate pixel format (see the builtin registry)
    #[arg(long, default_value = "RGB565")]
    format: String,

    #[arg(long, default_value = "out.png")]
    output: PathBuf,
}

const WIDTH: i32 = 256;
const HEIGHT: i32 = 128;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_micros()
        .init();
    let args = Args::parse();

    let target = registry::format_by_name(&args.format)
        .ok_or_else(|| anyhow::anyhow!("unknown format {}", args.format))?;
    let rgb = registry::rgb888();
    info!("round-tripping through {}", target);

    let mut src = PixmapBuffer::new(rgb, WIDTH, HEIGHT, None);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let p = x as u32 | (((y * 2) as u32) << 8) | (((255 - x) as u32) << 16);
            src.put_pixel(x, y, p);
        }
    }

    let start = std::time::Instant::now();
    let mut packed = PixmapBuffer::new(target, WIDTH, HEIGHT, None);
    blit_convert(&src, 0, 0, WIDTH, HEIGHT, &mut packed, 0, 0)?;
    let mut back = PixmapBuffer::new(rgb, WIDTH, HEIGHT, None);
    blit_convert(&packed, 0, 0, WIDTH, HEIGHT, &mut back, 0, 0)?;
    info!("converted {}x{} both ways in {:?}", WIDTH, HEIGHT, start.elapsed());

    // same-format copy of the center quarter back over the original
    let mut out = src;
    blit(
        &back,
        WIDTH / 4,
        HEIGHT / 4,
        WIDTH / 2,
        HEIGHT / 2,
        &mut out,
        WIDTH / 4,
        HEIGHT / 4,
    );

    let png = image::RgbImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
        let p = out.pixel(x as i32, y as i32);
        image::Rgb([
            rgb.channel_value('R', p).unwrap() as u8,
            rgb.channel_value('G', p).unwrap() as u8,
            rgb.channel_value('B', p).unwrap() as u8,
        ])
    });
    png.save(&args.output)?;
    info!("wrote {}", args.output.display());
    Ok(())
}
