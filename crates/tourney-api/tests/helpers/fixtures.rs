//! Test fixtures: images encoded with the `image` crate and non-image blobs.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("Failed to encode fixture");
    out.into_inner()
}

/// A flag-sized JPEG, wider than the default commit width.
pub fn england_jpg() -> Vec<u8> {
    encode(600, 360, ImageFormat::Jpeg)
}

pub fn small_png() -> Vec<u8> {
    encode(120, 80, ImageFormat::Png)
}

/// Plain text, whatever name it is uploaded under.
pub fn text_file() -> Vec<u8> {
    b"Team roster\nAlice\nBob\n".to_vec()
}

/// `size` bytes starting with a PNG signature.
pub fn oversized_png(size: usize) -> Vec<u8> {
    let mut data = small_png();
    data.resize(size, 0);
    data
}
