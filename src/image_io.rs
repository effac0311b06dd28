//! Handing images to the engines. Every engine gets 24-bit RGB.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::error::Result;

pub fn open<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

pub fn to_rgb(image: &DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb.clone(),
        other => other.to_rgb8(),
    }
}

/// Writes `image` as an RGB BMP file.
pub fn save_bmp<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<()> {
    to_rgb(image).save_with_format(path, ImageFormat::Bmp)?;
    Ok(())
}

/// Encodes `image` as an RGB BMP in memory.
pub fn encode_bmp(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    to_rgb(image).write_to(&mut buf, ImageFormat::Bmp)?;
    Ok(buf.into_inner())
}
