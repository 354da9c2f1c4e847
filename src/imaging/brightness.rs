use image::{DynamicImage, GrayImage, Luma};

use super::Rect;
use crate::error::Result;

/// Mean grayscale intensity (0-255) over `rect`.
///
/// This is a histogram-weighted mean rather than a median, so a few very
/// dark pixels (a pen stroke) pull the value down noticeably.
pub fn average_brightness(image: &DynamicImage, rect: Rect) -> Result<f64> {
    rect.checked_within(image.width(), image.height())?;
    let cropped = image.crop_imm(rect.left, rect.top, rect.width, rect.height);
    let histogram = luma_histogram(&to_luma(&cropped));

    let mut total_brightness = 0u64;
    let mut total_pixels = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        total_brightness += value as u64 * count;
        total_pixels += count;
    }
    // checked_within guarantees at least one pixel.
    Ok(total_brightness as f64 / total_pixels as f64)
}

/// Converts to 8-bit luma with ITU-R 601 weights, compositing any alpha
/// over white.
pub fn to_luma(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut luma = GrayImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let r = (r as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        let g = (g as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        let b = (b as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        let value = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8;
        luma.put_pixel(x, y, Luma([value]));
    }
    luma
}

pub fn luma_histogram(image: &GrayImage) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }
    histogram
}
