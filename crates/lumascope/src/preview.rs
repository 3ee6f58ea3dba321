//! Preview image rendering
//!
//! Reduces a cached tensor to the small PNG the histogram viewer displays
//! next to the charts: collapse the batch axis, clamp, quantize, shrink to
//! fit the preview resolution, encode as PNG, and wrap in a base64 data URI.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};

use crate::analysis::quantize;
use crate::errors::{AppError, AppResult};
use crate::models::ImageTensor;

/// Neither preview dimension may exceed this.
pub const PREVIEW_RESOLUTION: u32 = 512;

/// Render a tensor to PNG bytes, downscaled to the preview resolution.
///
/// Alpha is kept when present (the viewer renders previews over a checker
/// background). Images already within bounds are never upscaled.
pub fn render_preview_png(image: &ImageTensor) -> AppResult<Vec<u8>> {
    let (height, width, channels) = image.logical_dims();

    let mut pixels = Vec::with_capacity(height * width * channels);
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                pixels.push(quantize(image.sample(y, x, c)));
            }
        }
    }

    let preview = match channels {
        4 => RgbaImage::from_raw(width as u32, height as u32, pixels)
            .map(DynamicImage::ImageRgba8),
        _ => RgbImage::from_raw(width as u32, height as u32, pixels)
            .map(DynamicImage::ImageRgb8),
    }
    .ok_or_else(|| AppError::internal("preview pixel buffer does not match image dimensions"))?;

    let preview = if preview.width() > PREVIEW_RESOLUTION || preview.height() > PREVIEW_RESOLUTION
    {
        preview.thumbnail(PREVIEW_RESOLUTION, PREVIEW_RESOLUTION)
    } else {
        preview
    };

    let mut png = Vec::new();
    preview.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Wrap PNG bytes in the data URI the viewer embeds directly.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
