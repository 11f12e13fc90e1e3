//! Shrinks a captured photo into the JPEG payload the detection service expects.

use crate::error::EncodingError;
use crate::types::{CapturedImage, EncodedPayload, PayloadFormat};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;
use log::debug;
use std::io::Cursor;

pub const TARGET_WIDTH: u32 = 800;
pub const JPEG_QUALITY: u8 = 70;

/// Resizes to `TARGET_WIDTH` keeping the aspect ratio and re-encodes as JPEG.
pub fn prepare(image: &CapturedImage) -> Result<EncodedPayload, EncodingError> {
    let decoded = ImageReader::new(Cursor::new(&image.data[..]))
        .with_guessed_format()
        .map_err(|e| EncodingError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| EncodingError::Decode(e.to_string()))?;

    let height = scaled_height(decoded.width(), decoded.height(), TARGET_WIDTH);
    let rgb = decoded
        .resize_exact(TARGET_WIDTH, height, FilterType::Triangle)
        .to_rgb8();

    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| EncodingError::Encode(e.to_string()))?;
    debug!(
        "Encoded {}x{} photo as {}x{} JPEG ({} bytes)",
        decoded.width(),
        decoded.height(),
        rgb.width(),
        rgb.height(),
        data.len()
    );

    Ok(EncodedPayload {
        data: Bytes::from(data),
        format: PayloadFormat::Jpeg,
        width: rgb.width(),
        height: rgb.height(),
    })
}

fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (u64::from(height) * u64::from(target_width) + u64::from(width) / 2) / u64::from(width);
    scaled.max(1) as u32
}
