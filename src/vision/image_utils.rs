// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading and decode-boundary validation for screening requests

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Maximum encoded image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Errors raised while turning caller input into a pixel array
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format, `None` for in-memory bitmaps
    pub format: Option<ImageFormat>,
    /// Number of color channels in the decoded bitmap
    pub channels: u8,
    /// Encoded size in bytes (0 for in-memory bitmaps)
    pub size_bytes: usize,
}

impl ImageInfo {
    fn describe(image: &DynamicImage, format: Option<ImageFormat>, size_bytes: usize) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            format,
            channels: image.color().channel_count(),
            size_bytes,
        }
    }
}

/// Input accepted by the screening pipeline
///
/// Uploads, files and decoded base64 payloads arrive as `Encoded` bytes;
/// callers that already hold a bitmap pass it through as `Bitmap`.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Encoded image file contents (PNG, JPEG, WebP, BMP or TIFF)
    Encoded(Vec<u8>),
    /// Already decoded bitmap
    Bitmap(DynamicImage),
}

impl ImageSource {
    /// Build a source from a base64 string (JSON upload variant)
    pub fn from_base64(base64_str: &str) -> Result<Self, ImageError> {
        if base64_str.is_empty() {
            return Err(ImageError::EmptyData);
        }
        let bytes = STANDARD.decode(base64_str.trim())?;
        Ok(Self::Encoded(bytes))
    }

    /// Decode the source into a bitmap
    pub fn decode(&self) -> Result<(DynamicImage, ImageInfo), ImageError> {
        match self {
            ImageSource::Encoded(bytes) => decode_image_bytes(bytes),
            ImageSource::Bitmap(image) => {
                if image.width() == 0 || image.height() == 0 {
                    return Err(ImageError::EmptyData);
                }
                let info = ImageInfo::describe(image, None, 0);
                Ok((image.clone(), info))
            }
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Encoded(bytes)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        Self::Bitmap(image)
    }
}

/// Decode raw image bytes (multipart uploads and files)
///
/// # Returns
/// * `Ok((DynamicImage, ImageInfo))` - The decoded image and metadata
/// * `Err(ImageError)` - If the payload is empty, too large, of an unknown
///   format, or corrupt
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::EmptyData);
    }

    let info = ImageInfo::describe(&img, Some(format), bytes.len());
    Ok((img, info))
}

/// Detect image format from magic bytes
///
/// Only the formats the screening service accepts are recognised.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// File extensions matching the accepted formats
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];
