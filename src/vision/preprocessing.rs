// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the MobileNetV3 anemia classifier

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

use super::image_utils::{ImageError, ImageSource};

/// Target edge length for the classifier input
pub const INPUT_SIZE: u32 = 224;

/// Number of color channels fed to the classifier (RGB)
pub const INPUT_CHANNELS: usize = 3;

/// MobileNetV3 `preprocess_input` scale: x / 127.5 - 1
pub const PIXEL_SCALE: f32 = 127.5;

/// MobileNetV3 `preprocess_input` offset
pub const PIXEL_OFFSET: f32 = 1.0;

/// Interpolation used for the resize (bilinear)
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Classifier input tensor, NHWC `[1, 224, 224, 3]` with values in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array4<f32>);

impl NormalizedTensor {
    /// Tensor shape expected by the classifier
    pub const SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, INPUT_CHANNELS];

    /// Borrow the underlying array
    pub fn as_array(&self) -> &Array4<f32> {
        &self.0
    }

    /// Consume into the underlying array
    pub fn into_array(self) -> Array4<f32> {
        self.0
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }
}

/// Map a 0-255 channel value onto the model's input range
#[inline]
pub fn scale_pixel(value: u8) -> f32 {
    value as f32 / PIXEL_SCALE - PIXEL_OFFSET
}

/// Decode `source` and normalize it for the classifier
///
/// Fails only when the source cannot be read into a pixel array.
pub fn normalize(source: &ImageSource) -> Result<NormalizedTensor, ImageError> {
    let (image, _info) = source.decode()?;
    Ok(normalize_image(&image))
}

/// Normalize a decoded bitmap
///
/// Steps:
/// 1. Convert to RGB (grayscale replicated, alpha dropped)
/// 2. Stretch to INPUT_SIZE x INPUT_SIZE, aspect ratio is not preserved
/// 3. Scale each channel with x / 127.5 - 1
/// 4. Lay out as NHWC `[1, H, W, 3]`
pub fn normalize_image(image: &DynamicImage) -> NormalizedTensor {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let resized = rgb
        .resize_exact(INPUT_SIZE, INPUT_SIZE, RESIZE_FILTER)
        .to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, size, size, INPUT_CHANNELS));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..INPUT_CHANNELS {
            tensor[[0, y as usize, x as usize, c]] = scale_pixel(pixel[c]);
        }
    }

    NormalizedTensor(tensor)
}
