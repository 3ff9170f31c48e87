// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Normalizer tests
//!
//! These tests verify that `normalize`:
//! - Always yields a [1, 224, 224, 3] tensor in [-1, 1]
//! - Accepts 1, 3 and 4 channel inputs at any resolution
//! - Treats encoded bytes and in-memory bitmaps identically
//! - Reports undecodable input as an `ImageError`

use anemia_screen::vision::{normalize, ImageError, ImageSource, NormalizedTensor};
use image::{
    DynamicImage, GrayImage, ImageFormat, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage,
};
use std::io::Cursor;

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn assert_in_range(tensor: &NormalizedTensor) {
    assert_eq!(tensor.shape(), &NormalizedTensor::SHAPE);
    assert!(tensor
        .as_array()
        .iter()
        .all(|v| v.is_finite() && (-1.0..=1.0).contains(v)));
}

#[cfg(test)]
mod normalizer_tests {
    use super::*;

    #[test]
    fn test_shape_independent_of_resolution() {
        for (w, h) in [(1, 1), (32, 600), (640, 480), (224, 224), (1000, 50)] {
            let tensor = normalize(&ImageSource::Bitmap(gradient(w, h))).unwrap();
            assert_in_range(&tensor);
        }
    }

    #[test]
    fn test_shape_independent_of_channel_count() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 70, Luma([90])));
        let gray_alpha =
            DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_pixel(50, 70, LumaA([90, 10])));
        let rgb = gradient(50, 70);
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 70, Rgba([1, 2, 3, 4])));

        for image in [gray, gray_alpha, rgb, rgba] {
            assert_in_range(&normalize(&ImageSource::Bitmap(image)).unwrap());
        }
    }

    #[test]
    fn test_extremes_map_to_range_bounds() {
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 30, Rgb([255, 255, 255])));
        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 30, Rgb([0, 0, 0])));

        let white = normalize(&ImageSource::Bitmap(white)).unwrap();
        let black = normalize(&ImageSource::Bitmap(black)).unwrap();

        assert!(white.as_array().iter().all(|&v| v == 1.0));
        assert!(black.as_array().iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_grayscale_replicated_across_channels() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 20, Luma([200])));
        let tensor = normalize(&ImageSource::Bitmap(gray)).unwrap();
        let array = tensor.as_array();

        let expected = 200.0 / 127.5 - 1.0;
        for c in 0..3 {
            assert!((array[[0, 100, 100, c]] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_alpha_channel_ignored() {
        let opaque = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([10, 20, 30, 255])));
        let transparent =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([10, 20, 30, 0])));

        assert_eq!(
            normalize(&ImageSource::Bitmap(opaque)).unwrap(),
            normalize(&ImageSource::Bitmap(transparent)).unwrap()
        );
    }

    #[test]
    fn test_encoded_and_bitmap_sources_agree() {
        let image = gradient(300, 200);
        let encoded = encode(&image, ImageFormat::Png);

        assert_eq!(
            normalize(&ImageSource::Encoded(encoded)).unwrap(),
            normalize(&ImageSource::Bitmap(image)).unwrap()
        );
    }

    #[test]
    fn test_jpeg_and_bmp_decode() {
        let image = gradient(120, 90);
        for format in [ImageFormat::Jpeg, ImageFormat::Bmp] {
            let bytes = encode(&image, format);
            assert_in_range(&normalize(&ImageSource::Encoded(bytes)).unwrap());
        }
    }

    #[test]
    fn test_base64_source() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let bytes = encode(&gradient(64, 64), ImageFormat::Png);
        let source = ImageSource::from_base64(&STANDARD.encode(&bytes)).unwrap();
        assert_in_range(&normalize(&source).unwrap());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let source = ImageSource::Encoded(encode(&gradient(333, 111), ImageFormat::Png));
        assert_eq!(normalize(&source).unwrap(), normalize(&source).unwrap());
    }

    #[test]
    fn test_non_image_bytes_rejected() {
        let source = ImageSource::Encoded(b"this is a text file, not a photo".to_vec());
        assert!(matches!(
            normalize(&source),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_truncated_png_rejected() {
        let mut bytes = encode(&gradient(64, 64), ImageFormat::Png);
        bytes.truncate(40);
        assert!(matches!(
            normalize(&ImageSource::Encoded(bytes)),
            Err(ImageError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            normalize(&ImageSource::Encoded(Vec::new())),
            Err(ImageError::EmptyData)
        ));
    }
}
