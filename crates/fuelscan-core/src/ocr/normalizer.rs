//! Image normalization ahead of OCR.
//!
//! Receipts are often photographed small, dim and soft. The steps below
//! upscale, drop color and push contrast and edges so thermal-printer glyphs
//! separate cleanly from the paper.

use image::error::{ParameterError, ParameterErrorKind};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageError, Luma};
use tracing::{debug, warn};

use crate::models::config::NormalizeConfig;

/// Smoothing kernel used as the blur reference for sharpness enhancement.
const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];
const SMOOTH_DIVISOR: f32 = 13.0;

/// Final edge sharpening kernel.
const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];
const SHARPEN_DIVISOR: f32 = 16.0;

/// Prepares images for the OCR engine.
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    config: NormalizeConfig,
}

impl ImageNormalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Upscale, grayscale and enhance `image`.
    ///
    /// Never fails: if a step cannot be applied the input is returned as is.
    pub fn normalize(&self, image: &DynamicImage) -> DynamicImage {
        match self.try_normalize(image) {
            Ok(gray) => DynamicImage::ImageLuma8(gray),
            Err(e) => {
                warn!("Image normalization skipped: {}", e);
                image.clone()
            }
        }
    }

    fn try_normalize(&self, image: &DynamicImage) -> Result<GrayImage, ImageError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            )));
        }

        let resized;
        let image = if width < self.config.min_width {
            let scale = self.config.min_width as f64 / width as f64;
            let new_height = ((height as f64 * scale) as u32).max(1);
            debug!(
                "Upscaling {}x{} -> {}x{}",
                width, height, self.config.min_width, new_height
            );
            resized = image.resize_exact(self.config.min_width, new_height, FilterType::Lanczos3);
            &resized
        } else {
            image
        };

        let gray = image.to_luma8();
        let gray = brightness(&gray, self.config.brightness);
        let gray = contrast(&gray, self.config.contrast);
        let gray = sharpness(&gray, self.config.sharpness);
        let gray = if self.config.final_sharpen {
            convolve3x3(&gray, &SHARPEN_KERNEL, SHARPEN_DIVISOR)
        } else {
            gray
        };

        debug!("Normalized image: {}x{}", gray.width(), gray.height());
        Ok(gray)
    }
}

/// `degenerate + factor * (pixel - degenerate)`, clamped and truncated.
fn blend(image: &GrayImage, factor: f32, degenerate: impl Fn(u32, u32) -> f32) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let base = degenerate(x, y);
        let value = base + factor * (image.get_pixel(x, y)[0] as f32 - base);
        Luma([value.clamp(0.0, 255.0) as u8])
    })
}

/// Blend with black.
fn brightness(image: &GrayImage, factor: f32) -> GrayImage {
    blend(image, factor, |_, _| 0.0)
}

/// Blend with the mean gray level, rounded to an integer.
fn contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let count = image.width() as u64 * image.height() as u64;
    let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
    let mean = (sum as f64 / count.max(1) as f64 + 0.5).floor() as f32;
    blend(image, factor, |_, _| mean)
}

/// Blend with a smoothed copy.
fn sharpness(image: &GrayImage, factor: f32) -> GrayImage {
    let smooth = convolve3x3(image, &SMOOTH_KERNEL, SMOOTH_DIVISOR);
    blend(image, factor, |x, y| smooth.get_pixel(x, y)[0] as f32)
}

/// 3x3 convolution; the one-pixel border is copied unchanged.
fn convolve3x3(image: &GrayImage, kernel: &[f32; 9], divisor: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return image.clone();
    }

    GrayImage::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            return *image.get_pixel(x, y);
        }
        let mut sum = 0.0f32;
        for ky in 0..3 {
            for kx in 0..3 {
                let pixel = image.get_pixel(x + kx - 1, y + ky - 1)[0] as f32;
                sum += pixel * kernel[(ky * 3 + kx) as usize];
            }
        }
        Luma([(sum / divisor).round().clamp(0.0, 255.0) as u8])
    })
}
