//! Lsblift Core - Steganography decode engine
//!
//! This crate recovers hidden payload images from carrier images produced by
//! LSB-steganography encoders. It provides metadata-driven parameter
//! detection, the five decode strategies (tone remap, fixed-depth LSB,
//! per-channel LSB, threshold-interpolated LSB, and the adaptive
//! dispatcher), and the `Decoder` session object that ties them together.

pub mod decoder;
pub mod error;
pub mod event;
pub mod metadata;
pub mod params;
pub mod strategies;

pub use decoder::{Decoder, DecoderState};
pub use error::DecodeError;
pub use event::{DecodeEvent, EventSink, StrategySource};
pub use metadata::{normalize, CarrierMetadata};
pub use params::{
    default_strategy_params, AdaptiveParams, BitRange, ChannelBits, ChannelLsbParams,
    DecryptionParams, SimpleLsbParams, SmartLsbParams, ToneMode, ToneRemapParams,
};
pub use strategies::run as decode;

/// Sample layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorLayout {
    /// Single 8-bit sample per pixel.
    Gray,
    /// Three 8-bit samples per pixel (R, G, B).
    Rgb,
}

impl ColorLayout {
    /// Number of samples per pixel for this layout.
    pub fn channels(self) -> usize {
        match self {
            ColorLayout::Gray => 1,
            ColorLayout::Rgb => 3,
        }
    }
}

/// An owned rectangular grid of 8-bit samples, grayscale or RGB.
///
/// Carrier and decoded result each own their buffer exclusively; decode
/// strategies consume a carrier by reference and produce a fresh buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Sample layout (1 or 3 bytes per pixel).
    pub layout: ColorLayout,
    /// Samples in row-major order.
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and sample data.
    pub fn new(width: u32, height: u32, layout: ColorLayout, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * layout.channels(),
            "Sample buffer size mismatch"
        );
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    /// Create a PixelBuffer from a decoded `image::DynamicImage`.
    ///
    /// 8-bit grayscale images stay single-channel; every other color type
    /// is converted to RGB.
    pub fn from_dynamic_image(img: image::DynamicImage) -> Self {
        match img {
            image::DynamicImage::ImageLuma8(gray) => {
                let (width, height) = gray.dimensions();
                Self {
                    width,
                    height,
                    layout: ColorLayout::Gray,
                    data: gray.into_raw(),
                }
            }
            other => {
                let rgb = other.into_rgb8();
                let (width, height) = rgb.dimensions();
                Self {
                    width,
                    height,
                    layout: ColorLayout::Rgb,
                    data: rgb.into_raw(),
                }
            }
        }
    }

    /// Convert to an `image::DynamicImage` for encoding or display.
    pub fn to_dynamic_image(&self) -> Option<image::DynamicImage> {
        match self.layout {
            ColorLayout::Gray => {
                image::GrayImage::from_raw(self.width, self.height, self.data.clone())
                    .map(image::DynamicImage::ImageLuma8)
            }
            ColorLayout::Rgb => {
                image::RgbImage::from_raw(self.width, self.height, self.data.clone())
                    .map(image::DynamicImage::ImageRgb8)
            }
        }
    }

    /// Return an RGB copy of this buffer, expanding grayscale samples.
    pub fn to_rgb(&self) -> PixelBuffer {
        match self.layout {
            ColorLayout::Rgb => self.clone(),
            ColorLayout::Gray => {
                let mut data = Vec::with_capacity(self.data.len() * 3);
                for &v in &self.data {
                    data.extend_from_slice(&[v, v, v]);
                }
                PixelBuffer {
                    width: self.width,
                    height: self.height,
                    layout: ColorLayout::Rgb,
                    data,
                }
            }
        }
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Expected sample count for the dimensions and layout.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.layout.channels()
    }

    /// Check if this is an empty/invalid buffer.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}
