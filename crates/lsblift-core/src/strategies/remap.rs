//! Tone-remap decode strategy (`default` mode).
//!
//! The encoder compresses the payload into one end of the tonal range and
//! parks the cover tones at the other; decoding stretches the payload range
//! back to full 0-255 through a per-sample lookup table. Stateless and
//! purely per-pixel.

use crate::error::DecodeError;
use crate::params::{ToneMode, ToneRemapParams};
use crate::strategies::ensure_shape;
use crate::PixelBuffer;

/// Pre-computed 256-entry lookup table for the tone remap.
#[derive(Debug, Clone)]
pub struct ToneRemapLut {
    /// LUT values: lut[input] = output
    pub lut: [u8; 256],
}

impl ToneRemapLut {
    /// Build the LUT for a parameter set.
    ///
    /// Dark mode stretches `[0, k]` to `[0, 255]` and pins everything above
    /// the boundary at `k`. Light mode pins everything below the boundary at
    /// the brightness level `l` and stretches `[k, 255]` to `[0, 255]`.
    pub fn build(params: &ToneRemapParams) -> Self {
        let k = params.boundary;
        let l = params.brightness;
        let mut lut = [0u8; 256];

        for (x, lut_value) in lut.iter_mut().enumerate() {
            let x = x as u32;
            *lut_value = match params.mode_type {
                ToneMode::Dark => {
                    if x <= u32::from(k) {
                        if k > 0 {
                            (x as f32 * 255.0 / f32::from(k)).round().min(255.0) as u8
                        } else {
                            0
                        }
                    } else {
                        k
                    }
                }
                ToneMode::Light => {
                    if x < u32::from(k) {
                        l
                    } else if k < 255 {
                        ((x as f32 - f32::from(k)) * 255.0 / (255.0 - f32::from(k)))
                            .round()
                            .min(255.0) as u8
                    } else {
                        255
                    }
                }
            };
        }

        Self { lut }
    }
}

/// Decode with the tone-remap strategy.
///
/// The LUT is applied to every sample independently, so grayscale and RGB
/// carriers go through the same path; output shape equals input shape.
pub fn decode_tone_remap(
    carrier: &PixelBuffer,
    params: &ToneRemapParams,
) -> Result<PixelBuffer, DecodeError> {
    ensure_shape(carrier)?;
    let table = ToneRemapLut::build(params);
    let data = carrier
        .data
        .iter()
        .map(|&sample| table.lut[sample as usize])
        .collect();
    Ok(PixelBuffer {
        width: carrier.width,
        height: carrier.height,
        layout: carrier.layout,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColorLayout;

    fn light_params(boundary: u8, brightness: u8) -> ToneRemapParams {
        ToneRemapParams {
            mode_type: ToneMode::Light,
            boundary,
            brightness,
            ..Default::default()
        }
    }

    fn dark_params(boundary: u8) -> ToneRemapParams {
        ToneRemapParams {
            mode_type: ToneMode::Dark,
            boundary,
            ..Default::default()
        }
    }

    #[test]
    fn test_light_lut_structure() {
        let table = ToneRemapLut::build(&light_params(128, 55));

        // Below the boundary everything sits at the brightness level
        for x in 0..128 {
            assert_eq!(table.lut[x], 55, "LUT[{x}]");
        }
        // The payload range stretches from 0 to 255 and never decreases
        assert_eq!(table.lut[128], 0);
        assert_eq!(table.lut[255], 255);
        for x in 129..=255 {
            assert!(
                table.lut[x] > table.lut[x - 1],
                "LUT not strictly increasing at {x}"
            );
        }
    }

    #[test]
    fn test_dark_lut_structure() {
        let table = ToneRemapLut::build(&dark_params(128));

        assert_eq!(table.lut[0], 0);
        assert_eq!(table.lut[128], 255);
        for x in 1..=128 {
            assert!(table.lut[x] >= table.lut[x - 1]);
        }
        // Above the boundary everything pins at k
        for x in 129..=255 {
            assert_eq!(table.lut[x], 128, "LUT[{x}]");
        }
    }

    #[test]
    fn test_dark_zero_boundary_is_all_zero() {
        let table = ToneRemapLut::build(&dark_params(0));
        assert!(table.lut.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_light_full_boundary() {
        let table = ToneRemapLut::build(&light_params(255, 10));
        for x in 0..255 {
            assert_eq!(table.lut[x], 10);
        }
        assert_eq!(table.lut[255], 255);
    }

    #[test]
    fn test_light_zero_boundary_is_identity() {
        // k = 0 leaves no suppressed range; the stretch maps x to itself
        let table = ToneRemapLut::build(&light_params(0, 99));
        for x in 0..=255usize {
            assert_eq!(table.lut[x], x as u8);
        }
    }

    #[test]
    fn test_decode_preserves_shape() {
        let carrier = PixelBuffer::new(2, 1, ColorLayout::Rgb, vec![0, 100, 200, 255, 128, 64]);
        let out = decode_tone_remap(&carrier, &light_params(128, 55)).unwrap();
        assert_eq!(out.width, 2);
        assert_eq!(out.height, 1);
        assert_eq!(out.layout, ColorLayout::Rgb);
        assert_eq!(out.data.len(), 6);
    }

    #[test]
    fn test_decode_grayscale_applies_once_per_sample() {
        let carrier = PixelBuffer::new(3, 1, ColorLayout::Gray, vec![0, 127, 255]);
        let out = decode_tone_remap(&carrier, &light_params(128, 55)).unwrap();
        assert_eq!(out.data, vec![55, 55, 255]);
    }

    #[test]
    fn test_decode_rejects_malformed_buffer() {
        let broken = PixelBuffer {
            width: 2,
            height: 2,
            layout: ColorLayout::Gray,
            data: vec![0; 3],
        };
        assert!(decode_tone_remap(&broken, &light_params(128, 55)).is_err());
    }
}
