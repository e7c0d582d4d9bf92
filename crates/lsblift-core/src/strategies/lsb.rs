//! LSB decode strategies: simple, per-channel, and smart.
//!
//! All three share one primitive: extract the low `bits` of a sample, shift
//! them to the top of the byte, then refill the vacated low bits by
//! replicating the extracted value MSB-first until the byte is full. The
//! replication fill is part of the wire contract with the encoder — it is
//! what lets an n-bit payload span the full 0-255 range without banding —
//! and must be reproduced bit-exactly.

use crate::error::DecodeError;
use crate::params::{ChannelLsbParams, SimpleLsbParams, SmartLsbParams};
use crate::strategies::ensure_shape;
use crate::{ColorLayout, PixelBuffer};

/// Expand the low `bits` of one sample to a full byte.
///
/// `bits` is clamped to 1-8; at 8 bits the sample passes through unchanged.
#[inline]
pub fn expand_sample(sample: u8, bits: u8) -> u8 {
    let bits = bits.clamp(1, 8);
    if bits == 8 {
        return sample;
    }

    let mask = (1u8 << bits) - 1;
    let extracted = sample & mask;
    let shift = 8 - bits;
    let mut out = extracted << shift;

    // Refill the low `shift` bits with copies of the extracted value,
    // most-significant-bits-first, truncating the last copy to fit.
    let mut remaining = shift;
    while remaining > 0 {
        let take = remaining.min(bits);
        out |= (extracted >> (bits - take)) << (remaining - take);
        remaining -= take;
    }
    out
}

/// 256-entry expansion table for one bit depth.
fn expansion_lut(bits: u8) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, lut_value) in lut.iter_mut().enumerate() {
        *lut_value = expand_sample(i as u8, bits);
    }
    lut
}

/// Decode with a fixed bit depth for every sample.
pub fn decode_simple_lsb(
    carrier: &PixelBuffer,
    params: &SimpleLsbParams,
) -> Result<PixelBuffer, DecodeError> {
    ensure_shape(carrier)?;
    let table = expansion_lut(params.bits);
    let data = carrier
        .data
        .iter()
        .map(|&sample| table[sample as usize])
        .collect();
    Ok(PixelBuffer {
        width: carrier.width,
        height: carrier.height,
        layout: carrier.layout,
        data,
    })
}

/// Decode with independent bit depths per RGB channel.
///
/// The carrier is forced to 3-channel form first; grayscale carriers are
/// expanded. Output is always RGB.
pub fn decode_channel_lsb(
    carrier: &PixelBuffer,
    params: &ChannelLsbParams,
) -> Result<PixelBuffer, DecodeError> {
    ensure_shape(carrier)?;
    let rgb = carrier.to_rgb();
    let tables = [
        expansion_lut(params.channel_bits.r),
        expansion_lut(params.channel_bits.g),
        expansion_lut(params.channel_bits.b),
    ];
    let mut data = Vec::with_capacity(rgb.data.len());
    for chunk in rgb.data.chunks_exact(3) {
        data.push(tables[0][chunk[0] as usize]);
        data.push(tables[1][chunk[1] as usize]);
        data.push(tables[2][chunk[2] as usize]);
    }
    Ok(PixelBuffer {
        width: rgb.width,
        height: rgb.height,
        layout: ColorLayout::Rgb,
        data,
    })
}

/// Decode with one bit depth interpolated from the threshold.
///
/// The whole image uses the single depth from
/// [`SmartLsbParams::effective_bits`]; `edge_protect` is schema-compatible
/// but has no effect on output.
pub fn decode_smart_lsb(
    carrier: &PixelBuffer,
    params: &SmartLsbParams,
) -> Result<PixelBuffer, DecodeError> {
    decode_simple_lsb(
        carrier,
        &SimpleLsbParams {
            bits: params.effective_bits(),
            strength: 1.0,
        },
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating small gray carriers.
    fn carrier_strategy() -> impl Strategy<Value = PixelBuffer> {
        (1u32..=16, 1u32..=16)
            .prop_flat_map(|(w, h)| {
                proptest::collection::vec(any::<u8>(), (w * h) as usize)
                    .prop_map(move |data| PixelBuffer::new(w, h, ColorLayout::Gray, data))
            })
    }

    proptest! {
        /// Property: 8-bit depth reproduces the carrier exactly.
        #[test]
        fn prop_eight_bits_identity(carrier in carrier_strategy()) {
            let params = SimpleLsbParams { bits: 8, strength: 1.0 };
            let out = decode_simple_lsb(&carrier, &params).unwrap();
            prop_assert_eq!(out.data, carrier.data);
        }

        /// Property: the high `bits` of every output sample carry the payload.
        #[test]
        fn prop_high_bits_carry_payload(
            carrier in carrier_strategy(),
            bits in 1u8..=7,
        ) {
            let params = SimpleLsbParams { bits, strength: 1.0 };
            let out = decode_simple_lsb(&carrier, &params).unwrap();
            let mask = (1u8 << bits) - 1;
            for (input, output) in carrier.data.iter().zip(&out.data) {
                prop_assert_eq!(output >> (8 - bits), input & mask);
            }
        }

        /// Property: output shape always equals input shape.
        #[test]
        fn prop_shape_preserved(carrier in carrier_strategy(), bits in 1u8..=8) {
            let params = SimpleLsbParams { bits, strength: 1.0 };
            let out = decode_simple_lsb(&carrier, &params).unwrap();
            prop_assert_eq!(out.width, carrier.width);
            prop_assert_eq!(out.height, carrier.height);
            prop_assert_eq!(out.data.len(), carrier.data.len());
        }
    }
}
