//! Decode strategies.
//!
//! One pure function per mode, each mapping (carrier, parameters) to a fresh
//! decoded buffer:
//!
//! - **Tone remap** (`default`): 256-entry LUT over the tonal range
//! - **Simple LSB**: fixed bit depth for every sample
//! - **Channel LSB**: independent bit depth per RGB channel
//! - **Smart LSB**: one bit depth interpolated from a threshold
//! - **Adaptive**: meta-strategy that defers to a recorded strategy, a guide
//!   hint, or threshold inference, in that order

pub mod adaptive;
pub mod lsb;
pub mod remap;

pub use adaptive::{resolve, run_adaptive, ResolvedStrategy};
pub use lsb::{decode_channel_lsb, decode_simple_lsb, decode_smart_lsb, expand_sample};
pub use remap::{decode_tone_remap, ToneRemapLut};

use crate::error::DecodeError;
use crate::event::{DecodeEvent, EventSink, StrategySource};
use crate::params::DecryptionParams;
use crate::PixelBuffer;

/// Decode a carrier with the given parameter record.
///
/// This is the plain entry point with no observability; use
/// [`run_with_events`] to receive strategy-selection events.
pub fn run(carrier: &PixelBuffer, params: &DecryptionParams) -> Result<PixelBuffer, DecodeError> {
    run_with_events(carrier, params, &())
}

/// Decode a carrier, emitting [`DecodeEvent`]s through `sink`.
pub fn run_with_events(
    carrier: &PixelBuffer,
    params: &DecryptionParams,
    sink: &dyn EventSink,
) -> Result<PixelBuffer, DecodeError> {
    match params {
        DecryptionParams::Adaptive(p) => run_adaptive(carrier, p, sink),
        DecryptionParams::Unknown => Err(DecodeError::UnknownMode),
        concrete => {
            sink.emit(&DecodeEvent::StrategyChosen {
                strategy: concrete.mode(),
                source: StrategySource::Explicit,
            });
            match concrete {
                DecryptionParams::ToneRemap(p) => decode_tone_remap(carrier, p),
                DecryptionParams::SimpleLsb(p) => decode_simple_lsb(carrier, p),
                DecryptionParams::ChannelLsb(p) => decode_channel_lsb(carrier, p),
                DecryptionParams::SmartLsb(p) => decode_smart_lsb(carrier, p),
                DecryptionParams::Adaptive(_) | DecryptionParams::Unknown => unreachable!(),
            }
        }
    }
}

/// Reject buffers whose sample count does not match their dimensions.
pub(crate) fn ensure_shape(buffer: &PixelBuffer) -> Result<(), DecodeError> {
    let expected = buffer.expected_len();
    if buffer.data.len() != expected {
        return Err(DecodeError::BufferShape {
            expected,
            actual: buffer.data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimpleLsbParams;
    use crate::ColorLayout;

    #[test]
    fn test_run_unknown_mode_errors() {
        let carrier = PixelBuffer::new(1, 1, ColorLayout::Gray, vec![0]);
        let result = run(&carrier, &DecryptionParams::Unknown);
        assert!(matches!(result, Err(DecodeError::UnknownMode)));
    }

    #[test]
    fn test_run_dispatches_to_simple_lsb() {
        let carrier = PixelBuffer::new(1, 1, ColorLayout::Gray, vec![0b0000_0011]);
        let params = DecryptionParams::SimpleLsb(SimpleLsbParams {
            bits: 2,
            strength: 1.0,
        });
        let out = run(&carrier, &params).unwrap();
        assert_eq!(out.data, vec![0xFF]);
    }

    #[test]
    fn test_ensure_shape_rejects_mismatch() {
        let broken = PixelBuffer {
            width: 2,
            height: 2,
            layout: ColorLayout::Rgb,
            data: vec![0; 5],
        };
        assert!(matches!(
            ensure_shape(&broken),
            Err(DecodeError::BufferShape {
                expected: 12,
                actual: 5
            })
        ));
    }
}
