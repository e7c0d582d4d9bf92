//! Carrier metadata and parameter-schema normalization.
//!
//! Carriers written by the compatible encoder store their decode recipe as
//! textual key/value fields (see [`CarrierMetadata`]). The raw parameter
//! blob has gone through several schema revisions; all knowledge of legacy
//! key spellings lives in the `*_from_raw` migration functions here, one per
//! mode, so the decode strategies only ever see canonical typed parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::params::{
    AdaptiveParams, BitRange, ChannelBits, ChannelLsbParams, DecryptionParams, SimpleLsbParams,
    SmartLsbParams, ToneMode, ToneRemapParams, MODE_ADAPTIVE, MODE_CHANNEL_LSB, MODE_SIMPLE_LSB,
    MODE_SMART_LSB, MODE_TONE_REMAP,
};

/// Embedded text fields captured from a carrier at load time.
///
/// Immutable once captured. All fields stay empty for carriers without
/// recognized embedded keys; nothing is fabricated in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierMetadata {
    /// Mode identifier string, from `Steganography_mode`.
    pub mode: Option<String>,
    /// Mode-specific raw parameter mapping, from `Steganography_parameters`.
    pub parameters: Map<String, Value>,
    /// Free-text provenance, from `Software`. Display only.
    pub software: Option<String>,
}

impl CarrierMetadata {
    /// Text key carrying the mode identifier.
    pub const MODE_KEY: &'static str = "Steganography_mode";
    /// Text key carrying the JSON parameter blob.
    pub const PARAMETERS_KEY: &'static str = "Steganography_parameters";
    /// Text key carrying the encoder provenance string.
    pub const SOFTWARE_KEY: &'static str = "Software";

    /// Build metadata from a carrier's textual key/value chunks.
    ///
    /// Unrecognized keys are ignored. A parameter blob that fails to parse
    /// as a JSON object degrades to an empty map; the mode and software
    /// fields are still captured.
    pub fn from_text_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut meta = CarrierMetadata::default();
        for (key, text) in chunks {
            match key.as_str() {
                Self::MODE_KEY => meta.mode = Some(text),
                Self::PARAMETERS_KEY => {
                    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text) {
                        meta.parameters = map;
                    }
                }
                Self::SOFTWARE_KEY => meta.software = Some(text),
                _ => {}
            }
        }
        meta
    }

    /// True when no recognized field was captured.
    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.parameters.is_empty() && self.software.is_none()
    }
}

/// Normalize captured metadata into a typed parameter record.
///
/// A missing or unrecognized mode yields [`DecryptionParams::Unknown`];
/// callers must treat that as "no usable parameters". Missing fields fall
/// back to their named defaults, so a malformed or empty parameter blob
/// still produces a complete record.
pub fn normalize(meta: &CarrierMetadata) -> DecryptionParams {
    let Some(mode) = meta.mode.as_deref() else {
        return DecryptionParams::Unknown;
    };
    let raw = &meta.parameters;
    match mode {
        MODE_TONE_REMAP => DecryptionParams::ToneRemap(tone_remap_from_raw(raw)),
        MODE_SIMPLE_LSB => DecryptionParams::SimpleLsb(simple_lsb_from_raw(raw)),
        MODE_CHANNEL_LSB => DecryptionParams::ChannelLsb(channel_lsb_from_raw(raw)),
        MODE_SMART_LSB => DecryptionParams::SmartLsb(smart_lsb_from_raw(raw)),
        MODE_ADAPTIVE => DecryptionParams::Adaptive(adaptive_from_raw(raw)),
        _ => DecryptionParams::Unknown,
    }
}

/// Migrate a raw `default`-mode parameter map to typed form.
pub fn tone_remap_from_raw(raw: &Map<String, Value>) -> ToneRemapParams {
    ToneRemapParams {
        mode_type: raw
            .get("mode_type")
            .and_then(Value::as_str)
            .map(ToneMode::from_name)
            .unwrap_or_default(),
        boundary: get_u8(raw, "boundary", 128),
        resolution: get_f32(raw, "resolution", 0.5),
        direction: get_bool(raw, "direction", false),
        brightness: get_u8(raw, "brightness", 55),
    }
}

/// Migrate a raw `simple_lsb` parameter map to typed form.
pub fn simple_lsb_from_raw(raw: &Map<String, Value>) -> SimpleLsbParams {
    SimpleLsbParams {
        bits: get_u8(raw, "bits", 2),
        strength: get_f32(raw, "strength", 1.0),
    }
}

/// Migrate a raw `channel_lsb` parameter map to typed form.
///
/// Current carriers nest the depths under `channel_bits: {R, G, B}`; legacy
/// carriers used flat `r_bits`/`g_bits`/`b_bits` or bare `R`/`G`/`B` keys.
/// The nested form wins when both are present.
pub fn channel_lsb_from_raw(raw: &Map<String, Value>) -> ChannelLsbParams {
    let channel_bits = match raw.get("channel_bits").and_then(Value::as_object) {
        Some(nested) => ChannelBits {
            r: get_u8(nested, "R", 2),
            g: get_u8(nested, "G", 3),
            b: get_u8(nested, "B", 4),
        },
        None => ChannelBits {
            r: first_u8(raw, &["r_bits", "R"], 2),
            g: first_u8(raw, &["g_bits", "G"], 3),
            b: first_u8(raw, &["b_bits", "B"], 4),
        },
    };
    ChannelLsbParams {
        channel_bits,
        quality: get_f32(raw, "quality", 0.8),
    }
}

/// Migrate a raw `smart_lsb` parameter map to typed form.
///
/// Current carriers nest the range under `bit_range: {min, max}`; legacy
/// carriers used flat `min_bits`/`max_bits`. Nested form wins.
pub fn smart_lsb_from_raw(raw: &Map<String, Value>) -> SmartLsbParams {
    let bit_range = match raw.get("bit_range").and_then(Value::as_object) {
        Some(nested) => BitRange {
            min: get_u8(nested, "min", 1),
            max: get_u8(nested, "max", 5),
        },
        None => BitRange {
            min: get_u8(raw, "min_bits", 1),
            max: get_u8(raw, "max_bits", 5),
        },
    };
    SmartLsbParams {
        bit_range,
        threshold: get_f32(raw, "threshold", 0.5),
        edge_protect: get_bool(raw, "edge_protect", true),
    }
}

/// Migrate a raw `adaptive` parameter map to typed form.
pub fn adaptive_from_raw(raw: &Map<String, Value>) -> AdaptiveParams {
    AdaptiveParams {
        threshold: get_f32(raw, "threshold", 0.5),
        selected_strategy: get_string(raw, "selected_strategy"),
        strategy_params: raw
            .get("strategy_params")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        decryption_guide: raw
            .get("decryption_guide")
            .and_then(Value::as_object)
            .cloned(),
        precision: get_string(raw, "precision"),
        priority: get_string(raw, "priority"),
        version: get_string(raw, "version"),
    }
}

// ============================================================================
// Raw Value Access
// ============================================================================

// Encoders disagree on number representation (2 vs 2.0), so integer reads
// accept both.
fn value_as_u8(value: &Value) -> Option<u8> {
    if let Some(n) = value.as_u64() {
        return Some(n.min(255) as u8);
    }
    value.as_f64().map(|f| f.clamp(0.0, 255.0).round() as u8)
}

fn get_u8(map: &Map<String, Value>, key: &str, default: u8) -> u8 {
    map.get(key).and_then(value_as_u8).unwrap_or(default)
}

fn first_u8(map: &Map<String, Value>, keys: &[&str], default: u8) -> u8 {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(value_as_u8))
        .unwrap_or(default)
}

fn get_f32(map: &Map<String, Value>, key: &str, default: f32) -> f32 {
    map.get(key)
        .and_then(Value::as_f64)
        .map(|f| f as f32)
        .unwrap_or(default)
}

fn get_bool(map: &Map<String, Value>, key: &str, default: bool) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test parameter blob must be an object"),
        }
    }

    #[test]
    fn test_normalize_without_mode_is_unknown() {
        let meta = CarrierMetadata::default();
        assert_eq!(normalize(&meta), DecryptionParams::Unknown);
    }

    #[test]
    fn test_normalize_unrecognized_mode_is_unknown() {
        let meta = CarrierMetadata {
            mode: Some("quantum_lsb".into()),
            ..Default::default()
        };
        assert_eq!(normalize(&meta), DecryptionParams::Unknown);
    }

    #[test]
    fn test_normalize_applies_defaults_for_empty_blob() {
        let meta = CarrierMetadata {
            mode: Some("simple_lsb".into()),
            ..Default::default()
        };
        assert_eq!(
            normalize(&meta),
            DecryptionParams::SimpleLsb(SimpleLsbParams::default())
        );
    }

    #[test]
    fn test_tone_remap_fields() {
        let params = tone_remap_from_raw(&raw(json!({
            "mode_type": "dark",
            "boundary": 64,
            "brightness": 20,
        })));
        assert_eq!(params.mode_type, ToneMode::Dark);
        assert_eq!(params.boundary, 64);
        assert_eq!(params.brightness, 20);
        // Untouched fields keep their defaults
        assert_eq!(params.resolution, 0.5);
        assert!(!params.direction);
    }

    #[test]
    fn test_channel_lsb_legacy_flat_keys_equal_nested() {
        let legacy = channel_lsb_from_raw(&raw(json!({
            "r_bits": 2, "g_bits": 3, "b_bits": 4,
        })));
        let nested = channel_lsb_from_raw(&raw(json!({
            "channel_bits": {"R": 2, "G": 3, "B": 4},
        })));
        assert_eq!(legacy, nested);
    }

    #[test]
    fn test_channel_lsb_bare_letter_keys() {
        let params = channel_lsb_from_raw(&raw(json!({"R": 5, "G": 6, "B": 7})));
        assert_eq!(params.channel_bits, ChannelBits { r: 5, g: 6, b: 7 });
    }

    #[test]
    fn test_channel_lsb_nested_takes_precedence() {
        let params = channel_lsb_from_raw(&raw(json!({
            "channel_bits": {"R": 1, "G": 1, "B": 1},
            "r_bits": 8, "g_bits": 8, "b_bits": 8,
        })));
        assert_eq!(params.channel_bits, ChannelBits { r: 1, g: 1, b: 1 });
    }

    #[test]
    fn test_smart_lsb_legacy_flat_keys_equal_nested() {
        let legacy = smart_lsb_from_raw(&raw(json!({"min_bits": 2, "max_bits": 6})));
        let nested = smart_lsb_from_raw(&raw(json!({"bit_range": {"min": 2, "max": 6}})));
        assert_eq!(legacy, nested);
    }

    #[test]
    fn test_smart_lsb_nested_takes_precedence() {
        let params = smart_lsb_from_raw(&raw(json!({
            "bit_range": {"min": 2, "max": 4},
            "min_bits": 1, "max_bits": 8,
        })));
        assert_eq!(params.bit_range, BitRange { min: 2, max: 4 });
    }

    #[test]
    fn test_adaptive_captures_strategy_info() {
        let params = adaptive_from_raw(&raw(json!({
            "threshold": 0.4,
            "selected_strategy": "channel_lsb",
            "strategy_params": {"channel_bits": {"R": 1, "G": 2, "B": 3}},
            "version": "3.0",
        })));
        assert_eq!(params.threshold, 0.4);
        assert_eq!(params.selected_strategy.as_deref(), Some("channel_lsb"));
        assert!(params.strategy_params.contains_key("channel_bits"));
        assert_eq!(params.version.as_deref(), Some("3.0"));
        assert!(params.decryption_guide.is_none());
    }

    #[test]
    fn test_numbers_accepted_as_floats() {
        // Some encoders serialize integers as 3.0
        let params = simple_lsb_from_raw(&raw(json!({"bits": 3.0})));
        assert_eq!(params.bits, 3);
    }

    #[test]
    fn test_text_chunks_capture() {
        let meta = CarrierMetadata::from_text_chunks(vec![
            ("Steganography_mode".to_string(), "smart_lsb".to_string()),
            (
                "Steganography_parameters".to_string(),
                r#"{"bit_range": {"min": 1, "max": 5}, "threshold": 0.7}"#.to_string(),
            ),
            ("Software".to_string(), "Lsblift 0.1".to_string()),
            ("Comment".to_string(), "ignored".to_string()),
        ]);
        assert_eq!(meta.mode.as_deref(), Some("smart_lsb"));
        assert_eq!(meta.software.as_deref(), Some("Lsblift 0.1"));
        assert!(meta.parameters.contains_key("bit_range"));
    }

    #[test]
    fn test_malformed_parameter_json_degrades_to_empty() {
        let meta = CarrierMetadata::from_text_chunks(vec![
            ("Steganography_mode".to_string(), "simple_lsb".to_string()),
            (
                "Steganography_parameters".to_string(),
                "{not valid json".to_string(),
            ),
        ]);
        // Mode is still captured, parameters degrade to empty
        assert_eq!(meta.mode.as_deref(), Some("simple_lsb"));
        assert!(meta.parameters.is_empty());
        // Normalization then fills every field from defaults
        assert_eq!(
            normalize(&meta),
            DecryptionParams::SimpleLsb(SimpleLsbParams::default())
        );
    }

    #[test]
    fn test_metadata_is_empty() {
        assert!(CarrierMetadata::default().is_empty());
        let meta = CarrierMetadata::from_text_chunks(vec![(
            "Software".to_string(),
            "somewhere".to_string(),
        )]);
        assert!(!meta.is_empty());
    }
}
