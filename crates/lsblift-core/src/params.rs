//! Decode strategy parameters.
//!
//! Every strategy gets its own parameter struct, and [`DecryptionParams`]
//! closes them into a tagged union so dispatch sites can match exhaustively.
//! Several fields (`strength`, `quality`, `resolution`, `direction`,
//! `edge_protect`, and the adaptive provenance strings) are carried for
//! schema compatibility with existing carriers but never influence decode
//! output.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Mode identifier for the tone-remap strategy.
pub const MODE_TONE_REMAP: &str = "default";
/// Mode identifier for the fixed-bit-depth LSB strategy.
pub const MODE_SIMPLE_LSB: &str = "simple_lsb";
/// Mode identifier for the per-channel LSB strategy.
pub const MODE_CHANNEL_LSB: &str = "channel_lsb";
/// Mode identifier for the threshold-interpolated LSB strategy.
pub const MODE_SMART_LSB: &str = "smart_lsb";
/// Mode identifier for the adaptive meta-strategy.
pub const MODE_ADAPTIVE: &str = "adaptive";

/// Tone-remap direction: which end of the range carries the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneMode {
    /// Payload occupies the range above the boundary.
    #[default]
    Light,
    /// Payload occupies the range below the boundary.
    Dark,
}

impl ToneMode {
    /// Parse a mode-type string; anything other than `"dark"` is light.
    pub fn from_name(name: &str) -> Self {
        if name == "dark" {
            ToneMode::Dark
        } else {
            ToneMode::Light
        }
    }
}

/// Parameters for the tone-remap strategy (`default` mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneRemapParams {
    /// Light or dark remap direction.
    pub mode_type: ToneMode,
    /// Tone boundary k (0-255).
    pub boundary: u8,
    /// Carried for schema compatibility (0.5 or 0.75); unused by decode.
    pub resolution: f32,
    /// Carried for schema compatibility; unused by decode.
    pub direction: bool,
    /// Fill level l for the suppressed range (0-255).
    pub brightness: u8,
}

impl Default for ToneRemapParams {
    fn default() -> Self {
        Self {
            mode_type: ToneMode::Light,
            boundary: 128,
            resolution: 0.5,
            direction: false,
            brightness: 55,
        }
    }
}

/// Parameters for the fixed-bit-depth LSB strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleLsbParams {
    /// Payload bit depth (clamped to 1-8 at decode time).
    pub bits: u8,
    /// Carried for schema compatibility; unused by decode.
    pub strength: f32,
}

impl Default for SimpleLsbParams {
    fn default() -> Self {
        Self {
            bits: 2,
            strength: 1.0,
        }
    }
}

/// Independent payload bit depths per RGB channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBits {
    /// Red channel bit depth (clamped to 1-8 at decode time).
    pub r: u8,
    /// Green channel bit depth (clamped to 1-8 at decode time).
    pub g: u8,
    /// Blue channel bit depth (clamped to 1-8 at decode time).
    pub b: u8,
}

impl Default for ChannelBits {
    fn default() -> Self {
        Self { r: 2, g: 3, b: 4 }
    }
}

/// Parameters for the per-channel LSB strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLsbParams {
    /// Per-channel payload bit depths.
    pub channel_bits: ChannelBits,
    /// Carried for schema compatibility; unused by decode.
    pub quality: f32,
}

impl Default for ChannelLsbParams {
    fn default() -> Self {
        Self {
            channel_bits: ChannelBits::default(),
            quality: 0.8,
        }
    }
}

/// Bit-depth range for the threshold-interpolated LSB strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRange {
    /// Lower bound (clamped to 1-3 at decode time).
    pub min: u8,
    /// Upper bound (clamped to 3-8 at decode time).
    pub max: u8,
}

impl Default for BitRange {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

/// Parameters for the threshold-interpolated LSB strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartLsbParams {
    /// Bit-depth interpolation range.
    pub bit_range: BitRange,
    /// Interpolation position (0-1).
    pub threshold: f32,
    /// Carried for schema compatibility; unused by decode.
    pub edge_protect: bool,
}

impl Default for SmartLsbParams {
    fn default() -> Self {
        Self {
            bit_range: BitRange::default(),
            threshold: 0.5,
            edge_protect: true,
        }
    }
}

impl SmartLsbParams {
    /// Compute the single effective bit depth for the whole image.
    ///
    /// Linear interpolation between the clamped range bounds, rounded, then
    /// clamped back into the range. This must match the compatible encoder's
    /// computation exactly.
    pub fn effective_bits(&self) -> u8 {
        let min = self.bit_range.min.clamp(1, 3);
        let max = self.bit_range.max.clamp(3, 8);
        let t = self.threshold.clamp(0.0, 1.0);
        // min <= 3 <= max after clamping, so the subtraction cannot wrap.
        let avg = (f32::from(min) + f32::from(max - min) * t).round() as u8;
        avg.clamp(min, max)
    }
}

/// Parameters for the adaptive meta-strategy.
///
/// `selected_strategy` and `strategy_params` are what a current encoder
/// records; `decryption_guide` and the bare `threshold` exist for carriers
/// written by older encoder versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveParams {
    /// Strategy-inference threshold (0-1).
    pub threshold: f32,
    /// Concrete strategy recorded by the encoder, if any.
    pub selected_strategy: Option<String>,
    /// Raw parameter map for the selected strategy.
    pub strategy_params: Map<String, Value>,
    /// Legacy hint mapping with its own `strategy` field.
    pub decryption_guide: Option<Map<String, Value>>,
    /// Informational only; never read by decode.
    pub precision: Option<String>,
    /// Informational only; never read by decode.
    pub priority: Option<String>,
    /// Informational only; never read by decode.
    pub version: Option<String>,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            selected_strategy: None,
            strategy_params: Map::new(),
            decryption_guide: None,
            precision: None,
            priority: None,
            version: None,
        }
    }
}

/// A fully-resolved parameter record, tagged by mode.
///
/// Exactly one variant is active per instance; consumers match exhaustively
/// and never look at fields of another variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecryptionParams {
    /// Tone-remap strategy (`default` mode).
    ToneRemap(ToneRemapParams),
    /// Fixed-bit-depth LSB.
    SimpleLsb(SimpleLsbParams),
    /// Per-channel LSB.
    ChannelLsb(ChannelLsbParams),
    /// Threshold-interpolated LSB.
    SmartLsb(SmartLsbParams),
    /// Adaptive meta-strategy.
    Adaptive(AdaptiveParams),
    /// No usable parameters (mode missing or unrecognized).
    Unknown,
}

impl DecryptionParams {
    /// The wire-format mode identifier for this record.
    pub fn mode(&self) -> &'static str {
        match self {
            DecryptionParams::ToneRemap(_) => MODE_TONE_REMAP,
            DecryptionParams::SimpleLsb(_) => MODE_SIMPLE_LSB,
            DecryptionParams::ChannelLsb(_) => MODE_CHANNEL_LSB,
            DecryptionParams::SmartLsb(_) => MODE_SMART_LSB,
            DecryptionParams::Adaptive(_) => MODE_ADAPTIVE,
            DecryptionParams::Unknown => "unknown",
        }
    }
}

/// Canonical default raw parameters for a concrete strategy.
///
/// Used whenever a selected strategy is known but its parameters are
/// missing, and for UI pre-fill. Unrecognized names fall back to the
/// `simple_lsb` set.
pub fn default_strategy_params(name: &str) -> Map<String, Value> {
    let value = match name {
        MODE_CHANNEL_LSB => json!({
            "channel_bits": {"R": 2, "G": 3, "B": 4},
            "quality": 0.8,
        }),
        MODE_SMART_LSB => json!({
            "bit_range": {"min": 1, "max": 5},
            "threshold": 0.5,
            "edge_protect": true,
        }),
        _ => json!({"bits": 2, "strength": 1.0}),
    };
    match value {
        Value::Object(map) => map,
        _ => unreachable!("default parameter sets are objects"),
    }
}
