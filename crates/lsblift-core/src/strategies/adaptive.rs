//! Adaptive meta-strategy dispatch.
//!
//! Adaptive carriers record *how they were encoded* with varying levels of
//! detail depending on encoder version. Resolution order, first match wins:
//!
//! 1. An explicit `selected_strategy` with non-empty `strategy_params`
//! 2. A `decryption_guide` hint naming a strategy (defaults supplied)
//! 3. Inference from the recorded threshold via fixed buckets
//!
//! An unrecognized strategy name or a failing strategy invocation triggers
//! exactly one fallback attempt with default `simple_lsb` parameters; a
//! second failure is surfaced to the caller.

use serde_json::Value;

use crate::error::DecodeError;
use crate::event::{DecodeEvent, EventSink, StrategySource};
use crate::metadata::{channel_lsb_from_raw, simple_lsb_from_raw, smart_lsb_from_raw};
use crate::params::{
    default_strategy_params, AdaptiveParams, BitRange, ChannelLsbParams, SimpleLsbParams,
    SmartLsbParams, MODE_CHANNEL_LSB, MODE_SIMPLE_LSB, MODE_SMART_LSB,
};
use crate::strategies::lsb::{decode_channel_lsb, decode_simple_lsb, decode_smart_lsb};
use crate::PixelBuffer;

/// A concrete strategy the dispatcher settled on.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStrategy {
    /// Fixed-depth LSB with the given parameters.
    Simple(SimpleLsbParams),
    /// Per-channel LSB with the given parameters.
    Channel(ChannelLsbParams),
    /// Threshold-interpolated LSB with the given parameters.
    Smart(SmartLsbParams),
}

impl ResolvedStrategy {
    /// Wire-format identifier of the resolved strategy.
    pub fn name(&self) -> &'static str {
        match self {
            ResolvedStrategy::Simple(_) => MODE_SIMPLE_LSB,
            ResolvedStrategy::Channel(_) => MODE_CHANNEL_LSB,
            ResolvedStrategy::Smart(_) => MODE_SMART_LSB,
        }
    }
}

/// Resolve the concrete strategy for an adaptive parameter record.
///
/// Returns the strategy plus how it was determined, or the offending name
/// when an explicit or guide-supplied strategy is unrecognized.
pub fn resolve(params: &AdaptiveParams) -> Result<(ResolvedStrategy, StrategySource), String> {
    // 1. Explicit strategy with parameters, as current encoders record it.
    if let Some(name) = params.selected_strategy.as_deref() {
        if !params.strategy_params.is_empty() {
            return match typed_from_raw(name, &params.strategy_params) {
                Some(strategy) => Ok((strategy, StrategySource::Explicit)),
                None => Err(name.to_string()),
            };
        }
    }

    // 2. Decryption-guide hint from older carriers; parameters come from
    //    the canonical defaults table.
    if let Some(name) = params
        .decryption_guide
        .as_ref()
        .and_then(|guide| guide.get("strategy"))
        .and_then(Value::as_str)
    {
        let defaults = default_strategy_params(name);
        return match typed_from_raw(name, &defaults) {
            Some(strategy) => Ok((strategy, StrategySource::Guide)),
            None => Err(name.to_string()),
        };
    }

    // 3. Threshold buckets, for carriers that recorded nothing else.
    let t = params.threshold;
    let inferred = if t < 0.3 {
        ResolvedStrategy::Simple(SimpleLsbParams::default())
    } else if t < 0.7 {
        ResolvedStrategy::Channel(ChannelLsbParams::default())
    } else {
        ResolvedStrategy::Smart(SmartLsbParams {
            bit_range: BitRange { min: 1, max: 5 },
            threshold: t,
            edge_protect: true,
        })
    };
    Ok((inferred, StrategySource::Threshold))
}

fn typed_from_raw(
    name: &str,
    raw: &serde_json::Map<String, Value>,
) -> Option<ResolvedStrategy> {
    match name {
        MODE_SIMPLE_LSB => Some(ResolvedStrategy::Simple(simple_lsb_from_raw(raw))),
        MODE_CHANNEL_LSB => Some(ResolvedStrategy::Channel(channel_lsb_from_raw(raw))),
        MODE_SMART_LSB => Some(ResolvedStrategy::Smart(smart_lsb_from_raw(raw))),
        _ => None,
    }
}

fn dispatch(
    carrier: &PixelBuffer,
    strategy: &ResolvedStrategy,
) -> Result<PixelBuffer, DecodeError> {
    match strategy {
        ResolvedStrategy::Simple(p) => decode_simple_lsb(carrier, p),
        ResolvedStrategy::Channel(p) => decode_channel_lsb(carrier, p),
        ResolvedStrategy::Smart(p) => decode_smart_lsb(carrier, p),
    }
}

/// Run the adaptive meta-strategy against a carrier.
///
/// Emits `StrategyChosen` once resolution succeeds and `FallbackTriggered`
/// if the one-shot `simple_lsb` retry is taken.
pub fn run_adaptive(
    carrier: &PixelBuffer,
    params: &AdaptiveParams,
    sink: &dyn EventSink,
) -> Result<PixelBuffer, DecodeError> {
    let attempt = match resolve(params) {
        Ok((strategy, source)) => {
            sink.emit(&DecodeEvent::StrategyChosen {
                strategy: strategy.name(),
                source,
            });
            dispatch(carrier, &strategy)
        }
        Err(name) => Err(DecodeError::Strategy(format!(
            "unrecognized strategy '{name}'"
        ))),
    };

    match attempt {
        Ok(decoded) => Ok(decoded),
        Err(err) => {
            // One retry with the default strategy; this fallback is final.
            sink.emit(&DecodeEvent::FallbackTriggered {
                reason: err.to_string(),
            });
            decode_simple_lsb(carrier, &SimpleLsbParams::default())
        }
    }
}
