//! Structured decode events.
//!
//! The orchestrator and the adaptive dispatcher emit events at defined
//! points; transport (stdout, a log sink, a UI status bar) is entirely the
//! caller's concern. The core never prints.

/// How the adaptive dispatcher (or the orchestrator) settled on a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategySource {
    /// The strategy was named explicitly, with parameters.
    Explicit,
    /// Taken from the carrier's decryption-guide hint.
    Guide,
    /// Inferred from the adaptive threshold buckets.
    Threshold,
}

/// An observability event emitted during a decode session.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    /// A carrier finished loading.
    CarrierLoaded {
        /// Carrier width in pixels.
        width: u32,
        /// Carrier height in pixels.
        height: u32,
        /// Mode string captured from embedded metadata, if any.
        mode: Option<String>,
    },
    /// Parameters were auto-detected from carrier metadata.
    ParamsDetected {
        /// Normalized mode identifier.
        mode: &'static str,
    },
    /// A concrete strategy was selected for execution.
    StrategyChosen {
        /// Strategy mode identifier.
        strategy: &'static str,
        /// How the strategy was determined.
        source: StrategySource,
    },
    /// The one-shot fallback to `simple_lsb` was taken.
    FallbackTriggered {
        /// What forced the fallback.
        reason: String,
    },
}

/// Receiver for [`DecodeEvent`]s.
///
/// Implemented for closures, so callers can pass `|e| println!("{e:?}")` or
/// wire events into their own logging. The unit type is the no-op sink.
pub trait EventSink {
    /// Handle one event. Must not panic.
    fn emit(&self, event: &DecodeEvent);
}

impl EventSink for () {
    fn emit(&self, _event: &DecodeEvent) {}
}

impl<F: Fn(&DecodeEvent)> EventSink for F {
    fn emit(&self, event: &DecodeEvent) {
        self(event)
    }
}
