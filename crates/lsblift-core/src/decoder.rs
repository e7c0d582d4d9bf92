//! Decode session orchestration.
//!
//! [`Decoder`] owns the carrier, the decoded result, and the metadata
//! captured at load time, and routes parameter records to the matching
//! strategy. One decoder handles one decode session at a time; callers that
//! need concurrency serialize access themselves.

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::error::DecodeError;
use crate::event::{DecodeEvent, EventSink};
use crate::metadata::{normalize, CarrierMetadata};
use crate::params::DecryptionParams;
use crate::strategies;
use crate::PixelBuffer;

/// Lifecycle of a decode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No carrier loaded.
    Empty,
    /// A carrier is loaded and ready to decode.
    Loaded,
    /// The last decode succeeded; a result is available.
    Decoded,
    /// The last decode failed; the carrier is retained for retry.
    Failed,
}

/// A decode session: carrier, result, metadata, and strategy routing.
pub struct Decoder {
    state: DecoderState,
    carrier: Option<PixelBuffer>,
    result: Option<PixelBuffer>,
    metadata: CarrierMetadata,
    sink: Box<dyn EventSink>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("state", &self.state)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl Decoder {
    /// Create an empty decoder with no event sink.
    pub fn new() -> Self {
        Self {
            state: DecoderState::Empty,
            carrier: None,
            result: None,
            metadata: CarrierMetadata::default(),
            sink: Box::new(()),
        }
    }

    /// Install an event sink; replaces any previous sink.
    pub fn set_event_sink(&mut self, sink: impl EventSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Current session state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// The loaded carrier, if any.
    pub fn carrier(&self) -> Option<&PixelBuffer> {
        self.carrier.as_ref()
    }

    /// The decoded result, if the last decode succeeded.
    pub fn result(&self) -> Option<&PixelBuffer> {
        self.result.as_ref()
    }

    /// Metadata captured from the current carrier.
    pub fn metadata(&self) -> &CarrierMetadata {
        &self.metadata
    }

    /// Encoder provenance string from the carrier, for display.
    pub fn software(&self) -> Option<&str> {
        self.metadata.software.as_deref()
    }

    /// Drop the carrier, result, and metadata; back to `Empty`.
    ///
    /// The event sink is kept.
    pub fn reset(&mut self) {
        self.state = DecoderState::Empty;
        self.carrier = None;
        self.result = None;
        self.metadata = CarrierMetadata::default();
    }

    /// Load a carrier image from a file.
    ///
    /// On failure the decoder is reset to `Empty`, even if a carrier was
    /// loaded before.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<&CarrierMetadata, DecodeError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.reset();
                return Err(DecodeError::Load(err.to_string()));
            }
        };
        self.load_bytes(&bytes)
    }

    /// Load a carrier image from raw file bytes.
    ///
    /// Any container the `image` crate recognizes is accepted. PNG carriers
    /// additionally have their textual metadata captured; a parameter blob
    /// that fails to parse degrades to an empty map without failing the
    /// load. Success transitions to `Loaded` and drops any previous result.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&CarrierMetadata, DecodeError> {
        let decoded = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| err.to_string())
            .and_then(|reader| reader.decode().map_err(|err| err.to_string()));
        let img = match decoded {
            Ok(img) => img,
            Err(err) => {
                self.reset();
                return Err(DecodeError::Load(err));
            }
        };

        let carrier = PixelBuffer::from_dynamic_image(img);
        let metadata = CarrierMetadata::from_text_chunks(png_text_chunks(bytes));

        self.sink.emit(&DecodeEvent::CarrierLoaded {
            width: carrier.width,
            height: carrier.height,
            mode: metadata.mode.clone(),
        });

        self.carrier = Some(carrier);
        self.result = None;
        self.metadata = metadata;
        self.state = DecoderState::Loaded;
        Ok(&self.metadata)
    }

    /// Derive decode parameters from the captured metadata.
    ///
    /// Returns `None` when no carrier is loaded or the carrier had no
    /// recognized metadata; the caller then has to supply parameters
    /// manually.
    pub fn auto_detect_params(&self) -> Option<DecryptionParams> {
        if self.state == DecoderState::Empty || self.metadata.is_empty() {
            return None;
        }
        let params = normalize(&self.metadata);
        self.sink.emit(&DecodeEvent::ParamsDetected {
            mode: params.mode(),
        });
        Some(params)
    }

    /// Decode the loaded carrier with the given parameters.
    ///
    /// An `Unknown` mode is reported without touching session state. A
    /// strategy failure transitions to `Failed` but keeps the carrier so
    /// the caller can retry with different parameters.
    pub fn decode(&mut self, params: &DecryptionParams) -> Result<&PixelBuffer, DecodeError> {
        let carrier = self.carrier.as_ref().ok_or(DecodeError::NoCarrier)?;
        if matches!(params, DecryptionParams::Unknown) {
            return Err(DecodeError::UnknownMode);
        }

        match strategies::run_with_events(carrier, params, &*self.sink) {
            Ok(result) => {
                self.state = DecoderState::Decoded;
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                self.state = DecoderState::Failed;
                self.result = None;
                Err(err)
            }
        }
    }
}

/// Collect textual key/value chunks from PNG bytes.
///
/// Returns an empty list for non-PNG containers or unreadable files; the
/// carrier itself is still decodable through the `image` crate in that
/// case. Compressed zTXt chunks are not searched; the compatible encoder
/// writes tEXt/iTXt.
fn png_text_chunks(bytes: &[u8]) -> Vec<(String, String)> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let Ok(reader) = decoder.read_info() else {
        return Vec::new();
    };
    let info = reader.info();

    let mut chunks = Vec::new();
    for chunk in &info.uncompressed_latin1_text {
        chunks.push((chunk.keyword.clone(), chunk.text.clone()));
    }
    for chunk in &info.utf8_text {
        if let Ok(text) = chunk.get_text() {
            chunks.push((chunk.keyword.clone(), text));
        }
    }
    chunks
}
