// src/framer/mod.rs
//
// Stream framing: recover message boundaries from a boundary-less byte
// stream, and encode outgoing messages so the remote framer can do the same.
//
// Two encodings are provided:
// - COBS: payloads are byte-stuffed so 0x00 never appears inside them and
//   can delimit frames unambiguously
// - Pattern: `<length><payload><pattern>` with a caller-chosen multi-byte
//   boundary pattern and a big-endian length prefix to catch false boundaries

use serde::{Deserialize, Serialize};

use crate::error::{FrameCorruption, Result, SerialError};

pub mod codec;
pub mod cobs;
pub mod pattern;

pub use codec::{FrameCodec, FrameStatsSnapshot};

fn default_length_bytes() -> u8 {
    pattern::DEFAULT_LENGTH_BYTES
}

fn default_rejoin() -> bool {
    false
}

// =============================================================================
// Types
// =============================================================================

/// Framing encoding types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FramingEncoding {
    /// COBS byte stuffing with a 0x00 delimiter
    Cobs,
    /// Length prefix plus boundary pattern
    Pattern {
        /// Boundary pattern (hex string in config files)
        #[serde(with = "hex::serde")]
        pattern: Vec<u8>,
        /// Width of the big-endian length prefix: 1, 2 or 4 bytes
        #[serde(default = "default_length_bytes")]
        length_bytes: u8,
        /// Accept frames whose payload contains the boundary pattern.
        ///
        /// Off by default. When on, a segment whose length field declares more
        /// bytes than it carries is held until that many bytes have arrived, so
        /// a corrupted header can stall delivery of later frames on a quiet link.
        #[serde(default = "default_rejoin")]
        rejoin: bool,
    },
}

impl Default for FramingEncoding {
    fn default() -> Self {
        FramingEncoding::Cobs
    }
}

impl FramingEncoding {
    /// Pattern framing with a 2-byte length prefix; mismatched segments are
    /// dropped and parsing continues at the next boundary
    pub fn pattern(pattern: impl Into<Vec<u8>>) -> Self {
        FramingEncoding::Pattern {
            pattern: pattern.into(),
            length_bytes: default_length_bytes(),
            rejoin: default_rejoin(),
        }
    }

    /// Pattern framing that lets payloads contain the pattern (see `rejoin`)
    pub fn pattern_rejoining(pattern: impl Into<Vec<u8>>) -> Self {
        FramingEncoding::Pattern {
            pattern: pattern.into(),
            length_bytes: default_length_bytes(),
            rejoin: true,
        }
    }

    /// Short name used in log prefixes
    pub fn name(&self) -> &'static str {
        match self {
            FramingEncoding::Cobs => "cobs",
            FramingEncoding::Pattern { .. } => "pattern",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FramingEncoding::Cobs => Ok(()),
            FramingEncoding::Pattern {
                pattern,
                length_bytes,
                ..
            } => {
                if pattern.is_empty() {
                    return Err(SerialError::Config("boundary pattern is empty".to_string()));
                }
                if !matches!(length_bytes, 1 | 2 | 4) {
                    return Err(SerialError::Config(format!(
                        "length field must be 1, 2 or 4 bytes, got {}",
                        length_bytes
                    )));
                }
                Ok(())
            }
        }
    }

    /// Largest payload a single frame can carry, if bounded
    pub fn max_payload_len(&self) -> Option<usize> {
        match self {
            FramingEncoding::Cobs => None,
            FramingEncoding::Pattern { length_bytes, .. } => {
                Some(pattern::max_payload_len(*length_bytes as usize))
            }
        }
    }

    /// Encode one payload into its on-wire form, delimiter included
    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        match self {
            FramingEncoding::Cobs => Ok(cobs::encode_frame(payload)),
            FramingEncoding::Pattern {
                pattern,
                length_bytes,
                ..
            } => pattern::encode_frame(payload, pattern, *length_bytes as usize),
        }
    }
}

/// A stream segment the framer had to throw away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedSegment {
    pub reason: FrameCorruption,
    /// Raw segment bytes, delimiter excluded
    pub bytes: Vec<u8>,
}

/// One framer output: a complete frame, or a segment dropped as corrupt
pub type FrameResult = std::result::Result<Vec<u8>, DroppedSegment>;

// =============================================================================
// Internal Framer Trait
// =============================================================================

trait FramerImpl {
    /// Append `data` to the accumulator and pull out every complete segment.
    fn feed(&mut self, data: &[u8]) -> Vec<FrameResult>;
    /// Unconsumed bytes after the last recognised boundary.
    fn pending(&self) -> &[u8];
    fn reset(&mut self);
}

// =============================================================================
// Public Framer
// =============================================================================

/// Stateful decoder for one incoming stream.
///
/// Holds the accumulator for the selected encoding. Frames come out in
/// stream order and are independent of how the stream was chunked.
pub struct Framer {
    framer: Box<dyn FramerImpl + Send + Sync>,
}

impl Framer {
    /// Create a framer for the specified encoding
    pub fn new(encoding: &FramingEncoding) -> Result<Self> {
        encoding.validate()?;
        let framer: Box<dyn FramerImpl + Send + Sync> = match encoding {
            FramingEncoding::Cobs => Box::new(cobs::CobsFramer::new()),
            FramingEncoding::Pattern {
                pattern,
                length_bytes,
                rejoin,
            } => Box::new(pattern::PatternFramer::new(
                pattern.clone(),
                *length_bytes as usize,
                *rejoin,
            )),
        };
        Ok(Framer { framer })
    }

    /// COBS framer; it has no parameters to validate
    pub fn cobs() -> Self {
        Framer {
            framer: Box::new(cobs::CobsFramer::new()),
        }
    }

    /// Feed raw bytes into the framer.
    /// Returns every frame completed by these bytes, plus any segment that
    /// had to be dropped, in stream order.
    pub fn feed(&mut self, data: &[u8]) -> Vec<FrameResult> {
        self.framer.feed(data)
    }

    /// Bytes held back waiting for the next boundary
    pub fn pending(&self) -> &[u8] {
        self.framer.pending()
    }

    /// Forget any partially received frame
    pub fn reset(&mut self) {
        self.framer.reset()
    }
}
