// src/error.rs
//
// Error types for serial links and framing.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to callers of transports, managers and frame codecs.
///
/// Variants carry strings rather than source errors so a fault recorded by a
/// worker thread can be handed to every later caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerialError {
    /// The transport could not be opened.
    #[error("Transport {port} unavailable: {reason}")]
    TransportUnavailable { port: String, reason: String },

    /// The transport failed mid-session.
    #[error("Transport I/O error: {0}")]
    TransportIo(String),

    /// A blocking transport operation did not complete in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The transport is closed.
    #[error("Transport {0} is closed")]
    Closed(String),

    /// The payload cannot be expressed by the frame's length field.
    #[error("Payload of {len} bytes exceeds the {max} byte frame limit")]
    PayloadTooLong { len: usize, max: usize },

    /// Invalid link configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<std::io::Error> for SerialError {
    fn from(e: std::io::Error) -> Self {
        SerialError::TransportIo(e.to_string())
    }
}

/// Result type alias using SerialError.
pub type Result<T> = std::result::Result<T, SerialError>;

/// A segment of the stream that could not be turned into a frame.
///
/// Never returned to callers: the codec logs it, counts it and carries on at
/// the next boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameCorruption {
    #[error("invalid COBS encoding in {len} byte segment")]
    InvalidCobs { len: usize },

    #[error("declared length {declared} does not match {actual} byte body")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("{len} byte segment is shorter than the {width} byte length field")]
    TruncatedHeader { len: usize, width: usize },
}
