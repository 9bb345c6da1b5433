// src/framer/cobs.rs
//
// COBS framing (cobs crate): every frame is `cobs(payload) || 0x00`.
// Segments between delimiters are decoded independently, so one corrupted
// segment never affects its neighbours.

use super::{DroppedSegment, FrameResult, FramerImpl};
use crate::error::FrameCorruption;

/// Frame delimiter; never appears inside an encoded payload
pub const COBS_DELIMITER: u8 = 0x00;

/// Encoded form of the empty payload: a lone code byte
const EMPTY_FRAME_CODE: u8 = 0x01;

/// Encode a payload and append the delimiter
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    // cobs::encode_vec yields nothing for empty input, which would put a bare
    // delimiter on the wire and read back as an empty segment
    if payload.is_empty() {
        return vec![EMPTY_FRAME_CODE, COBS_DELIMITER];
    }
    let mut frame = Vec::with_capacity(cobs::max_encoding_length(payload.len()) + 1);
    frame.extend(cobs::encode_vec(payload));
    frame.push(COBS_DELIMITER);
    frame
}

fn decode_segment(segment: &[u8]) -> FrameResult {
    cobs::decode_vec(segment).map_err(|_| DroppedSegment {
        reason: FrameCorruption::InvalidCobs { len: segment.len() },
        bytes: segment.to_vec(),
    })
}

pub(super) struct CobsFramer {
    buffer: Vec<u8>,
}

impl CobsFramer {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }
}

impl FramerImpl for CobsFramer {
    fn feed(&mut self, data: &[u8]) -> Vec<FrameResult> {
        // Bytes already buffered hold no delimiter, only the new ones need scanning
        let mut search_from = self.buffer.len();
        self.buffer.extend_from_slice(data);

        let mut results = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[search_from..]
            .iter()
            .position(|&b| b == COBS_DELIMITER)
        {
            let delimiter = search_from + offset;
            let segment = &self.buffer[start..delimiter];
            // Back-to-back delimiters carry nothing; an empty frame encodes as 0x01
            if !segment.is_empty() {
                results.push(decode_segment(segment));
            }
            start = delimiter + 1;
            search_from = start;
        }

        self.buffer.drain(..start);
        results
    }

    fn pending(&self) -> &[u8] {
        &self.buffer
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }
}
