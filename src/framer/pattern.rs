// src/framer/pattern.rs
//
// Length-prefixed framing with a boundary pattern:
//
//   <length, big-endian, 1/2/4 bytes><payload><pattern>
//
// The pattern marks candidate boundaries; the length prefix tells real
// boundaries from pattern bytes that happen to occur inside a payload.

use super::{DroppedSegment, FrameResult, FramerImpl};
use crate::error::{FrameCorruption, Result, SerialError};

pub const DEFAULT_LENGTH_BYTES: u8 = 2;

/// Largest payload a `width` byte length field can declare
pub fn max_payload_len(width: usize) -> usize {
    if width >= std::mem::size_of::<usize>() {
        usize::MAX
    } else {
        (1usize << (8 * width)) - 1
    }
}

/// Encode a payload as `<length><payload><pattern>`
pub fn encode_frame(payload: &[u8], pattern: &[u8], width: usize) -> Result<Vec<u8>> {
    let max = max_payload_len(width);
    if payload.len() > max {
        return Err(SerialError::PayloadTooLong {
            len: payload.len(),
            max,
        });
    }

    let mut frame = Vec::with_capacity(width + payload.len() + pattern.len());
    let length = (payload.len() as u64).to_be_bytes();
    frame.extend_from_slice(&length[length.len() - width..]);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(pattern);
    Ok(frame)
}

fn read_length(header: &[u8]) -> usize {
    header.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub(super) struct PatternFramer {
    pattern: Vec<u8>,
    width: usize,
    rejoin: bool,
    buffer: Vec<u8>,
    /// No pattern starts in `buffer[..search_from]` past the first segment
    search_from: usize,
}

impl PatternFramer {
    pub fn new(pattern: Vec<u8>, width: usize, rejoin: bool) -> Self {
        Self {
            pattern,
            width,
            rejoin,
            buffer: Vec::new(),
            search_from: 0,
        }
    }

    fn drop_segment(&self, start: usize, end: usize, reason: FrameCorruption) -> FrameResult {
        Err(DroppedSegment {
            reason,
            bytes: self.buffer[start..end].to_vec(),
        })
    }
}

impl FramerImpl for PatternFramer {
    fn feed(&mut self, data: &[u8]) -> Vec<FrameResult> {
        self.buffer.extend_from_slice(data);

        let pattern_len = self.pattern.len();
        let mut results = Vec::new();
        let mut cursor = 0;
        let mut search_from = self.search_from;

        let resume_at = loop {
            let Some(offset) = find(&self.buffer[search_from..], &self.pattern) else {
                // A pattern can only start where enough bytes remain to hold it
                break (self.buffer.len() + 1)
                    .saturating_sub(pattern_len)
                    .max(cursor);
            };
            let boundary = search_from + offset;
            let segment_len = boundary - cursor;

            if segment_len == 0 {
                cursor = boundary + pattern_len;
                search_from = cursor;
                continue;
            }

            if segment_len < self.width {
                results.push(self.drop_segment(
                    cursor,
                    boundary,
                    FrameCorruption::TruncatedHeader {
                        len: segment_len,
                        width: self.width,
                    },
                ));
                cursor = boundary + pattern_len;
                search_from = cursor;
                continue;
            }

            let body_start = cursor + self.width;
            let declared = read_length(&self.buffer[cursor..body_start]);
            let actual = segment_len - self.width;

            if declared == actual {
                results.push(Ok(self.buffer[body_start..boundary].to_vec()));
                cursor = boundary + pattern_len;
                search_from = cursor;
                continue;
            }

            if declared > actual && self.rejoin {
                // The pattern may be payload; look for it where the header says the frame ends
                let frame_end = body_start.saturating_add(declared);
                let needed = frame_end.saturating_add(pattern_len);
                if self.buffer.len() < needed {
                    // Rescan only this segment next time
                    break cursor;
                }
                if self.buffer[frame_end..needed] == self.pattern[..] {
                    results.push(Ok(self.buffer[body_start..frame_end].to_vec()));
                    cursor = needed;
                    search_from = cursor;
                    continue;
                }
            }

            results.push(self.drop_segment(
                cursor,
                boundary,
                FrameCorruption::LengthMismatch { declared, actual },
            ));
            cursor = boundary + pattern_len;
            search_from = cursor;
        };

        self.buffer.drain(..cursor);
        self.search_from = resume_at - cursor;
        results
    }

    fn pending(&self) -> &[u8] {
        &self.buffer
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.search_from = 0;
    }
}
