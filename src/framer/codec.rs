// src/framer/codec.rs
//
// FrameCodec: message-oriented send/receive on top of a ConnectionManager.
//
// An ingest thread pulls raw chunks from the manager, feeds them through the
// Framer and queues complete frames for `receive_frame`. Corrupted segments
// are logged and counted, never returned.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use super::{Framer, FramingEncoding};
use crate::error::{Result, SerialError};
use crate::logging::hex_preview;
use crate::manager::{ConnectionManager, MessageReceiver, SentConfirmation};

#[cfg(not(target_os = "ios"))]
use crate::config::LinkConfig;

/// How long the ingest thread waits on the manager before rechecking its flags
const INGEST_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Counters updated by the ingest thread
#[derive(Default)]
struct FrameStats {
    frames_decoded: AtomicU64,
    frames_dropped: AtomicU64,
    bytes_ingested: AtomicU64,
    pending_bytes: AtomicUsize,
}

/// Point-in-time copy of a codec's counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrameStatsSnapshot {
    pub frames_decoded: u64,
    pub frames_dropped: u64,
    pub bytes_ingested: u64,
    /// Bytes held by the accumulator waiting for a boundary
    pub pending_bytes: usize,
    /// Decoded frames not yet taken by `receive_frame`
    pub frames_waiting: usize,
}

/// Frame-level link over one exclusively owned ConnectionManager.
pub struct FrameCodec {
    label: String,
    encoding: FramingEncoding,
    manager: ConnectionManager,
    frames_tx: Sender<Vec<u8>>,
    frames_rx: Receiver<Vec<u8>>,
    stats: Arc<FrameStats>,
    running: Arc<AtomicBool>,
    clear_requested: Arc<AtomicBool>,
    /// Parked here while the ingest thread is not running
    framer: Option<Framer>,
    ingest: Option<JoinHandle<Framer>>,
    next_frame_id: AtomicU64,
}

impl FrameCodec {
    pub fn new(manager: ConnectionManager, encoding: FramingEncoding) -> Result<Self> {
        let framer = Framer::new(&encoding)?;
        Ok(Self::build(manager, encoding, framer))
    }

    pub fn cobs(manager: ConnectionManager) -> Self {
        Self::build(manager, FramingEncoding::Cobs, Framer::cobs())
    }

    pub fn pattern(manager: ConnectionManager, pattern: impl Into<Vec<u8>>) -> Result<Self> {
        Self::new(manager, FramingEncoding::pattern(pattern))
    }

    /// Serial port link described by a config file
    #[cfg(not(target_os = "ios"))]
    pub fn from_config(config: LinkConfig) -> Result<Self> {
        config.validate()?;
        let manager = ConnectionManager::with_config(
            crate::io::SerialPortTransport::new(config.serial)?,
            config.manager,
        );
        Self::new(manager, config.framing)
    }

    fn build(manager: ConnectionManager, encoding: FramingEncoding, framer: Framer) -> Self {
        let label = format!("{}:{}", encoding.name(), manager.label());
        let (frames_tx, frames_rx) = unbounded();
        Self {
            label,
            encoding,
            manager,
            frames_tx,
            frames_rx,
            stats: Arc::new(FrameStats::default()),
            running: Arc::new(AtomicBool::new(false)),
            clear_requested: Arc::new(AtomicBool::new(false)),
            framer: Some(framer),
            ingest: None,
            next_frame_id: AtomicU64::new(1),
        }
    }

    pub fn encoding(&self) -> &FramingEncoding {
        &self.encoding
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// False once the ingest thread has exited, even before `stop()`
    pub fn is_running(&self) -> bool {
        self.ingest.is_some() && self.running.load(Ordering::SeqCst)
    }

    /// Start the manager and the ingest thread
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            tlog!(
                "[{}] Already started! If restart is intended, call stop() first",
                self.label
            );
            return Ok(());
        }
        if self.ingest.is_some() {
            tlog!("[{}] Ingest thread ended on its own, cleaning up before restart", self.label);
            if let Err(e) = self.stop() {
                tlog!("[{}] Error while stopping: {}", self.label, e);
            }
        }

        self.manager.start()?;

        let mut framer = match self.framer.take() {
            Some(framer) => framer,
            None => Framer::new(&self.encoding)?,
        };
        if self.clear_requested.swap(false, Ordering::SeqCst) {
            framer.reset();
        }

        self.running.store(true, Ordering::SeqCst);
        let ingest = {
            let label = self.label.clone();
            let receiver = self.manager.receiver();
            let frames_tx = self.frames_tx.clone();
            let stats = self.stats.clone();
            let running = self.running.clone();
            let clear_requested = self.clear_requested.clone();
            thread::Builder::new()
                .name(format!("ingest-{}", self.label))
                .spawn(move || {
                    run_ingest(label, receiver, framer, frames_tx, stats, running, clear_requested)
                })
        };

        match ingest {
            Ok(handle) => {
                self.ingest = Some(handle);
                tlog!("[{}] Started", self.label);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = self.manager.stop();
                Err(SerialError::TransportIo(format!(
                    "Failed to spawn ingest thread: {}",
                    e
                )))
            }
        }
    }

    /// Join the ingest thread, then stop the manager
    pub fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.ingest.take() {
            match handle.join() {
                Ok(framer) => self.framer = Some(framer),
                Err(_) => tlog!("[{}] Ingest thread panicked, framer state lost", self.label),
            }
        }
        self.manager.stop()
    }

    /// Encode and queue one payload. Returns the payload length.
    pub fn send_frame(&self, payload: &[u8]) -> Result<usize> {
        let packet = self.encoding.encode(payload)?;
        self.manager.send(&packet, 0)?;
        Ok(payload.len())
    }

    /// Encode and queue one payload, then wait until it has been written.
    pub fn send_frame_confirmed(&self, payload: &[u8], timeout: Duration) -> Result<SentConfirmation> {
        let packet = self.encoding.encode(payload)?;
        let frame_id = self.next_frame_id.fetch_add(1, Ordering::Relaxed);
        self.manager.send(&packet, frame_id)?;
        self.manager.wait_for_confirmation(frame_id, timeout)
    }

    /// Oldest decoded frame, waiting up to `timeout`. `Ok(None)` on timeout.
    pub fn receive_frame(&self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        if self.frames_rx.is_empty() {
            if let Some(e) = self.manager.fault() {
                return Err(e);
            }
        }
        match self.frames_rx.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(_) => match self.manager.fault() {
                Some(e) => Err(e),
                None => Ok(None),
            },
        }
    }

    /// Discard decoded frames not yet received and any partial frame.
    pub fn clear(&mut self) {
        let discarded = self.frames_rx.try_iter().count();
        match self.framer.as_mut() {
            Some(framer) => {
                framer.reset();
                self.stats.pending_bytes.store(0, Ordering::Relaxed);
            }
            None => self.clear_requested.store(true, Ordering::SeqCst),
        }
        tlog!(
            "[{}] Cleared {} undelivered frame(s) and the partial frame buffer",
            self.label,
            discarded
        );
    }

    pub fn pending_frames(&self) -> usize {
        self.frames_rx.len()
    }

    pub fn stats(&self) -> FrameStatsSnapshot {
        FrameStatsSnapshot {
            frames_decoded: self.stats.frames_decoded.load(Ordering::Relaxed),
            frames_dropped: self.stats.frames_dropped.load(Ordering::Relaxed),
            bytes_ingested: self.stats.bytes_ingested.load(Ordering::Relaxed),
            pending_bytes: self.stats.pending_bytes.load(Ordering::Relaxed),
            frames_waiting: self.frames_rx.len(),
        }
    }
}

impl Drop for FrameCodec {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tlog!("[{}] Error while stopping: {}", self.label, e);
        }
    }
}

/// Ingest loop. Hands the framer back on exit so a restart keeps its state.
fn run_ingest(
    label: String,
    receiver: MessageReceiver,
    mut framer: Framer,
    frames_tx: Sender<Vec<u8>>,
    stats: Arc<FrameStats>,
    running: Arc<AtomicBool>,
    clear_requested: Arc<AtomicBool>,
) -> Framer {
    while running.load(Ordering::SeqCst) {
        let received = receiver.receive(INGEST_POLL_INTERVAL);

        // Bytes that arrive after a clear() never join a pre-clear partial frame
        if clear_requested.swap(false, Ordering::SeqCst) {
            framer.reset();
            stats.pending_bytes.store(0, Ordering::Relaxed);
        }

        let message = match received {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(e) => {
                tlog!("[{}] Link failed, ingest stopped: {}", label, e);
                running.store(false, Ordering::SeqCst);
                break;
            }
        };

        stats
            .bytes_ingested
            .fetch_add(message.payload.len() as u64, Ordering::Relaxed);

        for result in framer.feed(&message.payload) {
            match result {
                Ok(frame) => {
                    stats.frames_decoded.fetch_add(1, Ordering::Relaxed);
                    if frames_tx.send(frame).is_err() {
                        return framer;
                    }
                }
                Err(dropped) => {
                    stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                    tlog!(
                        "[{}] Dropping corrupted frame ({}): {}",
                        label,
                        dropped.reason,
                        hex_preview(&dropped.bytes)
                    );
                }
            }
        }
        stats
            .pending_bytes
            .store(framer.pending().len(), Ordering::Relaxed);
    }
    framer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Echo, MockConfig, MockTransport};
    use std::time::Instant;

    const WAIT: Duration = Duration::from_millis(200);

    fn echo_codec(encoding: FramingEncoding) -> FrameCodec {
        let transport =
            MockTransport::with_generator(MockConfig::new("LOOP", 115_200), Echo).unwrap();
        let mut codec = FrameCodec::new(ConnectionManager::new(transport), encoding).unwrap();
        codec.start().unwrap();
        codec
    }

    /// Codec whose device answers each trigger (sent as a frame) with raw bytes
    fn scripted_codec(encoding: FramingEncoding, script: Vec<(Vec<u8>, Vec<u8>)>) -> FrameCodec {
        let mut config = MockConfig::new("SCRIPT", 115_200);
        for (trigger, raw) in script {
            config = config.with_response(encoding.encode(&trigger).unwrap(), raw);
        }
        let transport = MockTransport::new(config).unwrap();
        let mut codec = FrameCodec::new(ConnectionManager::new(transport), encoding).unwrap();
        codec.start().unwrap();
        codec
    }

    fn receive_n(codec: &FrameCodec, n: usize) -> Vec<Vec<u8>> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut frames = Vec::new();
        while frames.len() < n && Instant::now() < deadline {
            if let Some(frame) = codec.receive_frame(Duration::from_millis(50)).unwrap() {
                frames.push(frame);
            }
        }
        frames
    }

    #[test]
    fn test_cobs_hello() {
        let transport =
            MockTransport::with_generator(MockConfig::new("COM1", 115_200), Echo).unwrap();
        let mut codec = FrameCodec::cobs(ConnectionManager::new(transport));
        codec.start().unwrap();
        assert_eq!(codec.label(), "cobs:COM1");

        assert_eq!(codec.send_frame(b"Hello").unwrap(), 5);
        assert_eq!(codec.receive_frame(WAIT).unwrap(), Some(b"Hello".to_vec()));
    }

    #[test]
    fn test_cobs_payload_with_delimiter() {
        let codec = echo_codec(FramingEncoding::Cobs);
        codec.send_frame(b"Hello\x00World!").unwrap();
        assert_eq!(
            codec.receive_frame(WAIT).unwrap(),
            Some(b"Hello\x00World!".to_vec())
        );
    }

    #[test]
    fn test_cobs_three_frames_one_chunk() {
        let raw = b"\x06Hello\x07World!\x00".repeat(3);
        let codec = scripted_codec(FramingEncoding::Cobs, vec![(b"go".to_vec(), raw)]);
        codec.send_frame(b"go").unwrap();
        assert_eq!(receive_n(&codec, 3), vec![b"Hello\x00World!".to_vec(); 3]);
        assert_eq!(codec.stats().frames_decoded, 3);
    }

    #[test]
    fn test_cobs_frame_split_across_chunks() {
        let codec = scripted_codec(
            FramingEncoding::Cobs,
            vec![
                (b"first".to_vec(), b"\x06Hello\x07Wo".to_vec()),
                (b"second".to_vec(), b"rld!\x00\x06Hello\x00".to_vec()),
            ],
        );
        codec.send_frame(b"first").unwrap();
        assert_eq!(codec.receive_frame(WAIT).unwrap(), None);
        codec.send_frame(b"second").unwrap();
        assert_eq!(
            receive_n(&codec, 2),
            vec![b"Hello\x00World!".to_vec(), b"Hello".to_vec()]
        );
    }

    #[test]
    fn test_cobs_corrupted_frame_is_dropped() {
        let raw = b"\x06Hello\x00\x06Hello\x08World!\x00\x07World!\x00".to_vec();
        let codec = scripted_codec(FramingEncoding::Cobs, vec![(b"go".to_vec(), raw)]);
        codec.send_frame(b"go").unwrap();
        assert_eq!(receive_n(&codec, 2), vec![b"Hello".to_vec(), b"World!".to_vec()]);
        assert_eq!(codec.receive_frame(Duration::from_millis(50)).unwrap(), None);

        let stats = codec.stats();
        assert_eq!(stats.frames_decoded, 2);
        assert_eq!(stats.frames_dropped, 1);
        assert_eq!(stats.bytes_ingested, 29);
        assert_eq!(stats.pending_bytes, 0);
    }

    #[test]
    fn test_pattern_length_mismatch_is_dropped() {
        let encoding = FramingEncoding::pattern(b"----".to_vec());
        let mut raw = encoding.encode(b"before").unwrap();
        raw.extend_from_slice(b"\x00\x02oops----");
        raw.extend(encoding.encode(b"after").unwrap());

        let codec = scripted_codec(encoding, vec![(b"go".to_vec(), raw)]);
        codec.send_frame(b"go").unwrap();
        assert_eq!(receive_n(&codec, 2), vec![b"before".to_vec(), b"after".to_vec()]);
        assert_eq!(codec.stats().frames_dropped, 1);
    }

    #[test]
    fn test_pattern_roundtrip() {
        let mut codec = echo_codec(FramingEncoding::pattern_rejoining(b"----".to_vec()));
        let payloads: Vec<Vec<u8>> = vec![
            b"".to_vec(),
            b"no boundary here".to_vec(),
            b"dashes ---- inside".to_vec(),
            vec![0x2d; 40],
        ];
        for payload in &payloads {
            codec.send_frame(payload).unwrap();
        }
        assert_eq!(receive_n(&codec, payloads.len()), payloads);

        let too_long = vec![0u8; 65_536];
        assert!(matches!(
            codec.send_frame(&too_long),
            Err(SerialError::PayloadTooLong { len: 65_536, max: 65_535 })
        ));
        codec.stop().unwrap();
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        for encoding in [FramingEncoding::Cobs, FramingEncoding::pattern(b"----".to_vec())] {
            let codec = echo_codec(encoding);
            codec.send_frame(b"").unwrap();
            codec.send_frame(b"after").unwrap();
            assert_eq!(receive_n(&codec, 2), vec![Vec::new(), b"after".to_vec()]);
            assert_eq!(codec.stats().frames_dropped, 0);
        }
    }

    #[test]
    fn test_overlong_declaration_does_not_stall() {
        let encoding = FramingEncoding::pattern(b"----".to_vec());
        let mut raw = encoding.encode(b"Hello").unwrap();
        // Declares 64 bytes, carries 5, and little follows it
        raw.extend_from_slice(b"\x00\x40World----");
        raw.extend(encoding.encode(b"again").unwrap());

        let codec = scripted_codec(encoding, vec![(b"go".to_vec(), raw)]);
        codec.send_frame(b"go").unwrap();
        assert_eq!(receive_n(&codec, 2), vec![b"Hello".to_vec(), b"again".to_vec()]);

        let stats = codec.stats();
        assert_eq!(stats.frames_dropped, 1);
        assert_eq!(stats.pending_bytes, 0);
    }

    #[test]
    fn test_send_and_receive_from_separate_threads() {
        let codec = echo_codec(FramingEncoding::Cobs);
        let payloads: Vec<Vec<u8>> = (0..50u8).map(|i| vec![i; 1 + i as usize]).collect();

        let received = thread::scope(|scope| {
            scope.spawn(|| {
                for payload in &payloads {
                    codec.send_frame(payload).unwrap();
                }
            });
            scope
                .spawn(|| receive_n(&codec, payloads.len()))
                .join()
                .unwrap()
        });
        assert_eq!(received, payloads);
    }

    #[test]
    fn test_link_failure_stops_ingest() {
        struct Unplugged;

        impl crate::io::Transport for Unplugged {
            fn name(&self) -> &str {
                "UNPLUGGED"
            }
            fn open(&self) -> Result<()> {
                Ok(())
            }
            fn close(&self) -> Result<()> {
                Ok(())
            }
            fn is_open(&self) -> bool {
                true
            }
            fn read(&self, _n: usize) -> Result<Vec<u8>> {
                Err(SerialError::TransportIo("device unplugged".to_string()))
            }
            fn read_all(&self) -> Result<Vec<u8>> {
                self.read(0)
            }
            fn write(&self, _data: &[u8]) -> Result<usize> {
                Err(SerialError::TransportIo("device unplugged".to_string()))
            }
            fn in_waiting(&self) -> Result<usize> {
                Err(SerialError::TransportIo("device unplugged".to_string()))
            }
        }

        let mut codec = FrameCodec::cobs(ConnectionManager::new(Unplugged));
        codec.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while codec.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!codec.is_running());
        assert!(matches!(
            codec.receive_frame(Duration::from_millis(10)),
            Err(SerialError::TransportIo(_))
        ));

        // A new start joins the dead thread and runs again
        codec.start().unwrap();
        assert!(codec.ingest.is_some());
        codec.stop().unwrap();
        assert!(codec.framer.is_some());
    }

    #[test]
    fn test_send_frame_confirmed() {
        let codec = echo_codec(FramingEncoding::Cobs);
        let first = codec.send_frame_confirmed(b"one", Duration::from_secs(1)).unwrap();
        let second = codec.send_frame_confirmed(b"two", Duration::from_secs(1)).unwrap();
        assert_eq!(second.correlation_id, first.correlation_id + 1);
        assert_eq!(receive_n(&codec, 2), vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn test_clear_discards_undelivered_frames() {
        let mut codec = echo_codec(FramingEncoding::Cobs);
        codec.send_frame(b"stale").unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while codec.pending_frames() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(codec.pending_frames(), 1);

        codec.clear();
        assert_eq!(codec.pending_frames(), 0);
        codec.send_frame(b"fresh").unwrap();
        assert_eq!(codec.receive_frame(WAIT).unwrap(), Some(b"fresh".to_vec()));
    }

    #[test]
    fn test_clear_while_stopped_drops_partial_frame() {
        let mut codec = scripted_codec(FramingEncoding::Cobs, vec![(b"go".to_vec(), b"\x06Hel".to_vec())]);
        codec.send_frame(b"go").unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while codec.stats().pending_bytes == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(codec.stats().pending_bytes, 4);

        codec.stop().unwrap();
        codec.clear();
        assert_eq!(codec.stats().pending_bytes, 0);
        assert!(codec.framer.as_ref().map_or(false, |f| f.pending().is_empty()));
    }

    #[test]
    fn test_restart_keeps_codec_usable() {
        let mut codec = echo_codec(FramingEncoding::Cobs);
        codec.send_frame(b"before").unwrap();
        assert_eq!(codec.receive_frame(WAIT).unwrap(), Some(b"before".to_vec()));

        codec.stop().unwrap();
        assert!(!codec.is_running());
        codec.start().unwrap();
        codec.send_frame(b"after").unwrap();
        assert_eq!(codec.receive_frame(WAIT).unwrap(), Some(b"after".to_vec()));
    }

    #[test]
    fn test_stats_snapshot_serializes() {
        let codec = echo_codec(FramingEncoding::Cobs);
        let json = serde_json::to_value(codec.stats()).unwrap();
        assert_eq!(json["frames_decoded"], 0);
        assert_eq!(json["frames_waiting"], 0);
    }
}
