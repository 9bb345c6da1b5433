// src/manager.rs
//
// ConnectionManager: decouples callers from a blocking transport.
//
// Two background threads service one transport:
// - reader: polls `in_waiting`, drains whatever arrived, timestamps it and
//   queues it for `receive`
// - writer: takes payloads off the send queue in FIFO order, writes them and
//   confirms writes that carry a correlation id
//
// Transport failures end the failing loop and are recorded; the next
// `send`/`receive` returns the recorded error instead of hanging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SerialError};
use crate::io::{now_ns, Transport};

#[cfg(not(target_os = "ios"))]
use crate::io::{SerialConfig, SerialPortTransport};

fn default_poll_interval_us() -> u64 {
    1000
}

/// Tuning for the reader loop
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Sleep between polls that found no bytes waiting
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval_us: default_poll_interval_us(),
        }
    }
}

impl ManagerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_us == 0 {
            return Err(SerialError::Config(
                "poll_interval_us must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Messages
// ============================================================================

/// A chunk of bytes as it arrived from the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampedMessage {
    /// Nanoseconds since the Unix epoch, taken right after the read
    pub time_ns: u64,
    pub payload: Vec<u8>,
}

/// Proof that a send carrying a non-zero correlation id hit the transport
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SentConfirmation {
    /// Nanoseconds since the Unix epoch, taken right after the write
    pub time_ns: u64,
    pub correlation_id: u64,
}

struct SendRequest {
    payload: Vec<u8>,
    correlation_id: u64,
}

enum WriterCommand {
    Send(SendRequest),
    Shutdown,
}

// ============================================================================
// Fault slot
// ============================================================================

/// First transport error seen by either loop since the last `start()`
#[derive(Clone, Default)]
struct Fault(Arc<Mutex<Option<SerialError>>>);

impl Fault {
    fn record(&self, error: SerialError) {
        if let Ok(mut slot) = self.0.lock() {
            slot.get_or_insert(error);
        }
    }

    fn get(&self) -> Option<SerialError> {
        self.0.lock().ok().and_then(|slot| slot.clone())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.0.lock() {
            slot.take();
        }
    }
}

/// Receive side of a ConnectionManager.
///
/// Cloneable so another thread (the frame codec's ingest loop) can consume
/// received bytes while the manager itself stays single-owner.
#[derive(Clone)]
pub struct MessageReceiver {
    rx: Receiver<TimestampedMessage>,
    fault: Fault,
}

impl MessageReceiver {
    /// Oldest buffered message, waiting up to `timeout`.
    /// `Ok(None)` on timeout; the link fault once it died and nothing is left.
    pub fn receive(&self, timeout: Duration) -> Result<Option<TimestampedMessage>> {
        if self.rx.is_empty() {
            if let Some(e) = self.fault.get() {
                return Err(e);
            }
        }
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(_) => match self.fault.get() {
                Some(e) => Err(e),
                None => Ok(None),
            },
        }
    }

    pub fn try_receive(&self) -> Result<Option<TimestampedMessage>> {
        match self.rx.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(_) => match self.fault.get() {
                Some(e) => Err(e),
                None => Ok(None),
            },
        }
    }

    /// Messages buffered and not yet received
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Asynchronous send/receive over one exclusively owned transport.
pub struct ConnectionManager {
    label: String,
    transport: Arc<dyn Transport>,
    config: ManagerConfig,
    running: Arc<AtomicBool>,
    fault: Fault,
    received_tx: Sender<TimestampedMessage>,
    received: MessageReceiver,
    send_tx: Sender<WriterCommand>,
    send_rx: Receiver<WriterCommand>,
    sent_tx: Sender<SentConfirmation>,
    sent_rx: Receiver<SentConfirmation>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, ManagerConfig::default())
    }

    pub fn with_config(transport: impl Transport + 'static, config: ManagerConfig) -> Self {
        let label = transport.name().to_string();
        let fault = Fault::default();
        let (received_tx, received_rx) = unbounded();
        let (send_tx, send_rx) = unbounded();
        let (sent_tx, sent_rx) = unbounded();

        Self {
            label,
            transport: Arc::new(transport),
            config,
            running: Arc::new(AtomicBool::new(false)),
            received: MessageReceiver {
                rx: received_rx,
                fault: fault.clone(),
            },
            fault,
            received_tx,
            send_tx,
            send_rx,
            sent_tx,
            sent_rx,
            reader: None,
            writer: None,
        }
    }

    /// Manager over a serial port. The port is opened by `start()`.
    #[cfg(not(target_os = "ios"))]
    pub fn open_serial(config: SerialConfig) -> Result<Self> {
        Ok(Self::new(SerialPortTransport::new(config)?))
    }

    /// Transport name used in log lines
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.reader.is_some() || self.writer.is_some()
    }

    /// Error that ended the reader or writer loop, if any
    pub fn fault(&self) -> Option<SerialError> {
        self.fault.get()
    }

    /// Open the transport if needed and spawn the reader and writer loops.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            tlog!(
                "[manager:{}] Already started! If restart is intended, call stop() first",
                self.label
            );
            return Ok(());
        }

        if !self.transport.is_open() {
            tlog!("[manager:{}] Transport not open yet, opening", self.label);
            self.transport.open()?;
        }

        if !self.received.is_empty() {
            tlog!(
                "[manager:{}] Receive queue holds {} message(s) from a previous session",
                self.label,
                self.received.len()
            );
        }
        if !self.send_rx.is_empty() {
            tlog!(
                "[manager:{}] Send queue holds {} message(s) queued before start",
                self.label,
                self.send_rx.len()
            );
        }

        self.fault.clear();
        self.running.store(true, Ordering::SeqCst);

        let reader = {
            let label = self.label.clone();
            let transport = self.transport.clone();
            let running = self.running.clone();
            let received_tx = self.received_tx.clone();
            let fault = self.fault.clone();
            let poll_interval = self.config.poll_interval();
            thread::Builder::new()
                .name(format!("reader-{}", self.label))
                .spawn(move || run_reader(label, transport, running, received_tx, fault, poll_interval))
        };
        let reader = match reader {
            Ok(handle) => handle,
            Err(e) => return Err(self.abandon_start(format!("Failed to spawn reader thread: {}", e))),
        };
        self.reader = Some(reader);

        let writer = {
            let label = self.label.clone();
            let transport = self.transport.clone();
            let running = self.running.clone();
            let send_rx = self.send_rx.clone();
            let sent_tx = self.sent_tx.clone();
            let fault = self.fault.clone();
            thread::Builder::new()
                .name(format!("writer-{}", self.label))
                .spawn(move || run_writer(label, transport, running, send_rx, sent_tx, fault))
        };
        match writer {
            Ok(handle) => self.writer = Some(handle),
            Err(e) => {
                let _ = self.stop();
                return Err(SerialError::TransportIo(format!(
                    "Failed to spawn writer thread: {}",
                    e
                )));
            }
        }

        tlog!("[manager:{}] Started", self.label);
        Ok(())
    }

    /// Undo a start that failed before any thread was running.
    fn abandon_start(&mut self, reason: String) -> SerialError {
        self.running.store(false, Ordering::SeqCst);
        if let Err(e) = self.transport.close() {
            tlog!("[manager:{}] Failed to close transport: {}", self.label, e);
        }
        tlog!("[manager:{}] {}", self.label, reason);
        SerialError::TransportIo(reason)
    }

    /// Stop both loops, drop unsent payloads and close the transport.
    pub fn stop(&mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }

        tlog!("[manager:{}] Gracefully halting R/W threads", self.label);
        self.running.store(false, Ordering::SeqCst);
        let _ = self.send_tx.send(WriterCommand::Shutdown);

        for handle in [self.reader.take(), self.writer.take()].into_iter().flatten() {
            if handle.join().is_err() {
                tlog!("[manager:{}] A R/W thread panicked", self.label);
            }
        }

        let discarded = self
            .send_rx
            .try_iter()
            .filter(|command| matches!(command, WriterCommand::Send(_)))
            .count();
        if discarded > 0 {
            tlog!(
                "[manager:{}] Discarded {} unsent message(s)",
                self.label,
                discarded
            );
        }

        self.transport.close()?;
        tlog!("[manager:{}] Stopped", self.label);
        Ok(())
    }

    /// Queue `payload` for writing and return immediately.
    ///
    /// A non-zero `correlation_id` produces a `SentConfirmation` once the
    /// payload has been written. Empty payloads are ignored and return 0.
    pub fn send(&self, payload: &[u8], correlation_id: u64) -> Result<usize> {
        if payload.is_empty() {
            return Ok(0);
        }
        if let Some(e) = self.fault.get() {
            return Err(e);
        }
        self.send_tx
            .send(WriterCommand::Send(SendRequest {
                payload: payload.to_vec(),
                correlation_id,
            }))
            .map_err(|_| SerialError::Closed(self.label.clone()))?;
        Ok(payload.len())
    }

    /// Oldest received message, waiting up to `timeout`. `Ok(None)` on timeout.
    pub fn receive(&self, timeout: Duration) -> Result<Option<TimestampedMessage>> {
        self.received.receive(timeout)
    }

    pub fn try_receive(&self) -> Result<Option<TimestampedMessage>> {
        self.received.try_receive()
    }

    /// Cloneable receive handle for a consumer thread
    pub fn receiver(&self) -> MessageReceiver {
        self.received.clone()
    }

    pub fn pending_received(&self) -> usize {
        self.received.len()
    }

    pub fn pending_sends(&self) -> usize {
        self.send_rx.len()
    }

    /// Next write confirmation, waiting up to `timeout`
    pub fn next_confirmation(&self, timeout: Duration) -> Option<SentConfirmation> {
        self.sent_rx.recv_timeout(timeout).ok()
    }

    /// Wait for the confirmation of one specific correlation id.
    ///
    /// Confirmations for other ids are logged and discarded; only one thread
    /// should wait on confirmations at a time.
    pub fn wait_for_confirmation(
        &self,
        correlation_id: u64,
        timeout: Duration,
    ) -> Result<SentConfirmation> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.sent_rx.recv_timeout(remaining) {
                Ok(confirmation) if confirmation.correlation_id == correlation_id => {
                    return Ok(confirmation)
                }
                Ok(confirmation) => tlog!(
                    "[manager:{}] Got confirmation {} while waiting for {}, are other threads sending?",
                    self.label,
                    confirmation.correlation_id,
                    correlation_id
                ),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return Err(self.fault.get().unwrap_or(SerialError::Timeout(timeout)));
                }
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tlog!("[manager:{}] Error while stopping: {}", self.label, e);
        }
    }
}

// ============================================================================
// Background loops
// ============================================================================

fn run_reader(
    label: String,
    transport: Arc<dyn Transport>,
    running: Arc<AtomicBool>,
    received_tx: Sender<TimestampedMessage>,
    fault: Fault,
    poll_interval: Duration,
) {
    while running.load(Ordering::SeqCst) {
        let waiting = match transport.in_waiting() {
            Ok(n) => n,
            Err(e) => {
                tlog!("[manager:{}] Read loop failed: {}", label, e);
                fault.record(e);
                return;
            }
        };
        if waiting == 0 {
            thread::sleep(poll_interval);
            continue;
        }

        match transport.read_all() {
            Ok(payload) if payload.is_empty() => {}
            Ok(payload) => {
                let message = TimestampedMessage {
                    time_ns: now_ns(),
                    payload,
                };
                if received_tx.send(message).is_err() {
                    return;
                }
            }
            Err(e) => {
                tlog!("[manager:{}] Read loop failed: {}", label, e);
                fault.record(e);
                return;
            }
        }
    }
}

fn run_writer(
    label: String,
    transport: Arc<dyn Transport>,
    running: Arc<AtomicBool>,
    send_rx: Receiver<WriterCommand>,
    sent_tx: Sender<SentConfirmation>,
    fault: Fault,
) {
    while let Ok(command) = send_rx.recv() {
        let request = match command {
            WriterCommand::Send(request) => request,
            WriterCommand::Shutdown => break,
        };
        if !running.load(Ordering::SeqCst) {
            tlog!(
                "[manager:{}] Stopping, dropping {} byte message",
                label,
                request.payload.len()
            );
            break;
        }

        if let Err(e) = transport.write(&request.payload) {
            tlog!("[manager:{}] Write loop failed: {}", label, e);
            fault.record(e);
            break;
        }
        if request.correlation_id != 0 {
            let _ = sent_tx.send(SentConfirmation {
                time_ns: now_ns(),
                correlation_id: request.correlation_id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Echo, MockConfig, MockTransport};

    const WAIT: Duration = Duration::from_secs(2);

    fn mock_manager(config: MockConfig) -> ConnectionManager {
        let mut manager = ConnectionManager::new(MockTransport::new(config).unwrap());
        manager.start().unwrap();
        manager
    }

    fn echo_manager() -> ConnectionManager {
        let transport =
            MockTransport::with_generator(MockConfig::new("ECHO", 115_200), Echo).unwrap();
        let mut manager = ConnectionManager::new(transport);
        manager.start().unwrap();
        manager
    }

    /// Collect received bytes until `len` have arrived or `WAIT` elapses
    fn receive_bytes(manager: &ConnectionManager, len: usize) -> Vec<u8> {
        let deadline = Instant::now() + WAIT;
        let mut bytes = Vec::new();
        while bytes.len() < len && Instant::now() < deadline {
            if let Some(message) = manager.receive(Duration::from_millis(50)).unwrap() {
                bytes.extend(message.payload);
            }
        }
        bytes
    }

    /// Fails every operation once opened
    struct BrokenTransport {
        open: AtomicBool,
        fail_reads: bool,
    }

    impl BrokenTransport {
        fn new(fail_reads: bool) -> Self {
            Self {
                open: AtomicBool::new(false),
                fail_reads,
            }
        }
    }

    impl Transport for BrokenTransport {
        fn name(&self) -> &str {
            "BROKEN"
        }
        fn open(&self) -> Result<()> {
            self.open.store(true, Ordering::SeqCst);
            Ok(())
        }
        fn close(&self) -> Result<()> {
            self.open.store(false, Ordering::SeqCst);
            Ok(())
        }
        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
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
            if self.fail_reads {
                Err(SerialError::TransportIo("device unplugged".to_string()))
            } else {
                Ok(0)
            }
        }
    }

    #[test]
    fn test_command_response() {
        let manager = mock_manager(
            MockConfig::new("COM1", 115_200)
                .with_response(b"foo".to_vec(), b"bar".to_vec())
                .with_response(b"hello?".to_vec(), b"world!!!".to_vec())
                .with_response(vec![1, 1, 4, 5, 1, 4], vec![1, 9, 1, 9, 8, 1, 0]),
        );

        for (request, response) in [
            (b"foo".to_vec(), b"bar".to_vec()),
            (b"hello?".to_vec(), b"world!!!".to_vec()),
            (vec![1, 1, 4, 5, 1, 4], vec![1, 9, 1, 9, 8, 1, 0]),
        ] {
            assert_eq!(manager.send(&request, 0).unwrap(), request.len());
            assert_eq!(receive_bytes(&manager, response.len()), response);
        }
    }

    #[test]
    fn test_receive_timestamps_are_monotonic() {
        let manager = echo_manager();
        manager.send(b"one", 0).unwrap();
        let first = manager.receive(WAIT).unwrap().unwrap();
        manager.send(b"two", 0).unwrap();
        let second = manager.receive(WAIT).unwrap().unwrap();
        assert!(first.time_ns > 0);
        assert!(second.time_ns >= first.time_ns);
    }

    #[test]
    fn test_large_send_is_confirmed() {
        let manager = echo_manager();
        let payload: Vec<u8> = (0..11_520u32).map(|i| (i % 251) as u8).collect();

        assert_eq!(manager.send(&payload, 888).unwrap(), 11_520);
        let confirmation = manager.wait_for_confirmation(888, WAIT).unwrap();
        assert_eq!(confirmation.correlation_id, 888);
        assert!(confirmation.time_ns > 0);
        assert_eq!(receive_bytes(&manager, payload.len()), payload);
    }

    #[test]
    fn test_uncorrelated_sends_are_not_confirmed() {
        let manager = echo_manager();
        manager.send(b"quiet", 0).unwrap();
        manager.send(b"loud", 7).unwrap();
        assert_eq!(
            manager.next_confirmation(WAIT).map(|c| c.correlation_id),
            Some(7)
        );
        assert!(manager.next_confirmation(Duration::from_millis(100)).is_none());
    }

    #[test]
    fn test_wait_for_confirmation_skips_foreign_ids() {
        let manager = echo_manager();
        manager.send(b"a", 1).unwrap();
        manager.send(b"b", 2).unwrap();
        assert_eq!(manager.wait_for_confirmation(2, WAIT).unwrap().correlation_id, 2);
        assert_eq!(
            manager.wait_for_confirmation(3, Duration::from_millis(50)),
            Err(SerialError::Timeout(Duration::from_millis(50)))
        );
    }

    #[test]
    fn test_empty_send_is_noop() {
        let manager = echo_manager();
        assert_eq!(manager.send(b"", 5).unwrap(), 0);
        assert_eq!(manager.pending_sends(), 0);
        assert!(manager.next_confirmation(Duration::from_millis(100)).is_none());
    }

    #[test]
    fn test_receive_timeout_returns_none() {
        let manager = mock_manager(MockConfig::new("SILENT", 9600));
        let started = Instant::now();
        assert_eq!(manager.receive(Duration::from_millis(100)).unwrap(), None);
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(manager.try_receive().unwrap(), None);
    }

    #[test]
    fn test_concurrent_sends_match_write_order() {
        const THREADS: u64 = 4;
        const PER_THREAD: u64 = 25;

        let manager = echo_manager();
        let message = |thread: u64, i: u64| format!("[t{}m{:02}]", thread, i).into_bytes();
        let id = |thread: u64, i: u64| thread * 1000 + i + 1;

        thread::scope(|s| {
            for t in 0..THREADS {
                let manager = &manager;
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        manager.send(&message(t, i), id(t, i)).unwrap();
                    }
                });
            }
        });

        // Confirmations arrive in physical write order
        let mut written = Vec::new();
        for _ in 0..THREADS * PER_THREAD {
            written.push(manager.next_confirmation(WAIT).unwrap().correlation_id);
        }
        assert!(manager.next_confirmation(Duration::from_millis(50)).is_none());

        // Each thread's sends kept their relative order
        for t in 0..THREADS {
            let ids: Vec<u64> = written.iter().copied().filter(|c| c / 1000 == t).collect();
            assert_eq!(ids, (0..PER_THREAD).map(|i| id(t, i)).collect::<Vec<_>>());
        }

        let expected: Vec<u8> = written
            .iter()
            .flat_map(|c| message(c / 1000, c % 1000 - 1))
            .collect();
        assert_eq!(receive_bytes(&manager, expected.len()), expected);
    }

    #[test]
    fn test_write_fault_surfaces_on_send_and_receive() {
        let mut manager = ConnectionManager::new(BrokenTransport::new(false));
        manager.start().unwrap();
        manager.send(b"doomed", 1).unwrap();

        assert!(matches!(
            manager.wait_for_confirmation(1, WAIT),
            Err(SerialError::TransportIo(_))
        ));
        assert!(matches!(manager.send(b"again", 0), Err(SerialError::TransportIo(_))));
        assert!(matches!(
            manager.receive(Duration::from_millis(10)),
            Err(SerialError::TransportIo(_))
        ));
    }

    #[test]
    fn test_read_fault_surfaces_on_receive() {
        let mut manager = ConnectionManager::new(BrokenTransport::new(true));
        manager.start().unwrap();
        assert!(matches!(manager.receive(WAIT), Err(SerialError::TransportIo(_))));
        assert!(manager.fault().is_some());
    }

    #[test]
    fn test_restart_after_stop() {
        let mut manager = echo_manager();
        manager.send(b"first", 0).unwrap();
        assert_eq!(receive_bytes(&manager, 5), b"first".to_vec());

        manager.stop().unwrap();
        assert!(!manager.is_running());
        // Second stop is a no-op
        manager.stop().unwrap();

        // Sends queued while stopped go out after the next start
        manager.send(b"second", 0).unwrap();
        assert_eq!(manager.pending_sends(), 1);
        manager.start().unwrap();
        // Second start warns and carries on
        manager.start().unwrap();
        assert_eq!(receive_bytes(&manager, 6), b"second".to_vec());
    }

    #[test]
    fn test_start_fails_on_unavailable_transport() {
        let config = SerialConfig::new("/dev/does-not-exist", 9600);
        let mut manager = ConnectionManager::open_serial(config).unwrap();
        assert!(matches!(
            manager.start(),
            Err(SerialError::TransportUnavailable { .. })
        ));
        assert!(!manager.is_running());
    }

    #[test]
    fn test_abandoned_start_closes_transport() {
        let mut manager = mock_manager(MockConfig::new("COM9", 9600));
        manager.stop().unwrap();
        manager.transport.open().unwrap();
        manager.running.store(true, Ordering::SeqCst);

        let error = manager.abandon_start("Failed to spawn reader thread".to_string());
        assert_eq!(
            error,
            SerialError::TransportIo("Failed to spawn reader thread".to_string())
        );
        assert!(!manager.transport.is_open());
        assert!(!manager.is_running());
        assert!(!manager.running.load(Ordering::SeqCst));

        // The manager is still usable afterwards
        manager.start().unwrap();
        assert!(manager.transport.is_open());
    }

    #[test]
    fn test_manager_config_from_toml() {
        let config: ManagerConfig = toml::from_str("").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
        let config: ManagerConfig = toml::from_str("poll_interval_us = 250").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_micros(250));
        assert!(ManagerConfig { poll_interval_us: 0 }.validate().is_err());
    }
}
