// src/io/mock.rs
//
// Mock serial device for exercising managers and framers without hardware.
//
// Data returned by reads comes from two background tasks:
// - the response task answers every write, first from the exact-match
//   response map, then from the configured ResponseGenerator
// - the stream task replays `stream_content` cyclically at `stream_bps`,
//   independent of any request traffic
//
// Writes block for the time the bytes would take on the wire at the
// configured baud rate (8 bits per byte), like a slow physical port.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::error::{Result, SerialError};
use crate::io::Transport;

/// Write delays shorter than this are not simulated; sleeps that short are
/// not reproducible across OS schedulers.
const MIN_SIMULATED_DELAY: Duration = Duration::from_millis(20);
/// How often the stream task tops up the read buffer.
const STREAM_TICK: Duration = Duration::from_millis(1);
/// Sleep while the stream is disabled.
const STREAM_IDLE: Duration = Duration::from_millis(10);

// ============================================================================
// Response strategies
// ============================================================================

/// Produces the device's answer to a request that has no entry in the
/// response map. An empty answer means "no response".
pub trait ResponseGenerator: Send + Sync {
    fn respond(&self, request: &[u8]) -> Vec<u8>;
}

/// Never answers unmapped requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResponse;

impl ResponseGenerator for NoResponse {
    fn respond(&self, _request: &[u8]) -> Vec<u8> {
        Vec::new()
    }
}

/// Answers every unmapped request with the request itself (a loopback cable).
#[derive(Clone, Copy, Debug, Default)]
pub struct Echo;

impl ResponseGenerator for Echo {
    fn respond(&self, request: &[u8]) -> Vec<u8> {
        request.to_vec()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Mock device configuration
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound for a blocking `read(n)`
    pub read_timeout: Duration,
    /// When set, reads and writes on a closed mock fail instead of being
    /// logged and carried out anyway.
    pub strict: bool,
    /// Exact request bytes to response bytes
    pub response_map: HashMap<Vec<u8>, Vec<u8>>,
    /// Replayed cyclically while `stream_bps` is non-zero
    pub stream_content: Vec<u8>,
    /// Background stream rate in bits per second, 0 disables it
    pub stream_bps: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        MockConfig {
            port: "MOCK".to_string(),
            baud_rate: 9600,
            read_timeout: Duration::from_secs(1),
            strict: false,
            response_map: HashMap::new(),
            stream_content: Vec::new(),
            stream_bps: 0,
        }
    }
}

impl MockConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        MockConfig {
            port: port.into(),
            baud_rate,
            ..Default::default()
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_response(mut self, request: impl Into<Vec<u8>>, response: impl Into<Vec<u8>>) -> Self {
        self.response_map.insert(request.into(), response.into());
        self
    }

    pub fn with_stream(mut self, content: impl Into<Vec<u8>>, bps: u64) -> Self {
        self.stream_content = content.into();
        self.stream_bps = bps;
        self
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

/// State shared with the background tasks
struct Shared {
    port: String,
    read_buf: Mutex<VecDeque<u8>>,
    data_ready: Condvar,
    stream_bps: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
}

impl Shared {
    fn push(&self, bytes: &[u8]) {
        match self.read_buf.lock() {
            Ok(mut buf) => {
                buf.extend(bytes.iter().copied());
                self.data_ready.notify_all();
            }
            Err(e) => tlog!("[mock:{}] Read buffer poisoned, dropping {} bytes: {}", self.port, bytes.len(), e),
        }
    }
}

/// Handles of the two background tasks that run while the mock is open
struct MockTasks {
    wrote_tx: Sender<Vec<u8>>,
    stream_running: Arc<AtomicBool>,
    response: JoinHandle<()>,
    stream: JoinHandle<()>,
}

/// A serial device double implementing `Transport`.
///
/// The mock is open as soon as it is constructed.
pub struct MockTransport {
    config: MockConfig,
    generator: Arc<dyn ResponseGenerator>,
    response_map: Arc<HashMap<Vec<u8>, Vec<u8>>>,
    shared: Arc<Shared>,
    tasks: Mutex<Option<MockTasks>>,
}

impl MockTransport {
    /// Create an open mock that does not answer unmapped requests.
    pub fn new(config: MockConfig) -> Result<Self> {
        Self::with_generator(config, NoResponse)
    }

    /// Create an open mock that answers unmapped requests with `generator`.
    pub fn with_generator(config: MockConfig, generator: impl ResponseGenerator + 'static) -> Result<Self> {
        let shared = Arc::new(Shared {
            port: config.port.clone(),
            read_buf: Mutex::new(VecDeque::new()),
            data_ready: Condvar::new(),
            stream_bps: AtomicU64::new(config.stream_bps),
            bytes_read: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        });
        let mock = MockTransport {
            response_map: Arc::new(config.response_map.clone()),
            generator: Arc::new(generator),
            shared,
            tasks: Mutex::new(None),
            config,
        };
        mock.open()?;
        tlog!(
            "[mock:{}] Created mock serial device (baud: {}, timeout: {:?}, responses: {})",
            mock.config.port,
            mock.config.baud_rate,
            mock.config.read_timeout,
            mock.response_map.len()
        );
        Ok(mock)
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Change the background stream rate. 0 stops the stream.
    pub fn set_stream_bps(&self, bps: u64) {
        self.shared.stream_bps.store(bps, Ordering::Relaxed);
    }

    pub fn stream_bps(&self) -> u64 {
        self.shared.stream_bps.load(Ordering::Relaxed)
    }

    pub fn bytes_read(&self) -> u64 {
        self.shared.bytes_read.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.shared.bytes_written.load(Ordering::Relaxed)
    }

    /// Theoretical time to put `len` bytes on the wire at the configured baud.
    pub fn transmit_time(&self, len: usize) -> Duration {
        Duration::from_secs_f64(len as f64 * 8.0 / self.config.baud_rate.max(1) as f64)
    }

    /// Log misuse of a closed mock and fail if strict.
    fn check_open(&self, operation: &str) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }
        tlog!(
            "[mock:{}] Mocked {} called but mocked serial connection is closed!",
            self.config.port,
            operation
        );
        if self.config.strict {
            return Err(SerialError::Closed(self.config.port.clone()));
        }
        Ok(())
    }

    fn spawn_tasks(&self) -> Result<MockTasks> {
        let (wrote_tx, wrote_rx) = unbounded::<Vec<u8>>();
        let stream_running = Arc::new(AtomicBool::new(true));

        let response = {
            let shared = self.shared.clone();
            let map = self.response_map.clone();
            let generator = self.generator.clone();
            thread::Builder::new()
                .name(format!("mock-response-{}", self.config.port))
                .spawn(move || run_response_task(shared, map, generator, wrote_rx))
                .map_err(|e| SerialError::TransportIo(format!("Failed to spawn response task: {}", e)))?
        };

        let stream = {
            let shared = self.shared.clone();
            let content = self.config.stream_content.clone();
            let running = stream_running.clone();
            thread::Builder::new()
                .name(format!("mock-stream-{}", self.config.port))
                .spawn(move || run_stream_task(shared, content, running))
                .map_err(|e| SerialError::TransportIo(format!("Failed to spawn stream task: {}", e)))?
        };

        Ok(MockTasks {
            wrote_tx,
            stream_running,
            response,
            stream,
        })
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.config.port
    }

    fn open(&self) -> Result<()> {
        let mut tasks = self
            .tasks
            .lock()
            .map_err(|e| SerialError::TransportIo(format!("Mock state poisoned: {}", e)))?;
        if tasks.is_some() {
            return Ok(());
        }
        tlog!("[mock:{}] Opening mocked serial connection", self.config.port);
        *tasks = Some(self.spawn_tasks()?);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let tasks = self
            .tasks
            .lock()
            .map_err(|e| SerialError::TransportIo(format!("Mock state poisoned: {}", e)))?
            .take();
        let Some(tasks) = tasks else {
            return Ok(());
        };

        tlog!("[mock:{}] Closing mocked serial connection", self.config.port);
        tasks.stream_running.store(false, Ordering::SeqCst);
        // Dropping the last sender ends the response task
        drop(tasks.wrote_tx);
        if tasks.response.join().is_err() {
            tlog!("[mock:{}] Response task panicked", self.config.port);
        }
        if tasks.stream.join().is_err() {
            tlog!("[mock:{}] Stream task panicked", self.config.port);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.tasks.lock().map(|t| t.is_some()).unwrap_or(false)
    }

    fn read(&self, n: usize) -> Result<Vec<u8>> {
        self.check_open("READ")?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let timeout = self.config.read_timeout;
        let deadline = Instant::now() + timeout;
        let mut buf = self
            .shared
            .read_buf
            .lock()
            .map_err(|e| SerialError::TransportIo(format!("Read buffer poisoned: {}", e)))?;
        while buf.len() < n {
            let now = Instant::now();
            if now >= deadline {
                return Err(SerialError::Timeout(timeout));
            }
            let (guard, _) = self
                .shared
                .data_ready
                .wait_timeout(buf, deadline - now)
                .map_err(|e| SerialError::TransportIo(format!("Read buffer poisoned: {}", e)))?;
            buf = guard;
        }

        let out: Vec<u8> = buf.drain(..n).collect();
        self.shared.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
        Ok(out)
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        let available = self.in_waiting()?;
        self.read(available)
    }

    fn write(&self, data: &[u8]) -> Result<usize> {
        if self.is_open() {
            let delay = self.transmit_time(data.len());
            if delay > MIN_SIMULATED_DELAY {
                thread::sleep(delay);
            }
        } else {
            self.check_open("WRITE")?;
        }

        let wrote_tx = self
            .tasks
            .lock()
            .ok()
            .and_then(|t| t.as_ref().map(|t| t.wrote_tx.clone()));
        if let Some(tx) = wrote_tx {
            let _ = tx.send(data.to_vec());
        }
        self.shared
            .bytes_written
            .fetch_add(data.len() as u64, Ordering::Relaxed);
        Ok(data.len())
    }

    fn in_waiting(&self) -> Result<usize> {
        self.shared
            .read_buf
            .lock()
            .map(|buf| buf.len())
            .map_err(|e| SerialError::TransportIo(format!("Read buffer poisoned: {}", e)))
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Answer each written request until the mock closes
fn run_response_task(
    shared: Arc<Shared>,
    map: Arc<HashMap<Vec<u8>, Vec<u8>>>,
    generator: Arc<dyn ResponseGenerator>,
    wrote_rx: Receiver<Vec<u8>>,
) {
    while let Ok(request) = wrote_rx.recv() {
        let response = match map.get(&request) {
            Some(mapped) => mapped.clone(),
            None => generator.respond(&request),
        };
        if !response.is_empty() {
            shared.push(&response);
        }
    }
}

/// Replay `content` cyclically at the current stream rate until stopped
fn run_stream_task(shared: Arc<Shared>, content: Vec<u8>, running: Arc<AtomicBool>) {
    let mut index = 0usize;
    let mut t_prev = Instant::now();

    while running.load(Ordering::SeqCst) {
        let bps = shared.stream_bps.load(Ordering::Relaxed);
        if bps == 0 {
            // Keep the reference time current so re-enabling does not dump
            // the whole idle period at once
            t_prev = Instant::now();
            thread::sleep(STREAM_IDLE);
            continue;
        }
        if content.is_empty() {
            tlog!(
                "[mock:{}] Stream enabled at {} bps but stream content is empty, stopping stream",
                shared.port,
                bps
            );
            return;
        }

        let elapsed = t_prev.elapsed().as_secs_f64();
        let n_bytes = (bps as f64 * elapsed / 8.0) as usize;
        if n_bytes > 0 {
            let chunk: Vec<u8> = (0..n_bytes)
                .map(|_| {
                    let byte = content[index];
                    index = (index + 1) % content.len();
                    byte
                })
                .collect();
            shared.push(&chunk);
            // Advance by exactly the time those bytes represent so fractional
            // bytes carry over to the next tick
            t_prev += Duration::from_secs_f64(n_bytes as f64 * 8.0 / bps as f64);
        }
        thread::sleep(STREAM_TICK);
    }
}
