// src/io/mod.rs
//
// Byte-level transports: the Transport contract, the serialport binding and
// the mock serial device used by tests.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod mock;
#[cfg(not(target_os = "ios"))]
pub mod serial;
pub mod transport;

pub use mock::{Echo, MockConfig, MockTransport, NoResponse, ResponseGenerator};
#[cfg(not(target_os = "ios"))]
pub use serial::{list_ports, Parity, SerialConfig, SerialPortInfo, SerialPortTransport};
pub use transport::Transport;

/// Nanoseconds since the Unix epoch.
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
