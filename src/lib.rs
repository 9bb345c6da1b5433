// src/lib.rs
//
// Buffered serial links for lab instruments.
//
// - `io`: byte transports (serial port, mock device) behind the `Transport` trait
// - `manager`: ConnectionManager, background reader/writer threads over one transport
// - `framer`: COBS and length+pattern framing, and the FrameCodec that runs them
// - `config`: TOML link configuration

#[macro_use]
mod logging;

#[cfg(not(target_os = "ios"))]
pub mod config;
pub mod error;
pub mod framer;
pub mod io;
pub mod manager;

#[cfg(not(target_os = "ios"))]
pub use config::LinkConfig;
pub use error::{FrameCorruption, Result, SerialError};
pub use framer::{DroppedSegment, FrameCodec, FrameResult, FrameStatsSnapshot, Framer, FramingEncoding};
pub use io::{Echo, MockConfig, MockTransport, NoResponse, ResponseGenerator, Transport};
#[cfg(not(target_os = "ios"))]
pub use io::{list_ports, Parity, SerialConfig, SerialPortInfo, SerialPortTransport};
pub use logging::{init_file_logging, stop_file_logging};
pub use manager::{ConnectionManager, ManagerConfig, MessageReceiver, SentConfirmation, TimestampedMessage};
