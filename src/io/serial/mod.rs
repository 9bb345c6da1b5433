// src/io/serial/mod.rs
//
// Serial port transport for real hardware.
//
// Features:
// - Lazy open with full line settings (baud, data bits, parity, stop bits)
// - Independent read and write handles
// - Port enumeration

pub mod port;
pub(crate) mod utils;

pub use port::{list_ports, SerialConfig, SerialPortInfo, SerialPortTransport};
pub use utils::Parity;
