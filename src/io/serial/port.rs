// src/io/serial/port.rs
//
// Transport implementation over a real serial port (serialport crate).
// The port handle is cloned once on open so the reader and writer loops of a
// ConnectionManager never wait on each other.

use std::io::{Read, Write};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serialport::SerialPort;

use super::utils::{to_serialport_data_bits, to_serialport_stop_bits, Parity};
use crate::error::{Result, SerialError};
use crate::io::Transport;

fn default_baud_rate() -> u32 {
    115_200
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_read_timeout_ms() -> u64 {
    1000
}

/// Serial port line configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: Parity,
    /// Upper bound for a blocking `read(n)`
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: Parity::None,
            read_timeout_ms: default_read_timeout_ms(),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port.is_empty() {
            return Err(SerialError::Config("serial port name is empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(SerialError::Config("baud rate must be positive".to_string()));
        }
        if to_serialport_data_bits(self.data_bits).is_none() {
            return Err(SerialError::Config(format!(
                "unsupported data bits: {}",
                self.data_bits
            )));
        }
        if to_serialport_stop_bits(self.stop_bits).is_none() {
            return Err(SerialError::Config(format!(
                "unsupported stop bits: {}",
                self.stop_bits
            )));
        }
        Ok(())
    }

    /// `115200 8N1` style summary for log lines
    pub fn describe(&self) -> String {
        format!(
            "{} {}{}{}",
            self.baud_rate,
            self.data_bits,
            self.parity.letter(),
            self.stop_bits
        )
    }
}

/// A serial port driven through the serialport crate.
///
/// The port is opened lazily by `open()` (normally from
/// `ConnectionManager::start`). Reads and writes go through separate cloned
/// handles.
pub struct SerialPortTransport {
    config: SerialConfig,
    reader: Mutex<Option<Box<dyn SerialPort>>>,
    writer: Mutex<Option<Box<dyn SerialPort>>>,
}

impl SerialPortTransport {
    pub fn new(config: SerialConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reader: Mutex::new(None),
            writer: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn unavailable(&self, reason: impl ToString) -> SerialError {
        SerialError::TransportUnavailable {
            port: self.config.port.clone(),
            reason: reason.to_string(),
        }
    }

    fn closed(&self) -> SerialError {
        SerialError::Closed(self.config.port.clone())
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> SerialError {
    SerialError::TransportIo(format!("Port mutex poisoned: {}", e))
}

impl Transport for SerialPortTransport {
    fn name(&self) -> &str {
        &self.config.port
    }

    fn open(&self) -> Result<()> {
        let mut reader = self.reader.lock().map_err(poisoned)?;
        if reader.is_some() {
            return Ok(());
        }

        let data_bits = to_serialport_data_bits(self.config.data_bits)
            .ok_or_else(|| self.unavailable("unsupported data bits"))?;
        let stop_bits = to_serialport_stop_bits(self.config.stop_bits)
            .ok_or_else(|| self.unavailable("unsupported stop bits"))?;

        let port = serialport::new(&self.config.port, self.config.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(self.config.parity.into())
            .timeout(self.config.read_timeout())
            .open()
            .map_err(|e| self.unavailable(e))?;
        let write_half = port.try_clone().map_err(|e| self.unavailable(e))?;

        tlog!(
            "[serial:{}] Opened at {}",
            self.config.port,
            self.config.describe()
        );

        *self.writer.lock().map_err(poisoned)? = Some(write_half);
        *reader = Some(port);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let had_reader = self.reader.lock().map_err(poisoned)?.take().is_some();
        self.writer.lock().map_err(poisoned)?.take();
        if had_reader {
            tlog!("[serial:{}] Closed", self.config.port);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.reader.lock().map(|r| r.is_some()).unwrap_or(false)
    }

    fn read(&self, n: usize) -> Result<Vec<u8>> {
        let mut guard = self.reader.lock().map_err(poisoned)?;
        let port = guard.as_mut().ok_or_else(|| self.closed())?;
        let mut buf = vec![0u8; n];
        match port.read_exact(&mut buf) {
            Ok(()) => Ok(buf),
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Err(SerialError::Timeout(self.config.read_timeout()))
            }
            Err(e) => Err(SerialError::TransportIo(format!(
                "Read error on {}: {}",
                self.config.port, e
            ))),
        }
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        let available = self.in_waiting()?;
        if available == 0 {
            return Ok(Vec::new());
        }
        self.read(available)
    }

    fn write(&self, data: &[u8]) -> Result<usize> {
        let mut guard = self.writer.lock().map_err(poisoned)?;
        let port = guard.as_mut().ok_or_else(|| self.closed())?;
        port.write_all(data)
            .and_then(|_| port.flush())
            .map_err(|e| SerialError::TransportIo(format!("Write error on {}: {}", self.config.port, e)))?;
        Ok(data.len())
    }

    fn in_waiting(&self) -> Result<usize> {
        let guard = self.reader.lock().map_err(poisoned)?;
        let port = guard.as_ref().ok_or_else(|| self.closed())?;
        port.bytes_to_read()
            .map(|n| n as usize)
            .map_err(|e| SerialError::TransportIo(format!("Poll error on {}: {}", self.config.port, e)))
    }
}

/// Information about an available serial port
#[derive(Clone, Debug, Serialize)]
pub struct SerialPortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

/// List available serial ports
///
/// On macOS, filters out /dev/tty.* devices and only shows /dev/cu.* devices.
/// The tty devices block on open waiting for carrier detect.
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports()
        .map_err(|e| SerialError::TransportIo(format!("Failed to enumerate ports: {}", e)))?;

    Ok(ports
        .into_iter()
        .filter(|_p| {
            #[cfg(target_os = "macos")]
            {
                !_p.port_name.starts_with("/dev/tty.")
            }
            #[cfg(not(target_os = "macos"))]
            {
                true
            }
        })
        .map(|p| {
            let (port_type, manufacturer, product, serial_number, vid, pid) = match p.port_type {
                serialport::SerialPortType::UsbPort(info) => (
                    "USB".to_string(),
                    info.manufacturer,
                    info.product,
                    info.serial_number,
                    Some(info.vid),
                    Some(info.pid),
                ),
                serialport::SerialPortType::BluetoothPort => {
                    ("Bluetooth".to_string(), None, None, None, None, None)
                }
                serialport::SerialPortType::PciPort => {
                    ("PCI".to_string(), None, None, None, None, None)
                }
                serialport::SerialPortType::Unknown => {
                    ("Unknown".to_string(), None, None, None, None, None)
                }
            };
            SerialPortInfo {
                port_name: p.port_name,
                port_type,
                manufacturer,
                product,
                serial_number,
                vid,
                pid,
            }
        })
        .collect())
}
