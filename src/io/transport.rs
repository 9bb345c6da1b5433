// src/io/transport.rs
//
// The capability surface every byte transport offers to a ConnectionManager.

use crate::error::Result;

/// A blocking, boundary-less byte transport.
///
/// Implementations are shared between exactly one reader loop and one writer
/// loop, so every method takes `&self` and must be safe to call from both
/// threads at once. Bytes written by the remote end become readable here in
/// order.
pub trait Transport: Send + Sync {
    /// Human-readable identifier used in log lines (usually the port name).
    fn name(&self) -> &str;

    /// Open the transport. Opening an already open transport is a no-op.
    fn open(&self) -> Result<()>;

    /// Close the transport. Closing a closed transport is a no-op.
    fn close(&self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Read exactly `n` bytes, blocking up to the transport's read timeout.
    /// Never returns a short read: fails with `SerialError::Timeout` instead.
    fn read(&self, n: usize) -> Result<Vec<u8>>;

    /// Drain whatever is currently buffered without blocking.
    fn read_all(&self) -> Result<Vec<u8>>;

    /// Write all of `data`, returning the number of bytes written.
    fn write(&self, data: &[u8]) -> Result<usize>;

    /// Number of bytes buffered and ready to read.
    fn in_waiting(&self) -> Result<usize>;
}
