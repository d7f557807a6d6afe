//! Diagnostic dumps of buffer contents
//!
//! The buffer never logs its contents on its own. Callers hand a
//! [`DiagnosticSink`] to [`ByteBuffer::hexlike`], [`ByteBuffer::textlike`] or
//! [`ByteBuffer::print_storage`]; [`TracingSink`] forwards to `tracing`.
//!
//! ```text
//! STORAGE_SIZE: 20
//! 01 02 03 04 05 06 07 08 | 09 0A 0B 0C 0D 0E 0F 10
//! 11 12 13 14
//! ```

use std::fmt::Write;

use tracing::Level;

use crate::buffer::ByteBuffer;

/// Receiver for formatted diagnostic output
pub trait DiagnosticSink {
    /// Whether messages at `level` would be recorded
    fn enabled(&self, level: Level) -> bool;

    fn emit(&self, level: Level, message: &str);
}

/// Sink that emits `tracing` events under the `wirebuf::dump` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::ERROR => tracing::enabled!(target: "wirebuf::dump", Level::ERROR),
            Level::WARN => tracing::enabled!(target: "wirebuf::dump", Level::WARN),
            Level::INFO => tracing::enabled!(target: "wirebuf::dump", Level::INFO),
            Level::DEBUG => tracing::enabled!(target: "wirebuf::dump", Level::DEBUG),
            _ => tracing::enabled!(target: "wirebuf::dump", Level::TRACE),
        }
    }

    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "wirebuf::dump", "{}", message),
            Level::WARN => tracing::warn!(target: "wirebuf::dump", "{}", message),
            Level::INFO => tracing::info!(target: "wirebuf::dump", "{}", message),
            Level::DEBUG => tracing::debug!(target: "wirebuf::dump", "{}", message),
            _ => tracing::trace!(target: "wirebuf::dump", "{}", message),
        }
    }
}

/// Hex dump: 16 bytes per row, `| ` before the ninth byte of a row
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = format!("STORAGE_SIZE: {}", bytes.len());
    for row in bytes.chunks(16) {
        out.push('\n');
        for (i, byte) in row.iter().enumerate() {
            if i == 8 {
                out.push_str("| ");
            }
            let _ = write!(out, "{:02X} ", byte);
        }
        // Drop the trailing separator space
        out.pop();
    }
    out
}

/// Text dump: printable ASCII as-is, everything else as `.`
pub fn format_text(bytes: &[u8]) -> String {
    let text: String = bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
    format!("STORAGE_SIZE: {}\n{}", bytes.len(), text)
}

/// Decimal dump: every byte followed by ` - `
pub fn format_storage(bytes: &[u8]) -> String {
    let mut out = format!("STORAGE_SIZE: {}\n", bytes.len());
    for byte in bytes {
        let _ = write!(out, "{} - ", byte);
    }
    out
}

impl ByteBuffer {
    /// Hex dump of the written bytes at debug level
    pub fn hexlike(&self, sink: &dyn DiagnosticSink) {
        if sink.enabled(Level::DEBUG) {
            sink.emit(Level::DEBUG, &format_hex(self.contents()));
        }
    }

    /// Printable-character dump of the written bytes at debug level
    pub fn textlike(&self, sink: &dyn DiagnosticSink) {
        if sink.enabled(Level::DEBUG) {
            sink.emit(Level::DEBUG, &format_text(self.contents()));
        }
    }

    /// Decimal dump of the written bytes at debug level
    pub fn print_storage(&self, sink: &dyn DiagnosticSink) {
        if sink.enabled(Level::DEBUG) {
            sink.emit(Level::DEBUG, &format_storage(self.contents()));
        }
    }
}
