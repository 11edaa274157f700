// Copyright (c) 2023-2026 Provable Systems

//! The outbound diagnostic sink.
//!
//! The one data flow that leaves the trusted core on its own initiative.
//! Messages are staged through the boundary scratch discipline and handed
//! to the host; delivery is best effort and a failure never affects the
//! operation that produced the message.

use crate::hex::HexBuffer;
use ra_enclave_boundary::untrusted::{ocall_diagnostic_text, HostScratch};
use std::sync::Mutex;

/// Longest diagnostic message the sink will emit; longer text is truncated
/// at a character boundary rather than rejected.
const MAX_DIAG_LEN: usize = 8192;

/// Serializes diagnostic emission and owns the shared hex render buffer.
pub struct DiagnosticSink {
    hex: Mutex<HexBuffer>,
}

impl DiagnosticSink {
    /// A sink with an empty render buffer.
    pub const fn new() -> Self {
        Self {
            hex: Mutex::new(HexBuffer::new()),
        }
    }

    /// Emit one line of diagnostic text.
    pub fn emit(&self, text: &str) {
        let mut end = text.len().min(MAX_DIAG_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if let Ok(scratch) = HostScratch::for_text(&text[..end]) {
            let _ = ocall_diagnostic_text(&scratch);
        }
    }

    /// Emit a labeled lowercase-hex dump of `bytes`.
    pub fn emit_hex(&self, label: &str, bytes: &[u8]) {
        let line = match self.hex.lock() {
            Ok(mut buf) => format!("{label}: {}", buf.render(bytes)),
            // A crashed emitter must not take diagnostics down with it.
            Err(poisoned) => format!("{label}: {}", poisoned.into_inner().render(bytes)),
        };
        self.emit(&line);
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn long_text_is_truncated_on_a_char_boundary() {
        let sink = DiagnosticSink::new();
        // Multi-byte character straddling the limit must not panic.
        let mut text = "a".repeat(MAX_DIAG_LEN - 1);
        text.push('\u{00e9}');
        text.push_str("tail");
        sink.emit(&text);
    }

    #[test]
    fn hex_emission_survives_reuse() {
        let sink = DiagnosticSink::new();
        sink.emit_hex("g_a", &[0xAB; 64]);
        sink.emit_hex("g_a", &[0x01]);
    }
}
