// Copyright (c) 2023-2026 Provable Systems

//! A reusable lowercase-hex render buffer.
//!
//! Diagnostic messages routinely hex-dump keys and messages of varying
//! sizes. Rather than allocating per dump, one buffer is kept around and
//! grown in whole-KiB steps, so steady-state rendering allocates nothing.

/// Growth granularity for the render buffer.
const HEX_BUFFER_STEP: usize = 1024;

/// An owned render buffer for lowercase hex.
///
/// Not synchronized itself; the diagnostic sink serializes access.
pub struct HexBuffer {
    buf: String,
}

impl HexBuffer {
    /// An empty buffer with no storage reserved yet.
    pub const fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Render `bytes` as lowercase hex, reusing (and growing, in whole-KiB
    /// steps) the internal storage.
    pub fn render(&mut self, bytes: &[u8]) -> &str {
        let needed = bytes.len() * 2;
        if self.buf.capacity() < needed {
            let rounded = needed.div_ceil(HEX_BUFFER_STEP) * HEX_BUFFER_STEP;
            self.buf.reserve_exact(rounded - self.buf.len());
        }
        self.buf.clear();
        for byte in bytes {
            self.buf.push(char::from_digit((byte >> 4) as u32, 16).unwrap_or('0'));
            self.buf.push(char::from_digit((byte & 0xF) as u32, 16).unwrap_or('0'));
        }
        &self.buf
    }
}

impl Default for HexBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_lowercase_pairs() {
        let mut buf = HexBuffer::new();
        assert_eq!(buf.render(&[0x00, 0x0F, 0xAB, 0xFF]), "000fabff");
    }

    #[test]
    fn empty_input_renders_empty() {
        let mut buf = HexBuffer::new();
        assert_eq!(buf.render(&[]), "");
    }

    #[test]
    fn rerender_replaces_previous_contents() {
        let mut buf = HexBuffer::new();
        buf.render(&[0xAA; 512]);
        assert_eq!(buf.render(&[0x01]), "01");
    }

    #[test]
    fn storage_grows_in_kib_steps() {
        let mut buf = HexBuffer::new();
        buf.render(&[0x5A; 1]);
        assert_eq!(buf.buf.capacity(), HEX_BUFFER_STEP);
        buf.render(&[0x5A; 513]);
        assert_eq!(buf.buf.capacity(), 2 * HEX_BUFFER_STEP);
        // 1025 bytes render to 2050 chars, three steps.
        let rendered = buf.render(&[0x5A; 1025]).to_owned();
        assert_eq!(rendered.len(), 2050);
        assert!(rendered.chars().all(|c| c == '5' || c == 'a'));
        assert_eq!(buf.buf.capacity(), 3 * HEX_BUFFER_STEP);
    }
}
