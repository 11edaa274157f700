// Copyright (c) 2023-2026 Provable Systems

//! Untrusted-side half of the boundary: the outbound diagnostic channel.
//!
//! Diagnostics are the one data flow that leaves the trusted core. The
//! trusted side stages the full message (terminator included) into a
//! [`HostScratch`], the analog of the hardware SDK's ocall scratch
//! allocation, and the host dispatches it to whichever handler is
//! registered. The channel is fire-and-forget: nothing flows back in, and
//! failures never affect the operation that produced the text.

use crate::{trusted::check_enclave_pointer, BoundaryError};
use ra_attest_core::RaStatus;
use std::sync::RwLock;

/// Host-side scratch holding one outbound diagnostic message.
///
/// Sized exactly to the message plus its NUL terminator, with the size
/// computation overflow-checked before allocation. A sizing or allocation
/// failure aborts the ocall without any partial write.
pub struct HostScratch {
    buf: Vec<u8>,
}

impl HostScratch {
    /// Stage `text` for crossing out of the trusted core.
    ///
    /// The source must originate inside the boundary; the staged copy
    /// includes a trailing NUL, mirroring the C string the hardware ocall
    /// carries.
    pub fn for_text(text: &str) -> Result<Self, BoundaryError> {
        check_enclave_pointer(text.as_ptr() as usize, text.len())?;
        let total = text
            .len()
            .checked_add(1)
            .ok_or(BoundaryError::SizeOverflow)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(total)
            .map_err(|_| BoundaryError::AllocationFailed)?;
        buf.extend_from_slice(text.as_bytes());
        buf.push(0);
        Ok(Self { buf })
    }

    /// The staged bytes, terminator included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The message text without its terminator.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.buf.len() - 1]).unwrap_or("")
    }
}

type DiagnosticHandler = Box<dyn Fn(&str) + Send + Sync>;

static HANDLER: RwLock<Option<DiagnosticHandler>> = RwLock::new(None);

/// Install the host's diagnostic text handler, replacing any previous one.
/// Without a handler, messages are forwarded to the `log` facade.
pub fn set_diagnostic_handler<F>(handler: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    if let Ok(mut guard) = HANDLER.write() {
        *guard = Some(Box::new(handler));
    }
}

/// Deliver one staged diagnostic message to the host. Best effort; the
/// returned status is informational and carries no application data.
pub fn ocall_diagnostic_text(scratch: &HostScratch) -> RaStatus {
    match HANDLER.read() {
        Ok(guard) => {
            match &*guard {
                Some(handler) => handler(scratch.text()),
                None => log::info!(target: "enclave", "{}", scratch.text()),
            }
            RaStatus::Success
        }
        Err(_) => RaStatus::Unexpected,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scratch_is_sized_to_text_plus_terminator() {
        let scratch = HostScratch::for_text("attested").unwrap();
        assert_eq!(scratch.as_bytes().len(), 9);
        assert_eq!(scratch.as_bytes()[8], 0);
        assert_eq!(scratch.text(), "attested");
    }

    #[test]
    fn empty_text_still_carries_terminator() {
        let scratch = HostScratch::for_text("").unwrap();
        assert_eq!(scratch.as_bytes(), &[0]);
        assert_eq!(scratch.text(), "");
    }
}
