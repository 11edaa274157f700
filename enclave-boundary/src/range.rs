// Copyright (c) 2023-2026 Provable Systems

//! The simulated protected address range and the speculation fence.

use std::sync::RwLock;

/// An address range owned by the trusted core, the software analog of the
/// hardware ELRANGE.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProtectedRange {
    base: usize,
    size: usize,
}

impl ProtectedRange {
    /// An unset range: simulation mode, provenance checks are vacuous.
    pub const EMPTY: ProtectedRange = ProtectedRange { base: 0, size: 0 };

    /// A range covering `size` bytes starting at `base`.
    pub fn new(base: usize, size: usize) -> Self {
        Self { base, size }
    }

    /// Whether a range has been registered.
    pub fn is_set(&self) -> bool {
        self.size != 0
    }

    /// True when `[addr, addr + len)` shares no byte with the protected
    /// range. Unset ranges report everything as outside.
    pub fn is_outside(&self, addr: usize, len: usize) -> bool {
        if !self.is_set() {
            return true;
        }
        let Some(end) = addr.checked_add(len) else {
            return false;
        };
        let Some(range_end) = self.base.checked_add(self.size) else {
            return false;
        };
        end <= self.base || addr >= range_end
    }

    /// True when `[addr, addr + len)` lies entirely inside the protected
    /// range. Unset ranges report everything as within.
    pub fn is_within(&self, addr: usize, len: usize) -> bool {
        if !self.is_set() {
            return true;
        }
        let Some(end) = addr.checked_add(len) else {
            return false;
        };
        let Some(range_end) = self.base.checked_add(self.size) else {
            return false;
        };
        addr >= self.base && end <= range_end
    }
}

static RANGE: RwLock<ProtectedRange> = RwLock::new(ProtectedRange::EMPTY);

/// Register the trusted core's address range. Called once by the host
/// loader before the first boundary call; calling again replaces the range
/// (used by tests).
pub fn set_protected_range(range: ProtectedRange) {
    if let Ok(mut guard) = RANGE.write() {
        *guard = range;
    }
}

/// Whether `[addr, addr + len)` lies entirely outside the trusted core.
///
/// Fails closed: a poisoned lock reports "not outside", which callers
/// treat as a boundary violation.
pub fn is_outside_enclave(addr: usize, len: usize) -> bool {
    RANGE
        .read()
        .map(|range| range.is_outside(addr, len))
        .unwrap_or(false)
}

/// Whether `[addr, addr + len)` lies entirely inside the trusted core.
pub fn is_within_enclave(addr: usize, len: usize) -> bool {
    RANGE
        .read()
        .map(|range| range.is_within(addr, len))
        .unwrap_or(false)
}

/// Serialize speculative execution past a completed pointer check.
///
/// Must be issued after validating a boundary pointer and before the first
/// dereference; the validate-fence-use order is a correctness requirement,
/// not a performance knob.
#[inline(always)]
pub fn speculation_fence() {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::x86_64::_mm_lfence();
    }
    #[cfg(not(target_arch = "x86_64"))]
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}
