// Copyright (c) 2023-2026 Provable Systems

//! Marshaling discipline for the trust boundary.
//!
//! The hardware notion of "inside" and "outside" the enclave is re-expressed
//! here as a process-wide protected address range (see [`range`]): the host
//! loader registers the trusted core's range once, and every boundary
//! pointer is then validated for provenance before use. When no range is
//! registered the crate runs in simulation mode and provenance checks are
//! vacuous, mirroring the simulator build of the hardware SDK. Both modes
//! share the same copy discipline: validate, fence, deep-copy, operate on
//! locals only, copy back, release on all paths.

#![deny(missing_docs)]

mod range;
pub mod trusted;
pub mod untrusted;

pub use crate::range::{
    is_outside_enclave, is_within_enclave, set_protected_range, speculation_fence, ProtectedRange,
};

use displaydoc::Display;
use ra_attest_core::{
    Ec256Public, Ec256Signature, MacTag, Msg1, Msg2, QuoteNonce, RaStatus, Report, ReportBody,
    ReportData, Sha256Hash, TargetInfo,
};

/// Marker for plain-old-data types that may be copied bitwise across the
/// trust boundary.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` or `#[repr(transparent)]` with no
/// uninitialized padding whose contents could leak, and every bit pattern
/// of the underlying bytes must be a valid value (validation of semantic
/// content happens after the copy, inside the boundary).
pub unsafe trait BoundarySafe: Copy {}

// Closed enums (RaStatus, KeyType) are deliberately absent: an inbound
// block can carry any bit pattern, so statuses and selectors cross as raw
// u32 discriminants and are interpreted after the copy.
unsafe impl BoundarySafe for u32 {}
unsafe impl BoundarySafe for i32 {}
unsafe impl BoundarySafe for u64 {}
unsafe impl BoundarySafe for Ec256Public {}
unsafe impl BoundarySafe for Ec256Signature {}
unsafe impl BoundarySafe for MacTag {}
unsafe impl BoundarySafe for Sha256Hash {}
unsafe impl BoundarySafe for QuoteNonce {}
unsafe impl BoundarySafe for TargetInfo {}
unsafe impl BoundarySafe for ReportData {}
unsafe impl BoundarySafe for ReportBody {}
unsafe impl BoundarySafe for Report {}
unsafe impl BoundarySafe for Msg1 {}
unsafe impl BoundarySafe for Msg2 {}

/// A boundary marshaling failure.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum BoundaryError {
    /// A required boundary pointer was null
    NullPointer,
    /// A pointer does not lie on the required side of the boundary
    BoundaryViolation,
    /// A size computation overflowed
    SizeOverflow,
    /// A caller-declared size exceeds the boundary copy limit
    ExceedsLimit,
    /// Boundary-local staging memory could not be allocated
    AllocationFailed,
    /// The copy back into the caller's buffer failed
    CopyOut,
}

impl From<BoundaryError> for RaStatus {
    fn from(src: BoundaryError) -> RaStatus {
        match src {
            BoundaryError::NullPointer
            | BoundaryError::BoundaryViolation
            | BoundaryError::SizeOverflow
            | BoundaryError::ExceedsLimit => RaStatus::InvalidParameter,
            BoundaryError::AllocationFailed => RaStatus::OutOfMemory,
            BoundaryError::CopyOut => RaStatus::Unexpected,
        }
    }
}
