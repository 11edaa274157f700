// Copyright (c) 2023-2026 Provable Systems

//! Trusted-side marshaling primitives.
//!
//! Each boundary entry point is built from the same small vocabulary:
//! validate the opaque parameter block ([`read_param_block`]), deep-copy
//! each `[in]` field ([`copy_in`], [`copy_in_opt`], [`copy_in_bytes`]),
//! stage each `[out]` field in boundary-local memory ([`OutSlot`]), run the
//! inner operation against locals only, then commit the outs. Staging
//! storage is owned, so it is released on every exit path without
//! bookkeeping. Every validation is followed by a speculation fence before
//! the first dereference.

use crate::{
    is_outside_enclave, is_within_enclave, speculation_fence, BoundaryError, BoundarySafe,
};
use core::ffi::c_void;
use core::ptr;
use ra_attest_core::RaStatus;

/// Upper bound on any single boundary-crossing copy. Caller-declared sizes
/// above this are rejected before allocation.
pub const MAX_BOUNDARY_COPY: usize = 1 << 20;

fn check_user_range(addr: usize, len: usize) -> Result<(), BoundaryError> {
    if addr == 0 {
        return Err(BoundaryError::NullPointer);
    }
    if !is_outside_enclave(addr, len) {
        return Err(BoundaryError::BoundaryViolation);
    }
    Ok(())
}

/// Validate and copy an opaque parameter block into the boundary.
///
/// The pointer must be non-null and lie entirely outside the trusted core;
/// rejection happens before any allocation or dereference.
pub fn read_param_block<P: BoundarySafe>(pms: *const c_void) -> Result<P, BoundaryError> {
    let pms = pms as *const P;
    check_user_range(pms as usize, core::mem::size_of::<P>())?;
    speculation_fence();
    Ok(unsafe { ptr::read_unaligned(pms) })
}

/// Deep-copy a required `[in]` field from untrusted memory.
pub fn copy_in<T: BoundarySafe>(user: *const T) -> Result<T, BoundaryError> {
    check_user_range(user as usize, core::mem::size_of::<T>())?;
    speculation_fence();
    Ok(unsafe { ptr::read_unaligned(user) })
}

/// Deep-copy an optional `[in]` field: null means absent, non-null must lie
/// outside the trusted core.
pub fn copy_in_opt<T: BoundarySafe>(user: *const T) -> Result<Option<T>, BoundaryError> {
    if user.is_null() {
        return Ok(None);
    }
    copy_in(user).map(Some)
}

/// Deep-copy a variable-length `[in]` buffer, bounding the caller-declared
/// length and modeling allocation failure explicitly.
pub fn copy_in_bytes(user: *const u8, len: usize) -> Result<Vec<u8>, BoundaryError> {
    if len > MAX_BOUNDARY_COPY {
        return Err(BoundaryError::ExceedsLimit);
    }
    check_user_range(user as usize, len)?;
    speculation_fence();
    let mut local = Vec::new();
    local
        .try_reserve_exact(len)
        .map_err(|_| BoundaryError::AllocationFailed)?;
    unsafe {
        ptr::copy_nonoverlapping(user, local.as_mut_ptr(), len);
        local.set_len(len);
    }
    Ok(local)
}

/// Copy a staged variable-length buffer back into the caller's `[out]`
/// pointer. The declared length must match the staged length exactly.
pub fn copy_out_bytes(user: *mut u8, len: usize, src: &[u8]) -> Result<(), BoundaryError> {
    if src.len() != len {
        return Err(BoundaryError::SizeOverflow);
    }
    check_user_range(user as usize, len)?;
    speculation_fence();
    unsafe {
        ptr::copy_nonoverlapping(src.as_ptr(), user, len);
    }
    Ok(())
}

/// Validate a pointer that must originate inside the trusted core, used on
/// the outbound diagnostic path.
pub fn check_enclave_pointer(addr: usize, len: usize) -> Result<(), BoundaryError> {
    if addr == 0 {
        return Err(BoundaryError::NullPointer);
    }
    if !is_within_enclave(addr, len) {
        return Err(BoundaryError::BoundaryViolation);
    }
    Ok(())
}

/// Overflow-checked total size for a header plus a caller-declared trailer,
/// capped at [`MAX_BOUNDARY_COPY`].
pub fn checked_layout(header: usize, trailer: usize) -> Result<usize, BoundaryError> {
    let total = header
        .checked_add(trailer)
        .ok_or(BoundaryError::SizeOverflow)?;
    if total > MAX_BOUNDARY_COPY {
        return Err(BoundaryError::ExceedsLimit);
    }
    Ok(total)
}

/// Validate and write a single scalar result into the caller's block, used
/// for the `retval` field every parameter block carries.
pub fn poke<T: BoundarySafe>(user: *mut T, value: T) -> Result<(), BoundaryError> {
    check_user_range(user as usize, core::mem::size_of::<T>())?;
    speculation_fence();
    unsafe {
        ptr::write_unaligned(user, value);
    }
    Ok(())
}

/// A zero-initialized boundary-local staging value bound to a caller's
/// `[out]` pointer.
///
/// The inner operation writes through [`OutSlot::as_mut`]/[`OutSlot::set`];
/// [`OutSlot::commit`] performs the single copy back across the boundary.
/// Dropping without committing writes nothing to the caller.
pub struct OutSlot<T: BoundarySafe> {
    local: T,
    user: *mut T,
}

impl<T: BoundarySafe + Default> OutSlot<T> {
    /// Stage a required `[out]` field.
    pub fn stage(user: *mut T) -> Result<Self, BoundaryError> {
        check_user_range(user as usize, core::mem::size_of::<T>())?;
        speculation_fence();
        Ok(Self {
            local: T::default(),
            user,
        })
    }

    /// Stage an optional `[out]` field; null means the caller declined it.
    pub fn stage_opt(user: *mut T) -> Result<Option<Self>, BoundaryError> {
        if user.is_null() {
            return Ok(None);
        }
        Self::stage(user).map(Some)
    }
}

impl<T: BoundarySafe> OutSlot<T> {
    /// The boundary-local staging value.
    pub fn as_mut(&mut self) -> &mut T {
        &mut self.local
    }

    /// Replace the staged value.
    pub fn set(&mut self, value: T) {
        self.local = value;
    }

    /// Copy the staged value back into the caller's buffer.
    ///
    /// A failure here is surfaced as [`BoundaryError::CopyOut`] (reported
    /// `Unexpected` at the boundary) even when the inner operation already
    /// succeeded: from the caller's perspective the call did not complete.
    pub fn commit(self) -> Result<(), BoundaryError> {
        unsafe {
            ptr::write_unaligned(self.user, self.local);
        }
        Ok(())
    }
}

/// Run one boundary entry point: validate and copy the parameter block,
/// then hand the validated copy (and the validated raw pointer, for the
/// `retval` write-back) to the per-operation body. Marshaling failures
/// become the ecall's own status; the inner operation's result travels in
/// the block's `retval` field.
pub fn boundary_ecall<P, F>(pms: *mut c_void, body: F) -> RaStatus
where
    P: BoundarySafe,
    F: FnOnce(&P, *mut P) -> Result<(), BoundaryError>,
{
    let block: P = match read_param_block(pms) {
        Ok(block) => block,
        Err(e) => return e.into(),
    };
    match body(&block, pms as *mut P) {
        Ok(()) => RaStatus::Success,
        Err(e) => e.into(),
    }
}
