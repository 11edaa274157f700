// Copyright (c) 2023-2026 Provable Systems

//! Inbound message policy checks.

use ra_attest_core::EXTENDED_GID_SENTINEL;

/// Whether an msg0 extended group identifier is acceptable.
///
/// Only the sentinel value is; any other group would route attestation
/// through a service this build does not trust.
pub fn msg0_accepted(extended_gid: u32) -> bool {
    extended_gid == EXTENDED_GID_SENTINEL
}
