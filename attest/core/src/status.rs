// Copyright (c) 2023-2026 Provable Systems

//! Status vocabulary crossing the trust boundary.

use crate::error::EncodingError;
use displaydoc::Display;

/// Outcome of a boundary call or a trusted operation.
///
/// This is the closed set of result kinds the untrusted host can observe.
/// The discriminants are stable and part of the boundary ABI; they follow
/// the SGX SDK's grouping (parameter/memory faults low, platform-service
/// outcomes in the 0x4000 range).
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum RaStatus {
    /// The operation completed
    #[default]
    Success = 0,
    /// Internal consistency failure after the operation itself succeeded
    Unexpected = 0x0001,
    /// A pointer, size, or argument failed boundary validation
    InvalidParameter = 0x0002,
    /// Boundary-local staging memory could not be allocated
    OutOfMemory = 0x0003,
    /// The session is not in a state that permits this operation
    InvalidState = 0x0005,
    /// A message authentication tag did not verify
    MacMismatch = 0x0301,
    /// The verifier's signature did not verify
    InvalidSignature = 0x0302,
    /// The platform service dependency is unavailable
    ServiceUnavailable = 0x4001,
    /// The platform service stayed busy through the bounded retry
    Busy = 0x400A,
}

impl RaStatus {
    /// True for [`RaStatus::Success`] only.
    pub fn is_success(&self) -> bool {
        *self == RaStatus::Success
    }
}

/// The closed set of derivable session keys.
///
/// Discriminants match the wire integer the untrusted host supplies.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum KeyType {
    /// The session (data-protection) key
    Sk = 1,
    /// The message-authentication key
    Mk = 2,
    /// The verification key bound into the attestation report
    Vk = 3,
}

impl TryFrom<u32> for KeyType {
    type Error = EncodingError;

    fn try_from(src: u32) -> Result<Self, EncodingError> {
        match src {
            1 => Ok(KeyType::Sk),
            2 => Ok(KeyType::Mk),
            3 => Ok(KeyType::Vk),
            other => Err(EncodingError::UnknownKeyType(other)),
        }
    }
}
