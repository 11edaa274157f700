// Copyright (c) 2023-2026 Provable Systems

//! Session operation errors.

use displaydoc::Display;
use ra_attest_core::RaStatus;
use std::sync::PoisonError;

/// A generic result type for session operations.
pub type Result<T> = core::result::Result<T, Error>;

/// An error produced by a trusted session operation.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Error {
    /// The context handle does not name a live session
    InvalidContext,
    /// The session is not in a state that permits this operation
    InvalidState,
    /// The peer's public value is not a valid curve point
    KeyAgreement,
    /// The requested key-derivation function is not supported
    UnsupportedKdf,
    /// A message authentication tag did not verify
    MacMismatch,
    /// The verifier's signature did not verify
    SignatureInvalid,
    /// The declared message size does not match the computed layout
    SizeMismatch,
    /// The platform service dependency is unavailable
    ServiceUnavailable,
    /// Another thread crashed while holding the session table
    Poison,
    /// Internal failure
    Unexpected,
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_src: PoisonError<T>) -> Self {
        Error::Poison
    }
}

impl From<Error> for RaStatus {
    fn from(src: Error) -> RaStatus {
        match src {
            Error::InvalidContext
            | Error::KeyAgreement
            | Error::UnsupportedKdf
            | Error::SizeMismatch => RaStatus::InvalidParameter,
            Error::InvalidState => RaStatus::InvalidState,
            Error::MacMismatch => RaStatus::MacMismatch,
            Error::SignatureInvalid => RaStatus::InvalidSignature,
            Error::ServiceUnavailable => RaStatus::ServiceUnavailable,
            Error::Poison | Error::Unexpected => RaStatus::Unexpected,
        }
    }
}
