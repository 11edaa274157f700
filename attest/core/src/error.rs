// Copyright (c) 2023-2026 Provable Systems

//! Encoding and conversion errors for the shared data model.

use displaydoc::Display;

/// An error that can occur while interpreting wire-format values.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum EncodingError {
    /// The computed size would overflow
    Overflow,
    /// The input length does not match the expected layout
    InvalidInputLength,
    /// Unknown key type: {0}
    UnknownKeyType(u32),
}
