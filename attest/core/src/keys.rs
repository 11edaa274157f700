// Copyright (c) 2023-2026 Provable Systems

//! Key and digest containers.
//!
//! Coordinate and scalar byte orders are little-endian throughout, matching
//! the SGX wire convention. Conversions to the big-endian order the
//! cryptographic primitives expect happen at the point of use.

use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An elliptic-curve public key: two little-endian P-256 coordinates.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(C)]
pub struct Ec256Public {
    /// The X coordinate, little-endian.
    pub gx: [u8; 32],
    /// The Y coordinate, little-endian.
    pub gy: [u8; 32],
}

impl Ec256Public {
    /// The concatenated coordinate bytes, in wire order.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.gx);
        out[32..].copy_from_slice(&self.gy);
        out
    }
}

/// The compiled-in well-known verifier key, used when the caller does not
/// supply one at session initialization.
pub const DEFAULT_VERIFIER_KEY: Ec256Public = Ec256Public {
    gx: [
        0x72, 0x12, 0x8a, 0x7a, 0x17, 0x52, 0x6e, 0xbf, 0x85, 0xd0, 0x3a, 0x62, 0x37, 0x30, 0xae,
        0xad, 0x3e, 0x3d, 0xaa, 0xee, 0x9c, 0x60, 0x73, 0x1d, 0xb0, 0x5b, 0xe8, 0x62, 0x1c, 0x4b,
        0xeb, 0x38,
    ],
    gy: [
        0xd4, 0x81, 0x40, 0xd9, 0x50, 0xe2, 0x57, 0x7b, 0x26, 0xee, 0xb7, 0x41, 0xe7, 0xc6, 0x14,
        0xe2, 0x24, 0xb7, 0xbd, 0xc9, 0x03, 0xf2, 0x9a, 0x28, 0xa8, 0x3c, 0xc8, 0x10, 0x11, 0x14,
        0x5e, 0x06,
    ],
};

/// An ECDSA signature over P-256: little-endian `r` and `s` scalars.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(C)]
pub struct Ec256Signature {
    /// The `r` scalar, little-endian.
    pub r: [u8; 32],
    /// The `s` scalar, little-endian.
    pub s: [u8; 32],
}

/// A 128-bit AES-CMAC tag.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct MacTag([u8; 16]);

impl MacTag {
    /// The tag bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for MacTag {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for MacTag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ConstantTimeEq for MacTag {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

/// A SHA-256 digest.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Sha256Hash([u8; 32]);

impl Sha256Hash {
    /// The digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(src: [u8; 32]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// 128 bits of derived symmetric key material.
///
/// This type never crosses the trust boundary; only hashes or MAC results
/// computed from it do. The bytes are wiped when the value is dropped, and
/// every code path that materializes a temporary copy must wipe it
/// explicitly before returning.
#[derive(Clone, Default, Eq, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct Key128([u8; 16]);

impl Key128 {
    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for Key128 {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl ConstantTimeEq for Key128 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

// Key material must never leak through debug formatting.
impl core::fmt::Debug for Key128 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Key128(...)")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use zeroize::Zeroize;

    #[test]
    fn default_verifier_key_matches_reference() {
        // Leading bytes of the well-known service key, straight from the
        // shipping configuration.
        assert_eq!(hex::encode(&DEFAULT_VERIFIER_KEY.gx[..4]), "72128a7a");
        assert_eq!(hex::encode(&DEFAULT_VERIFIER_KEY.gy[..4]), "d48140d9");
    }

    #[test]
    fn key128_debug_hides_bytes() {
        let key = Key128::from([0xA5; 16]);
        assert_eq!(alloc::format!("{key:?}"), "Key128(...)");
    }

    #[test]
    fn key128_zeroize_wipes() {
        let mut key = Key128::from([0xA5; 16]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; 16]);
    }
}
