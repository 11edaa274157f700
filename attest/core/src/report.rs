// Copyright (c) 2023-2026 Provable Systems

//! Attestation evidence containers.
//!
//! These are fixed-layout structures exchanged with the quoting service and
//! the untrusted host. All multi-byte integers are stored as little-endian
//! byte arrays so the layouts carry no padding and can be copied bitwise
//! across the boundary.

use crate::keys::MacTag;

/// Identifies the enclave a report should be targeted at. Opaque to this
/// core; produced by the quoting service and passed through.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct TargetInfo([u8; 512]);

impl TargetInfo {
    /// The raw target info bytes.
    pub fn as_bytes(&self) -> &[u8; 512] {
        &self.0
    }
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self([0u8; 512])
    }
}

impl From<[u8; 512]> for TargetInfo {
    fn from(src: [u8; 512]) -> Self {
        Self(src)
    }
}

/// The 64 bytes of caller data bound into a report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct ReportData([u8; 64]);

impl ReportData {
    /// The raw report data bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Bind a 32-byte digest into the low half, zero the rest.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut data = [0u8; 64];
        data[..32].copy_from_slice(digest);
        Self(data)
    }
}

impl Default for ReportData {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl From<[u8; 64]> for ReportData {
    fn from(src: [u8; 64]) -> Self {
        Self(src)
    }
}

/// The measured identity half of a report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct ReportBody {
    /// Security version of the platform.
    pub cpu_svn: [u8; 16],
    /// Extended feature selection, little-endian.
    pub misc_select: [u8; 4],
    /// Enclave attribute flags, as stored.
    pub attributes: [u8; 16],
    /// Measurement of the enclave contents.
    pub mr_enclave: [u8; 32],
    /// Measurement of the signing authority.
    pub mr_signer: [u8; 32],
    /// Product identifier, little-endian.
    pub isv_prod_id: [u8; 2],
    /// Security version of the enclave, little-endian.
    pub isv_svn: [u8; 2],
    /// Caller data bound into the report.
    pub report_data: ReportData,
}

/// Byte length of [`ReportBody`].
pub const REPORT_BODY_SIZE: usize = 16 + 4 + 16 + 32 + 32 + 2 + 2 + 64;

impl ReportBody {
    /// The body viewed as its wire bytes.
    ///
    /// Sound because the struct is `#[repr(C)]` composed entirely of byte
    /// arrays, so it has no padding.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe {
            core::slice::from_raw_parts(self as *const Self as *const u8, REPORT_BODY_SIZE)
        }
    }
}

/// A local attestation report: measured identity plus a MAC keyed to the
/// platform, verifiable only inside the trust boundary.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct Report {
    /// The measured identity.
    pub body: ReportBody,
    /// Identifies which platform key produced the MAC.
    pub key_id: [u8; 32],
    /// MAC over the body.
    pub mac: MacTag,
}

/// The nonce a caller binds into quote generation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(transparent)]
pub struct QuoteNonce([u8; 16]);

impl QuoteNonce {
    /// The nonce bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for QuoteNonce {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}
