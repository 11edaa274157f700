// Copyright (c) 2023-2026 Provable Systems

//! Protocol message layouts.

use crate::keys::{Ec256Public, Ec256Signature, MacTag};
use alloc::vec::Vec;

/// The only extended group identifier a conforming verifier may send in
/// msg0. Anything else aborts the handshake.
pub const EXTENDED_GID_SENTINEL: u32 = 0;

/// The key-derivation function identifier this core implements.
pub const KDF_ID_DEFAULT: u16 = 1;

/// The prover's first message: its ephemeral public key and group id.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct Msg1 {
    /// The prover's ephemeral public key.
    pub g_a: Ec256Public,
    /// The platform group identifier.
    pub gid: [u8; 4],
}

/// The verifier's key-agreement contribution.
///
/// Only the fields the trusted side consumes are modeled; the revocation
/// list that trails the structure on the wire stays with the untrusted
/// transport.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(C)]
pub struct Msg2 {
    /// The verifier's ephemeral public key.
    pub g_b: Ec256Public,
    /// The service provider identifier.
    pub spid: [u8; 16],
    /// Requested quote type, little-endian.
    pub quote_type: [u8; 2],
    /// Key-derivation function identifier, little-endian.
    pub kdf_id: [u8; 2],
    /// Verifier signature over `g_b || g_a`.
    pub sign_gb_ga: Ec256Signature,
    /// MAC over the fields from `g_b` through `kdf_id`.
    pub mac: MacTag,
    /// Size of the trailing revocation list, little-endian.
    pub sig_rl_size: [u8; 4],
}

impl Msg2 {
    /// The key-derivation function identifier as an integer.
    pub fn kdf_id(&self) -> u16 {
        u16::from_le_bytes(self.kdf_id)
    }

    /// The bytes the msg2 MAC covers: `g_b || spid || quote_type || kdf_id`.
    pub fn mac_covered_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + 16 + 2 + 2);
        buf.extend_from_slice(&self.g_b.to_bytes());
        buf.extend_from_slice(&self.spid);
        buf.extend_from_slice(&self.quote_type);
        buf.extend_from_slice(&self.kdf_id);
        buf
    }
}

/// Length of the platform-services security property blob inside msg3.
pub const PS_SEC_PROP_SIZE: usize = 256;

/// Fixed prefix of the outbound proof message: MAC, the prover's ephemeral
/// key, and the platform-services property blob. The opaque quote follows.
pub const MSG3_HEADER_SIZE: usize = 16 + 64 + PS_SEC_PROP_SIZE;

/// Total proof-message size for a quote of `quote_size` bytes, or `None`
/// if the computation would overflow.
pub fn msg3_size(quote_size: u32) -> Option<usize> {
    MSG3_HEADER_SIZE.checked_add(quote_size as usize)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn msg2_mac_covers_84_bytes() {
        let msg2 = Msg2::default();
        assert_eq!(msg2.mac_covered_bytes().len(), 84);
    }

    #[test]
    fn msg3_size_for_typical_quote() {
        assert_eq!(msg3_size(1116), Some(MSG3_HEADER_SIZE + 1116));
    }

    #[test]
    fn msg1_layout_is_key_then_gid() {
        assert_eq!(core::mem::size_of::<Msg1>(), 64 + 4);
    }
}
