// Copyright (c) 2023-2026 Provable Systems

//! The session key schedule.
//!
//! A key-derivation key is a CMAC of the shared-secret X coordinate
//! under the all-zero key, and each session key is a CMAC of a short
//! label block under the KDK.

use crate::error::Error;
use aes::Aes128;
use cmac::{Cmac, Mac};
use ra_attest_core::Key128;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

const SMK_LABEL: &[u8] = &[0x01, b'S', b'M', b'K', 0x00, 0x80, 0x00];
const SK_LABEL: &[u8] = &[0x01, b'S', b'K', 0x00, 0x80, 0x00];
const MK_LABEL: &[u8] = &[0x01, b'M', b'K', 0x00, 0x80, 0x00];
const VK_LABEL: &[u8] = &[0x01, b'V', b'K', 0x00, 0x80, 0x00];

/// AES-128-CMAC of `data` under `key`.
pub(crate) fn cmac_tag(key: &[u8; 16], data: &[u8]) -> Result<[u8; 16], Error> {
    let mut mac = Cmac::<Aes128>::new_from_slice(key).map_err(|_| Error::Unexpected)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Constant-time comparison of an expected CMAC against a received tag.
pub(crate) fn cmac_verify(key: &[u8; 16], data: &[u8], tag: &[u8; 16]) -> Result<(), Error> {
    let expected = Zeroizing::new(cmac_tag(key, data)?);
    if expected.ct_eq(tag).into() {
        Ok(())
    } else {
        Err(Error::MacMismatch)
    }
}

/// The four session keys derived from one key exchange.
pub struct DerivedKeys {
    /// MACs the handshake messages.
    pub smk: Key128,
    /// Protects application payloads after the handshake.
    pub sk: Key128,
    /// Available to the application for its own MACs.
    pub mk: Key128,
    /// Bound into the report data to tie the quote to this exchange.
    pub vk: Key128,
}

impl DerivedKeys {
    /// Derive the SMK/SK/MK/VK set from a little-endian shared-secret
    /// X coordinate.
    pub fn derive(shared_x_le: &[u8; 32]) -> Result<Self, Error> {
        let kdk = Zeroizing::new(cmac_tag(&[0u8; 16], shared_x_le)?);
        Ok(Self {
            smk: Key128::from(cmac_tag(&kdk, SMK_LABEL)?),
            sk: Key128::from(cmac_tag(&kdk, SK_LABEL)?),
            mk: Key128::from(cmac_tag(&kdk, MK_LABEL)?),
            vk: Key128::from(cmac_tag(&kdk, VK_LABEL)?),
        })
    }
}
