// Copyright (c) 2023-2026 Provable Systems

//! Verifier-side helpers for exercising the handshake in tests.
//!
//! These build well-formed challenges and derive the same session keys a
//! real verifier would, so tests can check both sides of the exchange.

use crate::{ecc, kdf::cmac_tag};
use p256::{
    ecdsa::{signature::Signer, Signature, SigningKey},
    SecretKey,
};
use ra_attest_core::{Ec256Public, Ec256Signature, MacTag, Msg2};
use rand_core::{CryptoRng, RngCore};

pub use crate::kdf::DerivedKeys;

/// AES-128-CMAC, for computing expected tags in tests.
pub fn aes_cmac(key: &[u8; 16], data: &[u8]) -> [u8; 16] {
    cmac_tag(key, data).expect("cmac")
}

/// A test verifier's long-term signing key and per-session ephemeral key.
pub struct ResponderKeys {
    signing: SecretKey,
    ephemeral: SecretKey,
}

impl ResponderKeys {
    /// Generate fresh signing and ephemeral keys.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            signing: SecretKey::random(rng),
            ephemeral: SecretKey::random(rng),
        }
    }

    /// The signing key in wire order, to seed a session with.
    pub fn verifier_public(&self) -> Ec256Public {
        ecc::public_to_le(&self.signing.public_key()).expect("valid public key")
    }
}

/// Build a signed, MACed challenge against `g_a` and return it with the
/// session keys the verifier derives on its side.
pub fn responder_msg2<R: RngCore + CryptoRng>(
    responder: &ResponderKeys,
    g_a: &Ec256Public,
    _rng: &mut R,
) -> (Msg2, DerivedKeys) {
    let g_b = ecc::public_to_le(&responder.ephemeral.public_key()).expect("valid public key");

    let peer = ecc::public_from_le(g_a).expect("valid peer key");
    let shared = ecc::shared_x_le(&responder.ephemeral, &peer);
    let keys = DerivedKeys::derive(&shared).expect("key derivation");

    let mut signed = [0u8; 128];
    signed[..64].copy_from_slice(&g_b.to_bytes());
    signed[64..].copy_from_slice(&g_a.to_bytes());
    let signing = SigningKey::from_bytes(&responder.signing.to_bytes()).expect("signing key");
    let signature: Signature = signing.sign(&signed);
    let sig_bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);
    r.reverse();
    s.reverse();

    let mut msg2 = Msg2 {
        g_b,
        spid: [0x5Au8; 16],
        quote_type: [1, 0],
        kdf_id: [1, 0],
        sign_gb_ga: Ec256Signature { r, s },
        mac: MacTag::default(),
        sig_rl_size: [0; 4],
    };
    let tag = cmac_tag(keys.smk.as_bytes(), &msg2.mac_covered_bytes()).expect("mac");
    msg2.mac = MacTag::from(tag);
    (msg2, keys)
}
