// Copyright (c) 2023-2026 Provable Systems

//! Per-session key-exchange state.
//!
//! A session starts in [`Pending`] with a fresh ephemeral keypair, and
//! advances to [`Ready`] once the responder's challenge has been
//! authenticated and the session keys derived. The transition consumes the
//! pending state; there is no path back.

use crate::{
    ecc,
    error::Error,
    kdf::{cmac_tag, cmac_verify, DerivedKeys},
};
use p256::SecretKey;
use ra_attest_core::{
    Ec256Public, KeyType, Key128, MacTag, Msg2, QuoteNonce, ReportData, KDF_ID_DEFAULT,
    PS_SEC_PROP_SIZE,
};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

/// Domain separator for proof-of-possession tags.
const PROOF_LABEL: &[u8] = b"ra-pop-v1";

/// A session that has produced its ephemeral key but not yet seen a valid
/// responder challenge.
pub struct Pending {
    eph: SecretKey,
    g_a: Ec256Public,
    verifier: Ec256Public,
}

impl Pending {
    /// Begin a session against the given verifier signing key.
    ///
    /// Rejects verifier keys that are not valid curve points up front, so a
    /// bad key surfaces at initialization rather than mid-handshake.
    pub fn new<R: RngCore + CryptoRng>(verifier: Ec256Public, rng: &mut R) -> Result<Self, Error> {
        ecc::public_from_le(&verifier)?;
        let eph = SecretKey::random(rng);
        let g_a = ecc::public_to_le(&eph.public_key())?;
        Ok(Self {
            eph,
            g_a,
            verifier,
        })
    }

    /// The session's ephemeral public key, wire order.
    pub fn g_a(&self) -> &Ec256Public {
        &self.g_a
    }

    /// Authenticate a responder challenge and derive the session keys.
    ///
    /// On success the pending state is consumed and the report data binding
    /// both public keys and the VK is returned alongside the ready state.
    pub fn process_msg2(
        self,
        msg2: &Msg2,
        nonce: QuoteNonce,
    ) -> Result<(Ready, ReportData), Error> {
        if msg2.kdf_id() != KDF_ID_DEFAULT {
            return Err(Error::UnsupportedKdf);
        }

        let g_b = ecc::public_from_le(&msg2.g_b)?;
        let shared = ecc::shared_x_le(&self.eph, &g_b);
        let keys = DerivedKeys::derive(&shared)?;

        cmac_verify(
            keys.smk.as_bytes(),
            &msg2.mac_covered_bytes(),
            msg2.mac.as_bytes(),
        )?;

        // sign_gb_ga covers the responder key first, then ours.
        let mut signed = [0u8; 128];
        signed[..64].copy_from_slice(&msg2.g_b.to_bytes());
        signed[64..].copy_from_slice(&self.g_a.to_bytes());
        ecc::verify_sig(&self.verifier, &signed, &msg2.sign_gb_ga)?;

        let mut hasher = Sha256::new();
        hasher.update(self.g_a.to_bytes());
        hasher.update(msg2.g_b.to_bytes());
        hasher.update(keys.vk.as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();

        let ready = Ready {
            g_a: self.g_a,
            g_b: msg2.g_b,
            keys,
            nonce,
        };
        Ok((ready, ReportData::from_digest(&digest)))
    }
}

/// A session whose keys have been derived.
pub struct Ready {
    g_a: Ec256Public,
    g_b: Ec256Public,
    keys: DerivedKeys,
    nonce: QuoteNonce,
}

impl Ready {
    /// The session's ephemeral public key, wire order.
    pub fn g_a(&self) -> &Ec256Public {
        &self.g_a
    }

    /// The nonce recorded when the challenge was processed.
    pub fn nonce(&self) -> &QuoteNonce {
        &self.nonce
    }

    /// A copy of the requested derived key.
    ///
    /// Callers must wipe the copy once they are done with it.
    pub fn key(&self, key_type: KeyType) -> Key128 {
        match key_type {
            KeyType::Sk => self.keys.sk.clone(),
            KeyType::Mk => self.keys.mk.clone(),
            KeyType::Vk => self.keys.vk.clone(),
        }
    }

    /// The SMK tag over the third-message payload.
    pub fn msg3_mac(&self, quote: &[u8]) -> Result<MacTag, Error> {
        let mut covered =
            Vec::with_capacity(64 + PS_SEC_PROP_SIZE + quote.len());
        covered.extend_from_slice(&self.g_a.to_bytes());
        covered.extend_from_slice(&[0u8; PS_SEC_PROP_SIZE]);
        covered.extend_from_slice(quote);
        Ok(MacTag::from(cmac_tag(self.keys.smk.as_bytes(), &covered)?))
    }

    /// An MK tag binding a caller challenge to this session's key exchange.
    pub fn proof_tag(&self, challenge: &QuoteNonce) -> Result<MacTag, Error> {
        let mut covered = Vec::with_capacity(PROOF_LABEL.len() + 16 + 128);
        covered.extend_from_slice(PROOF_LABEL);
        covered.extend_from_slice(challenge.as_bytes());
        covered.extend_from_slice(&self.g_a.to_bytes());
        covered.extend_from_slice(&self.g_b.to_bytes());
        Ok(MacTag::from(cmac_tag(self.keys.mk.as_bytes(), &covered)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{responder_msg2, ResponderKeys};
    use rand::rngs::OsRng;
    use subtle::ConstantTimeEq;

    #[test]
    fn handshake_derives_matching_keys() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let pending = Pending::new(responder.verifier_public(), &mut rng).unwrap();
        let (msg2, expected) = responder_msg2(&responder, pending.g_a(), &mut rng);

        let nonce = QuoteNonce::from([9u8; 16]);
        let (ready, report_data) = pending.process_msg2(&msg2, nonce).unwrap();

        assert!(bool::from(ready.key(KeyType::Sk).ct_eq(&expected.sk)));
        assert!(bool::from(ready.key(KeyType::Mk).ct_eq(&expected.mk)));
        assert!(bool::from(ready.key(KeyType::Vk).ct_eq(&expected.vk)));

        // report_data binds g_a || g_b || VK.
        let mut hasher = Sha256::new();
        hasher.update(ready.g_a().to_bytes());
        hasher.update(msg2.g_b.to_bytes());
        hasher.update(expected.vk.as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        assert_eq!(&report_data.as_bytes()[..32], &digest);
        assert_eq!(&report_data.as_bytes()[32..], &[0u8; 32]);
    }

    #[test]
    fn tampered_mac_is_rejected() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let pending = Pending::new(responder.verifier_public(), &mut rng).unwrap();
        let (mut msg2, _) = responder_msg2(&responder, pending.g_a(), &mut rng);

        let mut tag = *msg2.mac.as_bytes();
        tag[0] ^= 1;
        msg2.mac = MacTag::from(tag);

        let err = pending
            .process_msg2(&msg2, QuoteNonce::default())
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::MacMismatch);
    }

    #[test]
    fn wrong_verifier_signature_is_rejected() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let impostor = ResponderKeys::random(&mut rng);

        // Session trusts `impostor`, challenge is signed by `responder`.
        let pending = Pending::new(impostor.verifier_public(), &mut rng).unwrap();
        let (msg2, _) = responder_msg2(&responder, pending.g_a(), &mut rng);

        let err = pending
            .process_msg2(&msg2, QuoteNonce::default())
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::SignatureInvalid);
    }

    #[test]
    fn unsupported_kdf_is_rejected() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let pending = Pending::new(responder.verifier_public(), &mut rng).unwrap();
        let (mut msg2, _) = responder_msg2(&responder, pending.g_a(), &mut rng);
        msg2.kdf_id = [2, 0];

        let err = pending
            .process_msg2(&msg2, QuoteNonce::default())
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::UnsupportedKdf);
    }

    #[test]
    fn bad_verifier_key_fails_at_init() {
        let mut rng = OsRng;
        let bogus = Ec256Public {
            gx: [3u8; 32],
            gy: [3u8; 32],
        };
        assert!(Pending::new(bogus, &mut rng).is_err());
    }

    #[test]
    fn proof_tags_are_challenge_specific() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let pending = Pending::new(responder.verifier_public(), &mut rng).unwrap();
        let (msg2, _) = responder_msg2(&responder, pending.g_a(), &mut rng);
        let (ready, _) = pending.process_msg2(&msg2, QuoteNonce::default()).unwrap();

        let a = ready.proof_tag(&QuoteNonce::from([1u8; 16])).unwrap();
        let b = ready.proof_tag(&QuoteNonce::from([2u8; 16])).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
        let again = ready.proof_tag(&QuoteNonce::from([1u8; 16])).unwrap();
        assert_eq!(a.as_bytes(), again.as_bytes());
    }
}
