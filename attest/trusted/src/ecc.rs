// Copyright (c) 2023-2026 Provable Systems

//! Conversions between the little-endian wire containers and the P-256
//! primitives, plus the key-agreement and signature-check seams.

use crate::error::Error;
use p256::{
    ecdh,
    ecdsa::{signature::Verifier, Signature, VerifyingKey},
    elliptic_curve::sec1::FromEncodedPoint,
    EncodedPoint, FieldBytes, PublicKey, SecretKey,
};
use ra_attest_core::{Ec256Public, Ec256Signature};
use zeroize::Zeroizing;

fn to_be(src: &[u8; 32]) -> [u8; 32] {
    let mut out = *src;
    out.reverse();
    out
}

/// Parse a little-endian public key, rejecting off-curve values.
pub(crate) fn public_from_le(src: &Ec256Public) -> Result<PublicKey, Error> {
    let x = to_be(&src.gx);
    let y = to_be(&src.gy);
    let point = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(&x),
        FieldBytes::from_slice(&y),
        false,
    );
    Option::from(PublicKey::from_encoded_point(&point)).ok_or(Error::KeyAgreement)
}

/// Render a public key into the little-endian wire container.
pub(crate) fn public_to_le(src: &PublicKey) -> Result<Ec256Public, Error> {
    use p256::elliptic_curve::sec1::ToEncodedPoint;

    let point = src.to_encoded_point(false);
    let x = point.x().ok_or(Error::KeyAgreement)?;
    let y = point.y().ok_or(Error::KeyAgreement)?;
    let mut gx = [0u8; 32];
    let mut gy = [0u8; 32];
    gx.copy_from_slice(x);
    gy.copy_from_slice(y);
    gx.reverse();
    gy.reverse();
    Ok(Ec256Public { gx, gy })
}

/// The shared-secret X coordinate, little-endian, wiped on drop.
pub(crate) fn shared_x_le(secret: &SecretKey, peer: &PublicKey) -> Zeroizing<[u8; 32]> {
    let shared = ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let mut out = [0u8; 32];
    out.copy_from_slice(shared.raw_secret_bytes());
    out.reverse();
    Zeroizing::new(out)
}

/// Check a little-endian wire signature over `msg` against `key`.
pub(crate) fn verify_sig(
    key: &Ec256Public,
    msg: &[u8],
    sig: &Ec256Signature,
) -> Result<(), Error> {
    let x = to_be(&key.gx);
    let y = to_be(&key.gy);
    let point = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(&x),
        FieldBytes::from_slice(&y),
        false,
    );
    let verifier = VerifyingKey::from_encoded_point(&point).map_err(|_| Error::KeyAgreement)?;

    let r = to_be(&sig.r);
    let s = to_be(&sig.s);
    let signature = Signature::from_scalars(FieldBytes::from(r), FieldBytes::from(s))
        .map_err(|_| Error::SignatureInvalid)?;
    verifier
        .verify(msg, &signature)
        .map_err(|_| Error::SignatureInvalid)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn public_key_round_trips_through_wire_order() {
        let secret = SecretKey::random(&mut OsRng);
        let public = secret.public_key();
        let wire = public_to_le(&public).unwrap();
        assert_eq!(public_from_le(&wire).unwrap(), public);
    }

    #[test]
    fn off_curve_point_is_rejected() {
        let bogus = Ec256Public {
            gx: [1u8; 32],
            gy: [1u8; 32],
        };
        assert_eq!(public_from_le(&bogus), Err(Error::KeyAgreement));
    }

    #[test]
    fn ecdh_agrees_both_ways() {
        let a = SecretKey::random(&mut OsRng);
        let b = SecretKey::random(&mut OsRng);
        let ab = shared_x_le(&a, &b.public_key());
        let ba = shared_x_le(&b, &a.public_key());
        assert_eq!(*ab, *ba);
    }

    #[test]
    fn signature_checks_against_wire_encoding() {
        use p256::ecdsa::{signature::Signer, SigningKey};

        let secret = SecretKey::random(&mut OsRng);
        let signing = SigningKey::from_bytes(&secret.to_bytes()).unwrap();
        let msg = b"gb||ga";
        let signature: Signature = signing.sign(msg);

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        r.reverse();
        s.reverse();
        let wire_sig = Ec256Signature { r, s };
        let wire_key = public_to_le(&secret.public_key()).unwrap();

        assert_eq!(verify_sig(&wire_key, msg, &wire_sig), Ok(()));
        assert_eq!(
            verify_sig(&wire_key, b"tampered", &wire_sig),
            Err(Error::SignatureInvalid)
        );
    }
}
