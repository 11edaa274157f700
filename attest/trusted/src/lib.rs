// Copyright (c) 2023-2026 Provable Systems

//! Trusted-side remote-attestation key exchange.
//!
//! [`RaEnclave`] owns a table of key-exchange sessions keyed by opaque
//! `u32` handles and drives each one through the EPID handshake: produce
//! the ephemeral key, authenticate the responder's challenge, emit the
//! quoted proof, and serve hashes of the derived keys. Callers hold only
//! the handle; session secrets never leave this crate except as digests
//! or MAC tags.

#![deny(missing_docs)]

mod ecc;
mod error;
mod kdf;
mod platform;
mod state;
mod validate;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use crate::{
    error::{Error, Result},
    platform::{PlatformServices, SimPlatform, PSE_RETRIES},
    state::{Pending, Ready},
    validate::msg0_accepted,
};

use ra_attest_core::{
    Ec256Public, KeyType, Key128, MacTag, Msg2, QuoteNonce, RaStatus, Report, ReportData,
    msg3_size, Sha256Hash, TargetInfo, MSG3_HEADER_SIZE, PS_SEC_PROP_SIZE,
};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use std::{collections::HashMap, sync::Mutex};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

enum SessionState {
    Pending(Pending),
    Ready(Ready),
}

/// Live sessions keyed by handle.
///
/// Handles are allocated monotonically and never reused, so a stale handle
/// held by the host after `close` can never alias a newer session.
struct SessionArena {
    next_id: u32,
    live: HashMap<u32, SessionState>,
}

impl SessionArena {
    fn new() -> Self {
        Self {
            // Zero is reserved so an uninitialized handle on the host side
            // never names a session.
            next_id: 1,
            live: HashMap::new(),
        }
    }

    fn insert(&mut self, state: SessionState) -> Result<u32> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(Error::Unexpected)?;
        self.live.insert(id, state);
        Ok(id)
    }
}

/// The trusted attestation engine: a session table over a platform seam.
pub struct RaEnclave<P: PlatformServices = SimPlatform> {
    sessions: Mutex<SessionArena>,
    platform: P,
}

impl<P: PlatformServices + Default> Default for RaEnclave<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P: PlatformServices> RaEnclave<P> {
    /// Build an engine over the given platform facilities.
    pub fn new(platform: P) -> Self {
        Self {
            sessions: Mutex::new(SessionArena::new()),
            platform,
        }
    }

    /// A report over `data`, targeted per `target_info`.
    pub fn create_report(
        &self,
        target_info: Option<&TargetInfo>,
        data: &ReportData,
    ) -> Result<Report> {
        self.platform.create_report(target_info, data)
    }

    /// Open a session trusting `verifier`, optionally with platform
    /// services, and return its handle.
    ///
    /// `pse_status` always reflects the final platform-services outcome,
    /// including when no session was requested.
    pub fn init<R: RngCore + CryptoRng>(
        &self,
        verifier: Ec256Public,
        want_pse: bool,
        pse_status: &mut RaStatus,
        rng: &mut R,
    ) -> Result<u32> {
        *pse_status = RaStatus::Success;
        if want_pse {
            *pse_status = platform::retry_busy(|| self.platform.create_pse_session());
            if !pse_status.is_success() {
                return Err(Error::ServiceUnavailable);
            }
        }

        let pending = Pending::new(verifier, rng)?;
        let id = self.sessions.lock()?.insert(SessionState::Pending(pending))?;

        if want_pse {
            *pse_status = platform::retry_busy(|| self.platform.close_pse_session());
            if !pse_status.is_success() {
                // No half-opened context may remain visible to the caller.
                self.sessions.lock()?.live.remove(&id);
                return Err(Error::ServiceUnavailable);
            }
        }
        Ok(id)
    }

    /// The session's ephemeral public key.
    pub fn get_ga(&self, ctx: u32) -> Result<Ec256Public> {
        let sessions = self.sessions.lock()?;
        match sessions.live.get(&ctx) {
            Some(SessionState::Pending(pending)) => Ok(*pending.g_a()),
            Some(SessionState::Ready(ready)) => Ok(*ready.g_a()),
            None => Err(Error::InvalidContext),
        }
    }

    /// Authenticate a responder challenge, advance the session, and
    /// produce the report the quoting service will quote.
    ///
    /// The nonce is recorded for later quote verification and echoed back.
    pub fn process_msg2(
        &self,
        ctx: u32,
        msg2: &Msg2,
        qe_target: &TargetInfo,
        nonce: &QuoteNonce,
    ) -> Result<(Report, QuoteNonce)> {
        let mut sessions = self.sessions.lock()?;
        let pending = match sessions.live.remove(&ctx) {
            Some(SessionState::Pending(pending)) => pending,
            Some(other) => {
                // Wrong state is not fatal to the session.
                sessions.live.insert(ctx, other);
                return Err(Error::InvalidState);
            }
            None => return Err(Error::InvalidContext),
        };

        // A challenge that fails authentication burns the session; the
        // ephemeral key is never reused against a second challenge.
        let (ready, report_data) = pending.process_msg2(msg2, *nonce)?;
        let report = self.platform.create_report(Some(qe_target), &report_data)?;
        sessions.live.insert(ctx, SessionState::Ready(ready));
        Ok((report, *nonce))
    }

    /// Assemble the third message: MAC, ephemeral key, property blob, and
    /// the caller-supplied quote.
    ///
    /// `declared_size` must match the exact layout for the given quote,
    /// and the quoting enclave's report must verify and bind the recorded
    /// nonce to the quote.
    pub fn generate_msg3(
        &self,
        ctx: u32,
        quote: &[u8],
        declared_size: u32,
        qe_report: &Report,
    ) -> Result<Vec<u8>> {
        let sessions = self.sessions.lock()?;
        let ready = match sessions.live.get(&ctx) {
            Some(SessionState::Ready(ready)) => ready,
            Some(SessionState::Pending(_)) => return Err(Error::InvalidState),
            None => return Err(Error::InvalidContext),
        };

        let expected_size = u32::try_from(quote.len())
            .ok()
            .and_then(msg3_size)
            .ok_or(Error::SizeMismatch)?;
        if declared_size as usize != expected_size {
            return Err(Error::SizeMismatch);
        }

        self.platform.verify_report(qe_report)?;

        // The quoting enclave binds SHA-256(nonce || quote) into its
        // report data; anything else means the quote was swapped.
        let mut hasher = Sha256::new();
        hasher.update(ready.nonce().as_bytes());
        hasher.update(quote);
        let digest: [u8; 32] = hasher.finalize().into();
        let bound = &qe_report.body.report_data.as_bytes()[..32];
        if !bool::from(digest.ct_eq(bound)) {
            return Err(Error::MacMismatch);
        }

        let mac = ready.msg3_mac(quote)?;
        let mut msg3 = Vec::with_capacity(expected_size);
        msg3.extend_from_slice(mac.as_bytes());
        msg3.extend_from_slice(&ready.g_a().to_bytes());
        msg3.extend_from_slice(&[0u8; PS_SEC_PROP_SIZE]);
        msg3.extend_from_slice(quote);
        Ok(msg3)
    }

    /// SHA-256 of a derived session key.
    ///
    /// The key itself stays inside; the working copy is wiped before
    /// returning.
    pub fn get_key_hash(&self, ctx: u32, key_type: KeyType) -> Result<Sha256Hash> {
        let sessions = self.sessions.lock()?;
        let ready = match sessions.live.get(&ctx) {
            Some(SessionState::Ready(ready)) => ready,
            Some(SessionState::Pending(_)) => return Err(Error::InvalidState),
            None => return Err(Error::InvalidContext),
        };

        let mut key: Key128 = ready.key(key_type);
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        key.zeroize();
        Ok(Sha256Hash::from(digest))
    }

    /// Tear down a session. The handle is dead afterwards.
    pub fn close(&self, ctx: u32) -> Result<()> {
        self.sessions
            .lock()?
            .live
            .remove(&ctx)
            .map(|_| ())
            .ok_or(Error::InvalidContext)
    }

    /// A proof-of-possession tag over `challenge` under the session's MK.
    pub fn generate_proof(&self, ctx: u32, challenge: &QuoteNonce) -> Result<MacTag> {
        let sessions = self.sessions.lock()?;
        match sessions.live.get(&ctx) {
            Some(SessionState::Ready(ready)) => ready.proof_tag(challenge),
            Some(SessionState::Pending(_)) => Err(Error::InvalidState),
            None => Err(Error::InvalidContext),
        }
    }

    /// Whether `tag` is a valid proof-of-possession for `challenge` on
    /// this session. Unknown or pending sessions verify nothing.
    pub fn verify_proof(&self, ctx: u32, challenge: &QuoteNonce, tag: &MacTag) -> bool {
        match self.generate_proof(ctx, challenge) {
            Ok(expected) => expected.ct_eq(tag).into(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{responder_msg2, ResponderKeys};
    use crate::platform::SIM_REPORT_KEY;
    use rand::rngs::OsRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine() -> RaEnclave<SimPlatform> {
        RaEnclave::default()
    }

    /// Walk one session to Ready and return its handle plus the challenge.
    fn ready_session(enclave: &RaEnclave<SimPlatform>) -> (u32, Msg2) {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let mut pse_status = RaStatus::Unexpected;
        let ctx = enclave
            .init(responder.verifier_public(), false, &mut pse_status, &mut rng)
            .unwrap();
        let g_a = enclave.get_ga(ctx).unwrap();
        let (msg2, _) = responder_msg2(&responder, &g_a, &mut rng);
        enclave
            .process_msg2(ctx, &msg2, &TargetInfo::default(), &QuoteNonce::from([5; 16]))
            .unwrap();
        (ctx, msg2)
    }

    fn quote_with_report(
        enclave: &RaEnclave<SimPlatform>,
        nonce: &QuoteNonce,
    ) -> (Vec<u8>, Report) {
        let quote = vec![0x51u8; 1116];
        let mut hasher = Sha256::new();
        hasher.update(nonce.as_bytes());
        hasher.update(&quote);
        let digest: [u8; 32] = hasher.finalize().into();
        let report = enclave
            .platform
            .create_report(None, &ReportData::from_digest(&digest))
            .unwrap();
        (quote, report)
    }

    #[test]
    fn handles_are_monotonic_and_never_reused() {
        let enclave = engine();
        let (a, _) = ready_session(&enclave);
        enclave.close(a).unwrap();
        let (b, _) = ready_session(&enclave);
        assert!(b > a);
        assert_eq!(enclave.get_ga(a), Err(Error::InvalidContext));
    }

    #[test]
    fn get_ga_matches_between_states() {
        let mut rng = OsRng;
        let enclave = engine();
        let responder = ResponderKeys::random(&mut rng);
        let mut pse_status = RaStatus::Unexpected;
        let ctx = enclave
            .init(responder.verifier_public(), false, &mut pse_status, &mut rng)
            .unwrap();
        assert_eq!(pse_status, RaStatus::Success);

        let before = enclave.get_ga(ctx).unwrap();
        let (msg2, _) = responder_msg2(&responder, &before, &mut rng);
        enclave
            .process_msg2(ctx, &msg2, &TargetInfo::default(), &QuoteNonce::default())
            .unwrap();
        assert_eq!(enclave.get_ga(ctx).unwrap(), before);
    }

    #[test]
    fn msg2_twice_is_a_state_error() {
        let enclave = engine();
        let (ctx, msg2) = ready_session(&enclave);
        let err = enclave
            .process_msg2(ctx, &msg2, &TargetInfo::default(), &QuoteNonce::default())
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::InvalidState);
    }

    #[test]
    fn failed_msg2_burns_the_session() {
        let mut rng = OsRng;
        let enclave = engine();
        let responder = ResponderKeys::random(&mut rng);
        let mut pse_status = RaStatus::Unexpected;
        let ctx = enclave
            .init(responder.verifier_public(), false, &mut pse_status, &mut rng)
            .unwrap();
        let g_a = enclave.get_ga(ctx).unwrap();
        let (mut msg2, _) = responder_msg2(&responder, &g_a, &mut rng);
        let mut tag = *msg2.mac.as_bytes();
        tag[3] ^= 0x80;
        msg2.mac = MacTag::from(tag);

        let err = enclave
            .process_msg2(ctx, &msg2, &TargetInfo::default(), &QuoteNonce::default())
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::MacMismatch);
        assert_eq!(enclave.get_ga(ctx), Err(Error::InvalidContext));
    }

    #[test]
    fn msg3_layout_and_mac() {
        let enclave = engine();
        let (ctx, _) = ready_session(&enclave);
        let nonce = QuoteNonce::from([5; 16]);
        let (quote, report) = quote_with_report(&enclave, &nonce);

        let declared = (MSG3_HEADER_SIZE + quote.len()) as u32;
        let msg3 = enclave.generate_msg3(ctx, &quote, declared, &report).unwrap();

        assert_eq!(msg3.len(), MSG3_HEADER_SIZE + quote.len());
        let g_a = enclave.get_ga(ctx).unwrap();
        assert_eq!(&msg3[16..80], &g_a.to_bytes());
        assert_eq!(&msg3[80..80 + PS_SEC_PROP_SIZE], &[0u8; PS_SEC_PROP_SIZE][..]);
        assert_eq!(&msg3[MSG3_HEADER_SIZE..], &quote[..]);
    }

    #[test]
    fn msg3_rejects_wrong_declared_size() {
        let enclave = engine();
        let (ctx, _) = ready_session(&enclave);
        let nonce = QuoteNonce::from([5; 16]);
        let (quote, report) = quote_with_report(&enclave, &nonce);

        let declared = (MSG3_HEADER_SIZE + quote.len()) as u32;
        let err = enclave
            .generate_msg3(ctx, &quote, declared - 1, &report)
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::SizeMismatch);
    }

    #[test]
    fn msg3_rejects_swapped_quote() {
        let enclave = engine();
        let (ctx, _) = ready_session(&enclave);
        let nonce = QuoteNonce::from([5; 16]);
        let (quote, report) = quote_with_report(&enclave, &nonce);

        let mut swapped = quote.clone();
        swapped[0] ^= 1;
        let declared = (MSG3_HEADER_SIZE + swapped.len()) as u32;
        let err = enclave
            .generate_msg3(ctx, &swapped, declared, &report)
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, Error::MacMismatch);
    }

    #[test]
    fn key_hash_requires_ready_state() {
        let mut rng = OsRng;
        let enclave = engine();
        let responder = ResponderKeys::random(&mut rng);
        let mut pse_status = RaStatus::Unexpected;
        let ctx = enclave
            .init(responder.verifier_public(), false, &mut pse_status, &mut rng)
            .unwrap();
        assert_eq!(
            enclave.get_key_hash(ctx, KeyType::Sk),
            Err(Error::InvalidState)
        );
        assert_eq!(
            enclave.get_key_hash(ctx + 1, KeyType::Sk),
            Err(Error::InvalidContext)
        );
    }

    #[test]
    fn key_hashes_are_per_key_and_stable() {
        let enclave = engine();
        let (ctx, _) = ready_session(&enclave);
        let sk = enclave.get_key_hash(ctx, KeyType::Sk).unwrap();
        let mk = enclave.get_key_hash(ctx, KeyType::Mk).unwrap();
        let vk = enclave.get_key_hash(ctx, KeyType::Vk).unwrap();
        assert_ne!(sk, mk);
        assert_ne!(mk, vk);
        assert_eq!(enclave.get_key_hash(ctx, KeyType::Sk).unwrap(), sk);
    }

    #[test]
    fn proof_verifies_only_on_its_session_and_challenge() {
        let enclave = engine();
        let (ctx, _) = ready_session(&enclave);
        let (other, _) = ready_session(&enclave);
        let challenge = QuoteNonce::from([0x77; 16]);

        let tag = enclave.generate_proof(ctx, &challenge).unwrap();
        assert!(enclave.verify_proof(ctx, &challenge, &tag));
        assert!(!enclave.verify_proof(other, &challenge, &tag));
        assert!(!enclave.verify_proof(ctx, &QuoteNonce::from([0x78; 16]), &tag));
        assert!(!enclave.verify_proof(ctx + 1000, &challenge, &tag));
    }

    #[test]
    fn close_then_use_fails() {
        let enclave = engine();
        let (ctx, _) = ready_session(&enclave);
        enclave.close(ctx).unwrap();
        assert_eq!(enclave.close(ctx), Err(Error::InvalidContext));
        assert_eq!(
            enclave.get_key_hash(ctx, KeyType::Mk),
            Err(Error::InvalidContext)
        );
    }

    /// Platform whose session calls run a scripted status sequence.
    struct ScriptedPse {
        calls: AtomicUsize,
        script: Vec<RaStatus>,
    }

    impl ScriptedPse {
        fn new(script: Vec<RaStatus>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script,
            }
        }

        fn next(&self) -> RaStatus {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.script.get(n).copied().unwrap_or(RaStatus::Success)
        }
    }

    impl PlatformServices for ScriptedPse {
        fn create_pse_session(&self) -> RaStatus {
            self.next()
        }

        fn close_pse_session(&self) -> RaStatus {
            self.next()
        }

        fn create_report(
            &self,
            target_info: Option<&TargetInfo>,
            data: &ReportData,
        ) -> Result<Report> {
            SimPlatform.create_report(target_info, data)
        }

        fn verify_report(&self, report: &Report) -> Result<()> {
            SimPlatform.verify_report(report)
        }
    }

    #[test]
    fn init_retries_busy_platform_sessions() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let enclave = RaEnclave::new(ScriptedPse::new(vec![
            RaStatus::Busy,
            RaStatus::Busy,
            RaStatus::Busy,
            RaStatus::Busy,
            RaStatus::Success, // create succeeds on the last try
            RaStatus::Success, // close
        ]));
        let mut pse_status = RaStatus::Unexpected;
        let ctx = enclave
            .init(responder.verifier_public(), true, &mut pse_status, &mut rng)
            .unwrap();
        assert_eq!(pse_status, RaStatus::Success);
        assert!(enclave.get_ga(ctx).is_ok());
    }

    #[test]
    fn init_gives_up_on_persistently_busy_platform() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let enclave = RaEnclave::new(ScriptedPse::new(vec![RaStatus::Busy; 8]));
        let mut pse_status = RaStatus::Unexpected;
        let err = enclave
            .init(responder.verifier_public(), true, &mut pse_status, &mut rng)
            .unwrap_err();
        assert_eq!(err, Error::ServiceUnavailable);
        assert_eq!(pse_status, RaStatus::Busy);
    }

    #[test]
    fn failed_pse_close_tears_the_session_down() {
        let mut rng = OsRng;
        let responder = ResponderKeys::random(&mut rng);
        let enclave = RaEnclave::new(ScriptedPse::new(vec![
            RaStatus::Success,            // create
            RaStatus::ServiceUnavailable, // close fails outright
        ]));
        let mut pse_status = RaStatus::Unexpected;
        let err = enclave
            .init(responder.verifier_public(), true, &mut pse_status, &mut rng)
            .unwrap_err();
        assert_eq!(err, Error::ServiceUnavailable);
        // The half-built session must not linger.
        assert_eq!(enclave.get_ga(1), Err(Error::InvalidContext));
    }

    /// Key hashes must not expose raw key bytes.
    #[test]
    fn key_hash_output_never_contains_key_material() {
        let mut rng = OsRng;
        for _ in 0..16 {
            let enclave = engine();
            let responder = ResponderKeys::random(&mut rng);
            let mut pse_status = RaStatus::Unexpected;
            let ctx = enclave
                .init(responder.verifier_public(), false, &mut pse_status, &mut rng)
                .unwrap();
            let g_a = enclave.get_ga(ctx).unwrap();
            let (msg2, keys) = responder_msg2(&responder, &g_a, &mut rng);
            enclave
                .process_msg2(ctx, &msg2, &TargetInfo::default(), &QuoteNonce::default())
                .unwrap();

            for (key_type, key) in [
                (KeyType::Sk, &keys.sk),
                (KeyType::Mk, &keys.mk),
                (KeyType::Vk, &keys.vk),
            ] {
                let hash = enclave.get_key_hash(ctx, key_type).unwrap();
                let window = key.as_bytes();
                assert!(!hash
                    .as_bytes()
                    .windows(window.len())
                    .any(|chunk| chunk == window));
            }
        }
    }

    #[test]
    fn sim_report_key_is_not_all_zero() {
        assert_ne!(SIM_REPORT_KEY, [0u8; 16]);
    }
}
