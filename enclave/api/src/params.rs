// Copyright (c) 2023-2026 Provable Systems

//! The per-operation parameter block layouts.

use ra_attest_core::{
    Ec256Public, MacTag, Msg1, Msg2, QuoteNonce, Report, Sha256Hash, TargetInfo,
};
use ra_enclave_boundary::BoundarySafe;

/// `get_report`: produce a local attestation report.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct GetReportParams {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[out]` The produced report.
    pub report: *mut Report,
    /// `[in, optional]` Target to direct the report at; null for the
    /// platform default.
    pub target_info: *const TargetInfo,
}

/// `ra_init`: open a session bound to an explicit verifier key.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RaInitParams {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[in, value]` The verifier's public key.
    pub key: Ec256Public,
    /// `[in, value]` Nonzero to request the platform-services binding.
    pub b_pse: i32,
    /// `[out]` The opaque context handle; zero when initialization fails.
    pub ctx: *mut u32,
    /// `[out]` Platform-services outcome discriminant, reported separately
    /// from `retval` so callers can tell a service failure from an RA
    /// failure.
    pub pse_status: *mut u32,
}

/// `ra_init_default`: open a session with the compiled-in verifier key.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RaInitDefaultParams {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[in, value]` Nonzero to request the platform-services binding.
    pub b_pse: i32,
    /// `[out]` The opaque context handle; zero when initialization fails.
    pub ctx: *mut u32,
    /// `[out]` Platform-services outcome discriminant.
    pub pse_status: *mut u32,
}

/// `ra_get_key_hash`: proof of possession of a derived key.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RaGetKeyHashParams {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[out]` Key-retrieval outcome discriminant, separate from the
    /// overall status.
    pub get_keys_status: *mut u32,
    /// `[in, value]` The session context.
    pub ctx: u32,
    /// `[in, value]` Raw key-type selector (validated inside).
    pub key_type: u32,
    /// `[out]` SHA-256 of the requested key. Never the key itself.
    pub hash: *mut Sha256Hash,
}

/// `ra_close`: tear down a session.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RaCloseParams {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[in, value]` The session context; invalid afterward regardless of
    /// the reported status.
    pub ctx: u32,
}

/// `ra_get_ephemeral_public`: this side's key-agreement component.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RaGetGaParams {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[in, value]` The session context.
    pub ctx: u32,
    /// `[out]` The ephemeral public key.
    pub g_a: *mut Ec256Public,
}

/// `ra_process_verifier_message`: consume msg2, emit evidence.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RaProcMsg2Params {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[in, value]` The session context.
    pub ctx: u32,
    /// `[in]` The verifier's contribution.
    pub msg2: *const Msg2,
    /// `[in]` Quoting-service target information.
    pub qe_target: *const TargetInfo,
    /// `[in]` Caller nonce to bind into quote generation.
    pub nonce: *const QuoteNonce,
    /// `[out]` The report for the quoting service.
    pub report: *mut Report,
    /// `[out]` The nonce echoed back under the session binding.
    pub nonce_echo: *mut QuoteNonce,
}

/// `ra_produce_proof_message`: assemble and authenticate msg3.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RaGetMsg3Params {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[in, value]` The session context.
    pub ctx: u32,
    /// `[in, size = quote_size]` The opaque quote blob.
    pub quote: *const u8,
    /// `[in, value]` Declared quote size.
    pub quote_size: u32,
    /// `[in]` The quoting service's own report over the quote.
    pub qe_report: *const Report,
    /// `[out, size = msg3_size]` The assembled proof message.
    pub msg3: *mut u8,
    /// `[in, value]` Declared total message size; must equal the layout
    /// computed from `quote_size` exactly.
    pub msg3_size: u32,
}

/// `process_msg0_msg1`: protocol gate for the first inbound messages.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct ProcessMsg01Params {
    /// `[out]` 1 to accept the peer, 0 to abort the handshake.
    pub accept: i32,
    /// `[in, value]` The extended group identifier from msg0.
    pub extended_gid: u32,
    /// `[in]` The peer's msg1.
    pub msg1: *const Msg1,
}

/// `generate_proof`: MAC-based proof of possession over a challenge.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct GenerateProofParams {
    /// `[out]` Operation status, as the raw `RaStatus` discriminant.
    pub retval: u32,
    /// `[in, value]` The session context.
    pub ctx: u32,
    /// `[in, value]` The peer's challenge.
    pub challenge: QuoteNonce,
    /// `[out]` The possession tag.
    pub tag: *mut MacTag,
}

/// `verify_proof`: check a peer's possession tag.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct VerifyProofParams {
    /// `[out]` 1 when the tag verifies, 0 otherwise.
    pub accept: i32,
    /// `[in, value]` The session context.
    pub ctx: u32,
    /// `[in, value]` The challenge the tag should cover.
    pub challenge: QuoteNonce,
    /// `[in]` The tag to check.
    pub tag: *const MacTag,
}

unsafe impl BoundarySafe for GetReportParams {}
unsafe impl BoundarySafe for RaInitParams {}
unsafe impl BoundarySafe for RaInitDefaultParams {}
unsafe impl BoundarySafe for RaGetKeyHashParams {}
unsafe impl BoundarySafe for RaCloseParams {}
unsafe impl BoundarySafe for RaGetGaParams {}
unsafe impl BoundarySafe for RaProcMsg2Params {}
unsafe impl BoundarySafe for RaGetMsg3Params {}
unsafe impl BoundarySafe for ProcessMsg01Params {}
unsafe impl BoundarySafe for GenerateProofParams {}
unsafe impl BoundarySafe for VerifyProofParams {}
