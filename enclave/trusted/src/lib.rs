// Copyright (c) 2023-2026 Provable Systems

//! Boundary entry points for the trusted attestation core.
//!
//! One `extern "C"` function per operation, each following the same shape:
//! validate and copy the parameter block, deep-copy the `[in]` fields,
//! stage the `[out]` fields, run the operation against the engine, commit
//! the outs, and write the operation's status into the block's `retval`.
//! The function's own return value reports marshaling failures only.

#![deny(missing_docs)]

mod diag;
mod hex;

pub use crate::{diag::DiagnosticSink, hex::HexBuffer};

use core::ffi::c_void;
use lazy_static::lazy_static;
use ra_attest_core::{KeyType, RaStatus, ReportData};
use ra_attest_trusted::{msg0_accepted, RaEnclave, SimPlatform};
use ra_enclave_api::{
    GenerateProofParams, GetReportParams, ProcessMsg01Params, RaCloseParams, RaGetGaParams,
    RaGetKeyHashParams, RaGetMsg3Params, RaInitDefaultParams, RaInitParams, RaProcMsg2Params,
    VerifyProofParams,
};
use ra_enclave_boundary::{
    trusted::{
        boundary_ecall, checked_layout, copy_in, copy_in_bytes, copy_in_opt, copy_out_bytes,
        poke, OutSlot,
    },
    BoundaryError,
};
use rand::rngs::OsRng;

lazy_static! {
    static ref ENCLAVE: RaEnclave<SimPlatform> = RaEnclave::default();
    static ref DIAG: DiagnosticSink = DiagnosticSink::new();
}

/// Produce a local attestation report, optionally targeted at another
/// enclave.
#[no_mangle]
pub extern "C" fn ecall_get_report(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<GetReportParams, _>(pms, |block, user| {
        let target_info = copy_in_opt(block.target_info)?;
        let mut report_out = OutSlot::stage(block.report)?;

        let status = match ENCLAVE.create_report(target_info.as_ref(), &ReportData::default()) {
            Ok(report) => {
                report_out.set(report);
                report_out.commit()?;
                RaStatus::Success
            }
            Err(e) => e.into(),
        };
        poke(unsafe { core::ptr::addr_of_mut!((*user).retval) }, status as u32)
    })
}

fn do_init(
    key: ra_attest_core::Ec256Public,
    b_pse: i32,
    ctx: *mut u32,
    pse_status: *mut u32,
    retval: *mut u32,
) -> Result<(), BoundaryError> {
    let mut ctx_out = OutSlot::stage(ctx)?;
    let mut pse_out = OutSlot::stage(pse_status)?;

    let mut pse = RaStatus::Success;
    let status = match ENCLAVE.init(key, b_pse != 0, &mut pse, &mut OsRng) {
        Ok(id) => {
            ctx_out.set(id);
            RaStatus::Success
        }
        Err(e) => e.into(),
    };
    pse_out.set(pse as u32);

    // The context stays zero on failure so the caller never holds a
    // handle to a session that does not exist.
    ctx_out.commit()?;
    pse_out.commit()?;
    poke(retval, status as u32)
}

/// Open a key-exchange session bound to the caller-supplied verifier key.
#[no_mangle]
pub extern "C" fn ecall_ra_init(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<RaInitParams, _>(pms, |block, user| {
        do_init(block.key, block.b_pse, block.ctx, block.pse_status, unsafe {
            core::ptr::addr_of_mut!((*user).retval)
        })
    })
}

/// Open a key-exchange session bound to the compiled-in verifier key.
#[no_mangle]
pub extern "C" fn ecall_ra_init_default(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<RaInitDefaultParams, _>(pms, |block, user| {
        do_init(
            ra_attest_core::DEFAULT_VERIFIER_KEY,
            block.b_pse,
            block.ctx,
            block.pse_status,
            unsafe { core::ptr::addr_of_mut!((*user).retval) },
        )
    })
}

/// Return SHA-256 of a derived session key. The key itself never crosses.
#[no_mangle]
pub extern "C" fn ecall_ra_get_key_hash(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<RaGetKeyHashParams, _>(pms, |block, user| {
        let mut hash_out = OutSlot::stage(block.hash)?;
        let mut get_keys_out = OutSlot::stage(block.get_keys_status)?;

        let status = match KeyType::try_from(block.key_type) {
            Err(_) => RaStatus::InvalidParameter,
            Ok(key_type) => match ENCLAVE.get_key_hash(block.ctx, key_type) {
                Ok(hash) => {
                    hash_out.set(hash);
                    hash_out.commit()?;
                    RaStatus::Success
                }
                Err(e) => e.into(),
            },
        };
        get_keys_out.set(status as u32);
        get_keys_out.commit()?;
        poke(unsafe { core::ptr::addr_of_mut!((*user).retval) }, status as u32)
    })
}

/// Tear down a session. The handle is dead afterward either way.
#[no_mangle]
pub extern "C" fn ecall_ra_close(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<RaCloseParams, _>(pms, |block, user| {
        let status = match ENCLAVE.close(block.ctx) {
            Ok(()) => RaStatus::Success,
            Err(e) => e.into(),
        };
        poke(unsafe { core::ptr::addr_of_mut!((*user).retval) }, status as u32)
    })
}

/// Return the session's ephemeral public key.
#[no_mangle]
pub extern "C" fn ecall_ra_get_ga(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<RaGetGaParams, _>(pms, |block, user| {
        let mut ga_out = OutSlot::stage(block.g_a)?;
        let status = match ENCLAVE.get_ga(block.ctx) {
            Ok(g_a) => {
                ga_out.set(g_a);
                ga_out.commit()?;
                RaStatus::Success
            }
            Err(e) => e.into(),
        };
        poke(unsafe { core::ptr::addr_of_mut!((*user).retval) }, status as u32)
    })
}

/// Authenticate the verifier's challenge and produce the report for the
/// quoting service.
#[no_mangle]
pub extern "C" fn ecall_ra_proc_msg2(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<RaProcMsg2Params, _>(pms, |block, user| {
        let msg2 = copy_in(block.msg2)?;
        let qe_target = copy_in(block.qe_target)?;
        let nonce = copy_in(block.nonce)?;
        let mut report_out = OutSlot::stage(block.report)?;
        let mut nonce_out = OutSlot::stage(block.nonce_echo)?;

        let status = match ENCLAVE.process_msg2(block.ctx, &msg2, &qe_target, &nonce) {
            Ok((report, echo)) => {
                report_out.set(report);
                nonce_out.set(echo);
                report_out.commit()?;
                nonce_out.commit()?;
                RaStatus::Success
            }
            Err(e) => e.into(),
        };
        poke(unsafe { core::ptr::addr_of_mut!((*user).retval) }, status as u32)
    })
}

/// Assemble and authenticate the outbound proof message.
#[no_mangle]
pub extern "C" fn ecall_ra_get_msg3(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<RaGetMsg3Params, _>(pms, |block, user| {
        // Bound the output layout before copying anything in.
        checked_layout(ra_attest_core::MSG3_HEADER_SIZE, block.quote_size as usize)?;
        let quote = copy_in_bytes(block.quote, block.quote_size as usize)?;
        let qe_report = copy_in(block.qe_report)?;

        let status = match ENCLAVE.generate_msg3(block.ctx, &quote, block.msg3_size, &qe_report) {
            Ok(msg3) => {
                copy_out_bytes(block.msg3, block.msg3_size as usize, &msg3)?;
                RaStatus::Success
            }
            Err(e) => e.into(),
        };
        poke(unsafe { core::ptr::addr_of_mut!((*user).retval) }, status as u32)
    })
}

/// Gate the first inbound messages: only the sentinel extended group id is
/// accepted, and the peer's key-agreement component is echoed to the
/// diagnostic channel.
#[no_mangle]
pub extern "C" fn ecall_process_msg01(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<ProcessMsg01Params, _>(pms, |block, user| {
        let msg1 = copy_in(block.msg1)?;

        let accept = msg0_accepted(block.extended_gid);
        if accept {
            DIAG.emit_hex("msg1.g_a.gx", &msg1.g_a.gx);
            DIAG.emit_hex("msg1.g_a.gy", &msg1.g_a.gy);
            DIAG.emit_hex("msg1.gid", &msg1.gid);
        } else {
            DIAG.emit("msg0: unsupported extended group id, aborting handshake");
        }
        poke(
            unsafe { core::ptr::addr_of_mut!((*user).accept) },
            i32::from(accept),
        )
    })
}

/// Produce a proof-of-possession tag over a caller challenge.
#[no_mangle]
pub extern "C" fn ecall_generate_proof(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<GenerateProofParams, _>(pms, |block, user| {
        let mut tag_out = OutSlot::stage(block.tag)?;
        let status = match ENCLAVE.generate_proof(block.ctx, &block.challenge) {
            Ok(tag) => {
                tag_out.set(tag);
                tag_out.commit()?;
                RaStatus::Success
            }
            Err(e) => e.into(),
        };
        poke(unsafe { core::ptr::addr_of_mut!((*user).retval) }, status as u32)
    })
}

/// Check a proof-of-possession tag. Unknown sessions verify nothing.
#[no_mangle]
pub extern "C" fn ecall_verify_proof(pms: *mut c_void) -> RaStatus {
    boundary_ecall::<VerifyProofParams, _>(pms, |block, user| {
        let tag = copy_in(block.tag)?;
        let accept = ENCLAVE.verify_proof(block.ctx, &block.challenge, &tag);
        poke(
            unsafe { core::ptr::addr_of_mut!((*user).accept) },
            i32::from(accept),
        )
    })
}
