// Copyright (c) 2023-2026 Provable Systems

//! Shared data model for the remote attestation trusted core.
//!
//! Everything in this crate is either a fixed-layout `#[repr(C)]` container
//! that may cross the trust boundary by value, or vocabulary (statuses, key
//! types, error kinds) shared between the trusted and untrusted sides. No
//! cryptography happens here; the key schedule and session logic live in
//! `ra-attest-trusted`.

#![no_std]
#![deny(missing_docs)]

extern crate alloc;

mod error;
mod keys;
mod messages;
mod report;
mod status;

pub use crate::{
    error::EncodingError,
    keys::{Ec256Public, Ec256Signature, Key128, MacTag, Sha256Hash, DEFAULT_VERIFIER_KEY},
    messages::{msg3_size, Msg1, Msg2, EXTENDED_GID_SENTINEL, KDF_ID_DEFAULT, MSG3_HEADER_SIZE, PS_SEC_PROP_SIZE},
    report::{QuoteNonce, Report, ReportBody, ReportData, TargetInfo, REPORT_BODY_SIZE},
    status::{KeyType, RaStatus},
};
