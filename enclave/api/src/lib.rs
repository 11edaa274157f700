// Copyright (c) 2023-2026 Provable Systems

//! Parameter blocks for the boundary entry points.
//!
//! Each entry point takes one opaque block; the trusted side validates the
//! block pointer, deep-copies it, then validates and copies every
//! by-reference field it names. Field direction is part of the contract:
//! `[in]` fields are read once and never written, `[out]` fields are
//! staged inside the boundary and written back exactly once. The `retval`
//! field carries the inner operation's status; the entry point's own
//! return value reports marshaling failures only.

#![deny(missing_docs)]

mod params;

// The status vocabulary is part of the call surface.
pub use ra_attest_core::{KeyType, RaStatus};

pub use crate::params::{
    GenerateProofParams, GetReportParams, ProcessMsg01Params, RaCloseParams, RaGetGaParams,
    RaGetKeyHashParams, RaGetMsg3Params, RaInitDefaultParams, RaInitParams, RaProcMsg2Params,
    VerifyProofParams,
};
