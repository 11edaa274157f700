// Copyright (c) 2023-2026 Provable Systems

//! Platform service seams.
//!
//! The state machine talks to the platform-services facility and the report
//! facility through [`PlatformServices`], so the protocol logic can run
//! against the hardware-backed implementation or the simulator unchanged.

use crate::{error::Error, kdf::cmac_tag};
use ra_attest_core::{MacTag, RaStatus, Report, ReportData, TargetInfo};
use subtle::ConstantTimeEq;

/// How many times a busy platform-services session call is retried before
/// giving up.
pub const PSE_RETRIES: usize = 5;

/// The platform facilities the key-exchange engine depends on.
pub trait PlatformServices: Send + Sync {
    /// Open a platform-services session.
    fn create_pse_session(&self) -> RaStatus;

    /// Close the platform-services session.
    fn close_pse_session(&self) -> RaStatus;

    /// Produce a report binding `data`, targeted at `target_info` when
    /// given, at this enclave otherwise.
    fn create_report(
        &self,
        target_info: Option<&TargetInfo>,
        data: &ReportData,
    ) -> Result<Report, Error>;

    /// Check that `report` was produced on this platform and targeted at
    /// this enclave.
    fn verify_report(&self, report: &Report) -> Result<(), Error>;
}

/// Run `f` until it stops reporting busy, up to [`PSE_RETRIES`] attempts.
pub(crate) fn retry_busy<F: FnMut() -> RaStatus>(mut f: F) -> RaStatus {
    let mut status = RaStatus::Busy;
    for _ in 0..PSE_RETRIES {
        status = f();
        if status != RaStatus::Busy {
            break;
        }
    }
    status
}

/// Fixed identity the simulator reports claim.
pub const SIM_MRENCLAVE: [u8; 32] = [0xE1; 32];
/// Fixed signer the simulator reports claim.
pub const SIM_MRSIGNER: [u8; 32] = [0x51; 32];
/// Key the simulator MACs report bodies with.
pub const SIM_REPORT_KEY: [u8; 16] = [0xC3; 16];

/// Software stand-in for the hardware report and platform-services
/// facilities. Reports carry a fixed identity and a CMAC under a
/// compiled-in key, so they verify only against this simulator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimPlatform;

impl PlatformServices for SimPlatform {
    fn create_pse_session(&self) -> RaStatus {
        RaStatus::Success
    }

    fn close_pse_session(&self) -> RaStatus {
        RaStatus::Success
    }

    fn create_report(
        &self,
        _target_info: Option<&TargetInfo>,
        data: &ReportData,
    ) -> Result<Report, Error> {
        let mut report = Report::default();
        report.body.mr_enclave = SIM_MRENCLAVE;
        report.body.mr_signer = SIM_MRSIGNER;
        report.body.isv_prod_id = [1, 0];
        report.body.isv_svn = [1, 0];
        report.body.report_data = *data;
        report.mac = MacTag::from(cmac_tag(&SIM_REPORT_KEY, report.body.as_bytes())?);
        Ok(report)
    }

    fn verify_report(&self, report: &Report) -> Result<(), Error> {
        let expected = cmac_tag(&SIM_REPORT_KEY, report.body.as_bytes())?;
        if expected.ct_eq(report.mac.as_bytes()).into() {
            Ok(())
        } else {
            Err(Error::MacMismatch)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn sim_report_round_trips() {
        let platform = SimPlatform;
        let data = ReportData::from_digest(&[0xAB; 32]);
        let report = platform.create_report(None, &data).unwrap();
        assert_eq!(report.body.report_data, data);
        assert_eq!(platform.verify_report(&report), Ok(()));
    }

    #[test]
    fn sim_rejects_tampered_report() {
        let platform = SimPlatform;
        let mut report = platform
            .create_report(None, &ReportData::default())
            .unwrap();
        report.body.mr_enclave[0] ^= 1;
        assert_eq!(platform.verify_report(&report), Err(Error::MacMismatch));
    }

    #[test]
    fn retry_stops_on_first_non_busy() {
        let calls = AtomicUsize::new(0);
        let status = retry_busy(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 3 {
                RaStatus::Busy
            } else {
                RaStatus::Success
            }
        });
        assert_eq!(status, RaStatus::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn retry_gives_up_after_limit() {
        let calls = AtomicUsize::new(0);
        let status = retry_busy(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            RaStatus::Busy
        });
        assert_eq!(status, RaStatus::Busy);
        assert_eq!(calls.load(Ordering::SeqCst), PSE_RETRIES);
    }
}
