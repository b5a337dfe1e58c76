// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated TPM and platform shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::CStr;
use tcg2::hash::{find_algorithm, DIGEST_ALGORITHMS};
use tcg2::measure::Platform;
use tcg2::tcg::{AlgorithmId, PcrIndex};
use tcg2::tpm::{PcrSelection, PcrSelectionList, Tpm2};
use tcg2::{Result, Status, StatusExt};

/// One `TPM2_PCR_Extend` command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extend {
    pub pcr: u32,
    pub alg: AlgorithmId,
    pub digest: Vec<u8>,
}

/// TPM keeping its PCRs in memory and computing real extends.
#[derive(Debug, Default)]
pub struct SimTpm {
    pub banks: Vec<PcrSelection>,
    pub pcrs: HashMap<(u32, AlgorithmId), Vec<u8>>,
    pub extends: Vec<Extend>,
    pub started: bool,
    /// Status returned by extends of this PCR.
    pub fail_pcr: Option<(u32, Status)>,
}

impl SimTpm {
    pub fn new(active: &[AlgorithmId]) -> Self {
        Self {
            banks: active.iter().copied().map(PcrSelection::all).collect(),
            ..Self::default()
        }
    }

    pub fn pcr(&self, pcr: u32, alg: AlgorithmId) -> Vec<u8> {
        let size = find_algorithm(&DIGEST_ALGORITHMS, alg).unwrap().digest_size;
        self.pcrs
            .get(&(pcr, alg))
            .cloned()
            .unwrap_or_else(|| vec![0; usize::from(size)])
    }

    /// Forget the PCR values and the recorded commands, like a TPM reset.
    pub fn reset(&mut self) {
        self.pcrs.clear();
        self.extends.clear();
        self.started = false;
    }
}

impl Tpm2 for SimTpm {
    fn auto_start(&mut self) -> Result {
        self.started = true;
        Ok(())
    }

    fn get_pcr_info(&mut self) -> Result<PcrSelectionList> {
        let mut list = PcrSelectionList::new();
        for bank in &self.banks {
            list.push(*bank)?;
        }
        Ok(list)
    }

    fn pcr_extend(&mut self, pcr: PcrIndex, alg: AlgorithmId, digest: &[u8]) -> Result {
        if let Some((fail_pcr, status)) = self.fail_pcr {
            if fail_pcr == pcr.0 {
                return status.to_result();
            }
        }

        let hash = find_algorithm(&DIGEST_ALGORITHMS, alg)
            .and_then(|alg| alg.hash)
            .ok_or(Status::EINVAL)?;
        let mut data = self.pcr(pcr.0, alg);
        data.extend_from_slice(digest);
        let mut value = vec![0; digest.len()];
        hash(&data, &mut value);
        self.pcrs.insert((pcr.0, alg), value);

        self.extends.push(Extend {
            pcr: pcr.0,
            alg,
            digest: digest.to_vec(),
        });
        Ok(())
    }

    fn pcr_read(&mut self, pcr: PcrIndex, alg: AlgorithmId, out: &mut [u8]) -> Result {
        out.copy_from_slice(&self.pcr(pcr.0, alg));
        Ok(())
    }
}

/// Platform lending out a TPM and a log region owned by the test.
pub struct SimPlatform<'a> {
    pub tpm: Option<&'a mut SimTpm>,
    pub log: Option<&'a mut [u8]>,
    pub startup_errors: Vec<Status>,
}

impl<'a> SimPlatform<'a> {
    pub fn new(tpm: &'a mut SimTpm, log: &'a mut [u8]) -> Self {
        Self {
            tpm: Some(tpm),
            log: Some(log),
            startup_errors: Vec::new(),
        }
    }
}

impl<'a> Platform for SimPlatform<'a> {
    type Tpm = &'a mut SimTpm;
    type Log = &'a mut [u8];

    fn get_tpm2(&mut self) -> Result<Self::Tpm> {
        self.tpm.take().ok_or_else(|| Status::ENODEV.into())
    }

    fn get_log(&mut self, _tpm: &Self::Tpm) -> Result<Self::Log> {
        self.log.take().ok_or_else(|| Status::ENOENT.into())
    }

    fn firmware_version(&self) -> &CStr {
        c"bootloader 2024.07"
    }

    fn startup_error(&mut self, status: Status) {
        self.startup_errors.push(status);
    }
}
