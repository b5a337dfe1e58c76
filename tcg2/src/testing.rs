// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory TPM for unit tests.

use crate::hash::{find_algorithm, DIGEST_ALGORITHMS};
use crate::tcg::{AlgorithmId, PcrIndex};
use crate::tpm::{PcrSelection, PcrSelectionList, Tpm2, TpmVersion};
use crate::{Result, Status};
use alloc::vec::Vec;

#[derive(Debug)]
pub struct Extend {
    pub pcr: PcrIndex,
    pub alg: AlgorithmId,
    pub digest: Vec<u8>,
}

#[derive(Debug)]
pub struct FakeTpm {
    pub version: TpmVersion,
    pub banks: PcrSelectionList,
    pub started: bool,
    pub extends: Vec<Extend>,
    pub pcrs: Vec<(PcrIndex, AlgorithmId, Vec<u8>)>,
    pub fail_get_pcr_info: bool,
    pub fail_extend: Option<AlgorithmId>,
}

impl FakeTpm {
    pub fn with_banks(banks: &[PcrSelection]) -> Self {
        let mut list = PcrSelectionList::new();
        for bank in banks {
            list.push(*bank).unwrap();
        }
        Self {
            version: TpmVersion::V2,
            banks: list,
            started: false,
            extends: Vec::new(),
            pcrs: Vec::new(),
            fail_get_pcr_info: false,
            fail_extend: None,
        }
    }

    pub fn set_pcr(&mut self, pcr: PcrIndex, alg: AlgorithmId, value: &[u8]) {
        self.pcrs.retain(|(p, a, _)| !(*p == pcr && *a == alg));
        self.pcrs.push((pcr, alg, value.to_vec()));
    }

    pub fn pcr(&self, pcr: PcrIndex, alg: AlgorithmId) -> Option<&[u8]> {
        self.pcrs
            .iter()
            .find(|(p, a, _)| *p == pcr && *a == alg)
            .map(|(_, _, value)| value.as_slice())
    }
}

impl Tpm2 for FakeTpm {
    fn version(&self) -> TpmVersion {
        self.version
    }

    fn auto_start(&mut self) -> Result {
        self.started = true;
        Ok(())
    }

    fn get_pcr_info(&mut self) -> Result<PcrSelectionList> {
        if self.fail_get_pcr_info {
            return Err(Status::EIO.into());
        }
        Ok(self.banks)
    }

    fn pcr_extend(&mut self, pcr: PcrIndex, alg: AlgorithmId, digest: &[u8]) -> Result {
        if self.fail_extend == Some(alg) {
            return Err(Status::EIO.into());
        }
        let algorithm = find_algorithm(&DIGEST_ALGORITHMS, alg).ok_or(Status::EINVAL)?;
        let hash = algorithm.hash.ok_or(Status::ENOTSUPP)?;

        let mut data = self
            .pcr(pcr, alg)
            .map(<[u8]>::to_vec)
            .unwrap_or_else(|| alloc::vec![0; digest.len()]);
        data.extend_from_slice(digest);
        let mut value = alloc::vec![0; digest.len()];
        hash(&data, &mut value);
        self.set_pcr(pcr, alg, &value);

        self.extends.push(Extend {
            pcr,
            alg,
            digest: digest.to_vec(),
        });
        Ok(())
    }

    fn pcr_read(&mut self, pcr: PcrIndex, alg: AlgorithmId, out: &mut [u8]) -> Result {
        match self.pcr(pcr, alg) {
            Some(value) => out.copy_from_slice(value),
            None => out.fill(0),
        }
        Ok(())
    }
}
