// SPDX-License-Identifier: MIT OR Apache-2.0

//! TPM 2.0 device access used by the measurement code.
//!
//! The command transport is not part of this crate. Firmware provides it by
//! implementing [`Tpm2`]; this module builds the bank queries and digest
//! list extends on top of that trait.

use crate::hash::DigestList;
use crate::tcg::{AlgorithmId, HashAlgorithm, PcrIndex, NUM_PCR_BANKS, PCR_SELECT_MAX};
use crate::{Result, Status};
use bitflags::bitflags;
use core::slice;
use log::{error, warn};

/// Version of a TPM device.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TpmVersion {
    /// TPM 1.2, not supported for measurements.
    V1,
    /// TPM 2.0.
    V2,
}

/// Selection of PCRs of one bank, as reported by `TPM2_GetCapability`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PcrSelection {
    /// Hash algorithm of the bank.
    pub hash: AlgorithmId,
    /// Number of valid bytes of `pcr_select`.
    pub size_of_select: u8,
    /// Bitmap of the selected PCRs.
    pub pcr_select: [u8; PCR_SELECT_MAX],
}

impl PcrSelection {
    /// Bank with all 24 PC client PCRs selected.
    #[must_use]
    pub const fn all(hash: AlgorithmId) -> Self {
        Self {
            hash,
            size_of_select: 3,
            pcr_select: [0xff, 0xff, 0xff, 0x00],
        }
    }

    /// Bank present in the TPM but not allocated.
    #[must_use]
    pub const fn none(hash: AlgorithmId) -> Self {
        Self {
            hash,
            size_of_select: 3,
            pcr_select: [0; PCR_SELECT_MAX],
        }
    }

    /// Whether the bank has any PCR selected, i.e. is extended by
    /// measurements.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let size = usize::from(self.size_of_select).min(PCR_SELECT_MAX);
        self.pcr_select[..size].iter().any(|b| *b != 0)
    }
}

/// PCR banks reported by the TPM, in TPM order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcrSelectionList {
    count: usize,
    selections: [PcrSelection; NUM_PCR_BANKS],
}

impl PcrSelectionList {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bank. Fails with [`Status::ENOBUFS`] past
    /// [`NUM_PCR_BANKS`] entries.
    pub fn push(&mut self, selection: PcrSelection) -> Result {
        let slot = self
            .selections
            .get_mut(self.count)
            .ok_or(Status::ENOBUFS)?;
        *slot = selection;
        self.count += 1;
        Ok(())
    }

    /// Number of banks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether no bank was reported.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over the banks.
    pub fn iter(&self) -> slice::Iter<'_, PcrSelection> {
        self.selections[..self.count].iter()
    }
}

/// TPM 2.0 command transport.
///
/// Errors are returned as-is by every operation of this crate that issues
/// the command.
pub trait Tpm2 {
    /// Version of the device. Only [`TpmVersion::V2`] devices can measure.
    fn version(&self) -> TpmVersion {
        TpmVersion::V2
    }

    /// Start up the TPM and run its self test if that has not happened yet.
    fn auto_start(&mut self) -> Result;

    /// Read the PCR allocation (`TPM2_CAP_PCRS`).
    fn get_pcr_info(&mut self) -> Result<PcrSelectionList>;

    /// Extend `pcr` in the bank of `alg` with `digest`.
    fn pcr_extend(&mut self, pcr: PcrIndex, alg: AlgorithmId, digest: &[u8]) -> Result;

    /// Read `pcr` of the bank of `alg` into `out`, which has the canonical
    /// digest size of `alg`.
    fn pcr_read(&mut self, pcr: PcrIndex, alg: AlgorithmId, out: &mut [u8]) -> Result;
}

impl<T: Tpm2 + ?Sized> Tpm2 for &mut T {
    fn version(&self) -> TpmVersion {
        (**self).version()
    }

    fn auto_start(&mut self) -> Result {
        (**self).auto_start()
    }

    fn get_pcr_info(&mut self) -> Result<PcrSelectionList> {
        (**self).get_pcr_info()
    }

    fn pcr_extend(&mut self, pcr: PcrIndex, alg: AlgorithmId, digest: &[u8]) -> Result {
        (**self).pcr_extend(pcr, alg, digest)
    }

    fn pcr_read(&mut self, pcr: PcrIndex, alg: AlgorithmId, out: &mut [u8]) -> Result {
        (**self).pcr_read(pcr, alg, out)
    }
}

/// PCR bank masks of a TPM.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PcrInfo {
    /// Banks the TPM implements.
    pub supported: HashAlgorithm,
    /// Banks with at least one PCR allocated.
    pub active: HashAlgorithm,
    /// Number of banks reported, known or not.
    pub bank_count: u32,
}

/// Query the supported and active PCR banks.
///
/// Banks with an unknown algorithm are excluded from both masks.
pub fn get_pcr_info<T: Tpm2 + ?Sized>(tpm: &mut T) -> Result<PcrInfo> {
    let pcrs = tpm.get_pcr_info()?;

    let mut info = PcrInfo::default();
    for selection in pcrs.iter() {
        info.bank_count += 1;

        let mask = HashAlgorithm::from_algorithm_id(selection.hash);
        if mask.is_empty() {
            warn!("unknown algorithm {:?} in PCR bank list", selection.hash);
            continue;
        }
        info.supported |= mask;
        if selection.is_active() {
            info.active |= mask;
        }
    }

    Ok(info)
}

/// Query the active PCR banks.
pub fn get_active_pcr_banks<T: Tpm2 + ?Sized>(tpm: &mut T) -> Result<HashAlgorithm> {
    Ok(get_pcr_info(tpm)?.active)
}

/// Extend `pcr` with every digest of `digests`, in list order.
pub fn pcr_extend<T: Tpm2 + ?Sized>(tpm: &mut T, pcr: PcrIndex, digests: &DigestList) -> Result {
    for digest in digests {
        tpm.pcr_extend(pcr, digest.algorithm(), digest.as_bytes())
            .inspect_err(|err| {
                error!(
                    "failed to extend PCR {} with {:?} digest: {}",
                    pcr.0,
                    digest.algorithm(),
                    err.status()
                );
            })?;
    }
    Ok(())
}

/// Read the value of `pcr` for every algorithm of `digests` into the list.
pub fn pcr_read<T: Tpm2 + ?Sized>(
    tpm: &mut T,
    pcr: PcrIndex,
    digests: &mut DigestList,
) -> Result {
    for digest in digests.as_mut_slice() {
        let alg = digest.algorithm();
        tpm.pcr_read(pcr, alg, digest.as_bytes_mut())?;
    }
    Ok(())
}

bitflags! {
    /// Event log formats supported by the firmware.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct EventLogFormat: u32 {
        /// Firmware supports the SHA-1 log format.
        const TCG_1_2 = 0x0000_0001;

        /// Firmware supports the crypto-agile log format.
        const TCG_2 = 0x0000_0002;
    }
}

/// Information about the TPM device and the logs the firmware produces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Capability {
    /// Whether a TPM 2.0 device was found.
    pub tpm_present: bool,
    /// Log formats produced. Only the crypto-agile format is.
    pub supported_event_logs: EventLogFormat,
    /// Banks the TPM implements.
    pub hash_algorithm_bitmap: HashAlgorithm,
    /// Banks currently active.
    pub active_pcr_banks: HashAlgorithm,
    /// Number of banks reported by the TPM.
    pub number_of_pcr_banks: u32,
}

impl Capability {
    /// Capability when no TPM 2.0 device exists.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            tpm_present: false,
            supported_event_logs: EventLogFormat::TCG_2,
            hash_algorithm_bitmap: HashAlgorithm::empty(),
            active_pcr_banks: HashAlgorithm::empty(),
            number_of_pcr_banks: 0,
        }
    }

    /// Query the capability of `tpm`.
    pub fn query<T: Tpm2 + ?Sized>(tpm: &mut T) -> Result<Self> {
        if tpm.version() != TpmVersion::V2 {
            return Ok(Self::absent());
        }

        let info = get_pcr_info(tpm)?;
        Ok(Self {
            tpm_present: true,
            supported_event_logs: EventLogFormat::TCG_2,
            hash_algorithm_bitmap: info.supported,
            active_pcr_banks: info.active,
            number_of_pcr_banks: info.bank_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{digest_with_banks, DIGEST_ALGORITHMS};
    use crate::testing::FakeTpm;

    #[test]
    fn test_pcr_selection_active() {
        assert!(PcrSelection::all(AlgorithmId::SHA1).is_active());
        assert!(!PcrSelection::none(AlgorithmId::SHA1).is_active());

        // Bits past `size_of_select` do not count.
        let sel = PcrSelection {
            hash: AlgorithmId::SHA256,
            size_of_select: 1,
            pcr_select: [0, 0xff, 0, 0],
        };
        assert!(!sel.is_active());
    }

    #[test]
    fn test_get_pcr_info() {
        let mut tpm = FakeTpm::with_banks(&[
            PcrSelection::all(AlgorithmId::SHA256),
            PcrSelection::none(AlgorithmId::SHA1),
            PcrSelection::all(AlgorithmId(0x0027)),
            PcrSelection::all(AlgorithmId::SHA384),
        ]);

        let info = get_pcr_info(&mut tpm).unwrap();
        assert_eq!(
            info.supported,
            HashAlgorithm::SHA1 | HashAlgorithm::SHA256 | HashAlgorithm::SHA384
        );
        assert_eq!(info.active, HashAlgorithm::SHA256 | HashAlgorithm::SHA384);
        assert_eq!(info.bank_count, 4);
    }

    #[test]
    fn test_get_pcr_info_transport_error() {
        let mut tpm = FakeTpm::with_banks(&[PcrSelection::all(AlgorithmId::SHA256)]);
        tpm.fail_get_pcr_info = true;
        assert_eq!(
            get_active_pcr_banks(&mut tpm).unwrap_err().status(),
            Status::EIO
        );
    }

    #[test]
    fn test_pcr_extend_list_order() {
        let mut tpm = FakeTpm::with_banks(&[
            PcrSelection::all(AlgorithmId::SHA256),
            PcrSelection::all(AlgorithmId::SHA1),
        ]);
        let active = HashAlgorithm::SHA1 | HashAlgorithm::SHA256;
        let list = digest_with_banks(&DIGEST_ALGORITHMS, active, b"data");

        pcr_extend(&mut tpm, PcrIndex(4), &list).unwrap();
        assert_eq!(tpm.extends.len(), 2);
        assert_eq!(tpm.extends[0].alg, AlgorithmId::SHA1);
        assert_eq!(tpm.extends[1].alg, AlgorithmId::SHA256);
        assert!(tpm.extends.iter().all(|e| e.pcr == PcrIndex(4)));
    }

    #[test]
    fn test_pcr_extend_stops_at_failure() {
        let mut tpm = FakeTpm::with_banks(&[
            PcrSelection::all(AlgorithmId::SHA1),
            PcrSelection::all(AlgorithmId::SHA256),
        ]);
        tpm.fail_extend = Some(AlgorithmId::SHA1);
        let list = digest_with_banks(
            &DIGEST_ALGORITHMS,
            HashAlgorithm::SHA1 | HashAlgorithm::SHA256,
            b"data",
        );

        assert_eq!(
            pcr_extend(&mut tpm, PcrIndex(0), &list).unwrap_err().status(),
            Status::EIO
        );
        assert!(tpm.extends.is_empty());
    }

    #[test]
    fn test_pcr_read() {
        let mut tpm = FakeTpm::with_banks(&[PcrSelection::all(AlgorithmId::SHA256)]);
        tpm.set_pcr(PcrIndex(0), AlgorithmId::SHA256, &[0x42; 32]);

        let mut list = DigestList::new();
        list.push(crate::hash::DigestValue::zeroed(AlgorithmId::SHA256).unwrap())
            .unwrap();
        pcr_read(&mut tpm, PcrIndex(0), &mut list).unwrap();
        assert_eq!(list.as_slice()[0].as_bytes(), [0x42; 32]);
    }

    #[test]
    fn test_capability() {
        let mut tpm = FakeTpm::with_banks(&[
            PcrSelection::all(AlgorithmId::SHA256),
            PcrSelection::none(AlgorithmId::SHA1),
        ]);
        let cap = Capability::query(&mut tpm).unwrap();
        assert!(cap.tpm_present);
        assert_eq!(cap.supported_event_logs, EventLogFormat::TCG_2);
        assert_eq!(cap.active_pcr_banks, HashAlgorithm::SHA256);
        assert_eq!(
            cap.hash_algorithm_bitmap,
            HashAlgorithm::SHA1 | HashAlgorithm::SHA256
        );
        assert_eq!(cap.number_of_pcr_banks, 2);

        assert!(!Capability::absent().tpm_present);
    }
}
