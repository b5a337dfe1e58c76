// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounds-checked decoding of a crypto-agile event log.
//!
//! The log may have been written by an earlier boot stage, so nothing in it
//! is trusted: every field is read through [`slice::get`] and every offset
//! computation is checked. A record that does not decode cleanly ends the
//! iteration.

use super::codec::spec_id_event_size;
use crate::hash::{DigestList, DigestValue};
use crate::tcg::{
    algorithm_digest_size, AlgorithmId, EventType, HashAlgorithm, PcrIndex, MAX_DIGESTS,
    PCR_EVENT2_ALGORITHM_ID_SIZE, PCR_EVENT2_EVENT_SIZE_SIZE, PCR_EVENT2_HEADER_SIZE,
    PCR_EVENT_HEADER_SIZE, SHA1_DIGEST_SIZE, SPEC_ID_EVENT_FIXED_SIZE,
    SPEC_ID_EVENT_ALGORITHM_SIZE, SPEC_ID_EVENT_SIGNATURE_03,
    SPEC_ID_EVENT_SPEC_VERSION_ERRATA_TPM2, SPEC_ID_EVENT_SPEC_VERSION_MAJOR_TPM2,
    SPEC_ID_EVENT_SPEC_VERSION_MINOR_TPM2,
};
use crate::util::{u16_le_from_bytes_at_offset, u32_le_from_bytes_at_offset, usize_from_u32};
use core::fmt::{self, Debug, Formatter};

/// Algorithm and digest size entry of the log header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlgorithmDigestSize {
    /// Algorithm of the digests.
    pub algorithm_id: AlgorithmId,
    /// Size of each digest of that algorithm.
    pub digest_size: u16,
}

#[derive(Clone, Copy, Debug, Default)]
struct AlgorithmDigestSizes {
    count: usize,
    entries: [AlgorithmDigestSize; MAX_DIGESTS],
}

impl AlgorithmDigestSizes {
    fn as_slice(&self) -> &[AlgorithmDigestSize] {
        &self.entries[..self.count]
    }

    fn get_size(&self, alg: AlgorithmId) -> Option<u16> {
        self.as_slice().iter().find_map(|elem| {
            if elem.algorithm_id == alg {
                Some(elem.digest_size)
            } else {
                None
            }
        })
    }
}

/// `Spec ID Event03` header stored at the beginning of the event log.
#[derive(Clone, Debug)]
pub struct SpecIdHeader<'a> {
    platform_class: u32,
    // major, minor, errata
    spec_version: (u8, u8, u8),
    uintn_size: u8,
    algorithm_digest_sizes: AlgorithmDigestSizes,
    vendor_info: &'a [u8],
    // Size of the whole header event, in bytes.
    size_in_bytes: usize,
}

impl<'a> SpecIdHeader<'a> {
    /// Decode the header at the start of `bytes`.
    ///
    /// Returns `None` unless the first record is an `EV_NO_ACTION` event for
    /// PCR 0 with a zero digest whose data is a well formed `Spec ID
    /// Event03` structure listing at most [`MAX_DIGESTS`] distinct hash
    /// algorithms with their canonical digest sizes. The declared event size
    /// must match the structure exactly.
    #[must_use]
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if u32_le_from_bytes_at_offset(bytes, 0)? != 0 {
            return None;
        }
        if EventType(u32_le_from_bytes_at_offset(bytes, 4)?) != EventType::NO_ACTION {
            return None;
        }
        let digest = bytes.get(8..8 + usize::from(SHA1_DIGEST_SIZE))?;
        if digest.iter().any(|b| *b != 0) {
            return None;
        }

        let event_size = usize_from_u32(u32_le_from_bytes_at_offset(bytes, 28)?);
        let event =
            bytes.get(PCR_EVENT_HEADER_SIZE..PCR_EVENT_HEADER_SIZE.checked_add(event_size)?)?;

        if *event.get(..16)? != SPEC_ID_EVENT_SIGNATURE_03 {
            return None;
        }
        let platform_class = u32_le_from_bytes_at_offset(event, 16)?;
        let version_minor = *event.get(20)?;
        let version_major = *event.get(21)?;
        let version_errata = *event.get(22)?;
        let uintn_size = *event.get(23)?;

        let number_of_algorithms = usize_from_u32(u32_le_from_bytes_at_offset(event, 24)?);
        if number_of_algorithms > MAX_DIGESTS {
            return None;
        }

        let mut algorithm_digest_sizes = AlgorithmDigestSizes::default();
        let mut banks = HashAlgorithm::empty();
        for (i, entry) in algorithm_digest_sizes
            .entries
            .iter_mut()
            .take(number_of_algorithms)
            .enumerate()
        {
            let offset = SPEC_ID_EVENT_FIXED_SIZE + i * SPEC_ID_EVENT_ALGORITHM_SIZE;
            let algorithm_id = AlgorithmId(u16_le_from_bytes_at_offset(event, offset)?);
            let digest_size = u16_le_from_bytes_at_offset(event, offset + 2)?;
            if algorithm_digest_size(algorithm_id)? != digest_size {
                return None;
            }

            let mask = HashAlgorithm::from_algorithm_id(algorithm_id);
            if banks.contains(mask) {
                return None;
            }
            banks |= mask;

            *entry = AlgorithmDigestSize {
                algorithm_id,
                digest_size,
            };
        }
        algorithm_digest_sizes.count = number_of_algorithms;

        let vendor_info_size_byte_offset = spec_id_event_size(number_of_algorithms) - 1;
        let vendor_info_size = usize::from(*event.get(vendor_info_size_byte_offset)?);
        let vendor_info_byte_offset = vendor_info_size_byte_offset + 1;
        let vendor_info =
            event.get(vendor_info_byte_offset..vendor_info_byte_offset + vendor_info_size)?;
        if event_size != vendor_info_byte_offset + vendor_info_size {
            return None;
        }

        Some(Self {
            platform_class,
            spec_version: (version_major, version_minor, version_errata),
            uintn_size,
            algorithm_digest_sizes,
            vendor_info,
            size_in_bytes: PCR_EVENT_HEADER_SIZE + event_size,
        })
    }

    /// Platform class, 0 for client platforms.
    #[must_use]
    pub const fn platform_class(&self) -> u32 {
        self.platform_class
    }

    /// Spec version as `(major, minor, errata)`.
    #[must_use]
    pub const fn spec_version(&self) -> (u8, u8, u8) {
        self.spec_version
    }

    /// Whether the header declares the TPM 2.0 version this crate writes.
    #[must_use]
    pub fn is_tpm2(&self) -> bool {
        self.spec_version
            == (
                SPEC_ID_EVENT_SPEC_VERSION_MAJOR_TPM2,
                SPEC_ID_EVENT_SPEC_VERSION_MINOR_TPM2,
                SPEC_ID_EVENT_SPEC_VERSION_ERRATA_TPM2,
            )
    }

    /// Size of `UINTN` of the writer, in units of `u32`.
    #[must_use]
    pub const fn uintn_size(&self) -> u8 {
        self.uintn_size
    }

    /// Algorithms of the log, in header order.
    #[must_use]
    pub fn algorithm_digest_sizes(&self) -> &[AlgorithmDigestSize] {
        self.algorithm_digest_sizes.as_slice()
    }

    /// Bank mask of the algorithms of the log.
    #[must_use]
    pub fn banks(&self) -> HashAlgorithm {
        self.algorithm_digest_sizes()
            .iter()
            .fold(HashAlgorithm::empty(), |acc, elem| {
                acc | HashAlgorithm::from_algorithm_id(elem.algorithm_id)
            })
    }

    /// Vendor specific data.
    #[must_use]
    pub const fn vendor_info(&self) -> &'a [u8] {
        self.vendor_info
    }

    /// Size of the header record, i.e. offset of the first event.
    #[must_use]
    pub const fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}

/// Digests in a PCR event.
#[derive(Clone)]
pub struct PcrEventDigests<'a> {
    data: &'a [u8],
    algorithm_digest_sizes: AlgorithmDigestSizes,
}

impl Debug for PcrEventDigests<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a> IntoIterator for PcrEventDigests<'a> {
    type Item = (AlgorithmId, &'a [u8]);
    type IntoIter = PcrEventDigestIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        PcrEventDigestIter {
            digests: self,
            offset: 0,
        }
    }
}

/// Iterator over a list of digests.
#[derive(Debug)]
pub struct PcrEventDigestIter<'a> {
    digests: PcrEventDigests<'a>,
    offset: usize,
}

impl<'a> Iterator for PcrEventDigestIter<'a> {
    type Item = (AlgorithmId, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.digests.data.get(self.offset..)?;
        let alg = AlgorithmId(u16_le_from_bytes_at_offset(data, 0)?);
        let digest_size = usize::from(self.digests.algorithm_digest_sizes.get_size(alg)?);
        let digest = data.get(PCR_EVENT2_ALGORITHM_ID_SIZE..PCR_EVENT2_ALGORITHM_ID_SIZE + digest_size)?;
        self.offset += PCR_EVENT2_ALGORITHM_ID_SIZE + digest_size;
        Some((alg, digest))
    }
}

/// One `TCG_PCR_EVENT2` record of the log.
#[derive(Debug)]
pub struct PcrEvent<'a> {
    pcr_index: PcrIndex,
    event_type: EventType,
    digests: &'a [u8],
    event_data: &'a [u8],
    size_in_bytes: usize,

    // This data from the log header is needed to parse the digest data.
    algorithm_digest_sizes: AlgorithmDigestSizes,
}

impl<'a> PcrEvent<'a> {
    /// Decode the record at the start of `bytes`.
    ///
    /// Returns `None` for an event type of zero (unused space), for a digest
    /// count other than the number of algorithms of the header, for an
    /// algorithm not listed in the header, and whenever a field lies past
    /// the end of `bytes`.
    fn parse(bytes: &'a [u8], header: &SpecIdHeader<'_>) -> Option<Self> {
        let pcr_index = PcrIndex(u32_le_from_bytes_at_offset(bytes, 0)?);
        let event_type = EventType(u32_le_from_bytes_at_offset(bytes, 4)?);
        if event_type.0 == 0 {
            return None;
        }

        let digests_count = usize_from_u32(u32_le_from_bytes_at_offset(bytes, 8)?);
        if digests_count > MAX_DIGESTS || digests_count != header.algorithm_digest_sizes.count {
            return None;
        }

        // Get the byte size of the digests so that the digests iterator
        // only ever sees validated data.
        let mut offset = PCR_EVENT2_HEADER_SIZE;
        for _ in 0..digests_count {
            let algorithm_id = AlgorithmId(u16_le_from_bytes_at_offset(bytes, offset)?);
            let digest_size = header.algorithm_digest_sizes.get_size(algorithm_id)?;
            offset = offset.checked_add(PCR_EVENT2_ALGORITHM_ID_SIZE + usize::from(digest_size))?;
        }
        let digests = bytes.get(PCR_EVENT2_HEADER_SIZE..offset)?;

        let event_size = usize_from_u32(u32_le_from_bytes_at_offset(bytes, offset)?);
        let event_data_offset = offset.checked_add(PCR_EVENT2_EVENT_SIZE_SIZE)?;
        let end = event_data_offset.checked_add(event_size)?;
        let event_data = bytes.get(event_data_offset..end)?;

        Some(Self {
            pcr_index,
            event_type,
            digests,
            event_data,
            size_in_bytes: end,
            algorithm_digest_sizes: header.algorithm_digest_sizes,
        })
    }

    /// PCR index for the event.
    #[must_use]
    pub const fn pcr_index(&self) -> PcrIndex {
        self.pcr_index
    }

    /// Type of event, indicating what type of data is stored in [`event_data`].
    ///
    /// [`event_data`]: Self::event_data
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Raw event data. The meaning of this data can be determined from
    /// the [`event_type`].
    ///
    /// Note that this data is independent of what is hashed in [`digests`].
    ///
    /// [`digests`]: Self::digests
    /// [`event_type`]: Self::event_type
    #[must_use]
    pub const fn event_data(&self) -> &'a [u8] {
        self.event_data
    }

    /// Digests of the data hashed for this event.
    #[must_use]
    pub const fn digests(&self) -> PcrEventDigests<'a> {
        PcrEventDigests {
            data: self.digests,
            algorithm_digest_sizes: self.algorithm_digest_sizes,
        }
    }

    /// Digests of the event as a list that can be extended into a PCR.
    #[must_use]
    pub fn digest_list(&self) -> Option<DigestList> {
        let mut list = DigestList::new();
        for (alg, digest) in self.digests() {
            list.push(DigestValue::new(alg, digest)?).ok()?;
        }
        Some(list)
    }

    /// Size of the encoded record.
    #[must_use]
    pub const fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}

/// Iterator for the events of a log.
///
/// Iteration ends at the first record that fails to decode.
#[derive(Debug)]
pub struct EventLogIter<'a> {
    bytes: &'a [u8],
    header: Option<SpecIdHeader<'a>>,
    offset: usize,
}

impl<'a> EventLogIter<'a> {
    /// Iterate over the events following the header at the start of
    /// `bytes`. Yields nothing if there is no valid header.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_header(bytes, SpecIdHeader::parse(bytes))
    }

    pub(crate) fn with_header(bytes: &'a [u8], header: Option<SpecIdHeader<'a>>) -> Self {
        let offset = header.as_ref().map_or(0, |header| header.size_in_bytes());
        Self {
            bytes,
            header,
            offset,
        }
    }

    /// Header of the log.
    #[must_use]
    pub const fn header(&self) -> Option<&SpecIdHeader<'a>> {
        self.header.as_ref()
    }

    /// Offset just past the last event returned.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for EventLogIter<'a> {
    type Item = PcrEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.header.as_ref()?;
        let event = self
            .bytes
            .get(self.offset..)
            .and_then(|rest| PcrEvent::parse(rest, header));

        match event {
            Some(event) => {
                self.offset += event.size_in_bytes;
                Some(event)
            }
            None => {
                // Keep `offset` but stop for good.
                self.header = None;
                None
            }
        }
    }
}
