// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encoding of log records and of the `Spec ID Event03` header.

use crate::hash::{DigestAlgorithm, DigestList};
use crate::tcg::{
    EventType, HashAlgorithm, PcrIndex, PCR_EVENT2_ALGORITHM_ID_SIZE, PCR_EVENT2_EVENT_SIZE_SIZE,
    PCR_EVENT2_HEADER_SIZE, PCR_EVENT_HEADER_SIZE, SHA1_DIGEST_SIZE,
    SPEC_ID_EVENT_ALGORITHM_SIZE, SPEC_ID_EVENT_FIXED_SIZE, SPEC_ID_EVENT_SIGNATURE_03,
    SPEC_ID_EVENT_SPEC_VERSION_ERRATA_TPM2, SPEC_ID_EVENT_SPEC_VERSION_MAJOR_TPM2,
    SPEC_ID_EVENT_SPEC_VERSION_MINOR_TPM2, SPEC_ID_EVENT_UINTN_SIZE,
};
use crate::util::ByteWriter;
use crate::{Result, Status};

/// Size of a record without its event data.
///
/// The record of an event of `n` bytes takes exactly
/// `event_get_size(digests) + n` bytes.
#[must_use]
pub fn event_get_size(digests: &DigestList) -> u32 {
    let digests_size: usize = digests
        .iter()
        .map(|digest| PCR_EVENT2_ALGORITHM_ID_SIZE + digest.as_bytes().len())
        .sum();
    // At most `MAX_DIGESTS` digests of `MAX_DIGEST_SIZE` bytes.
    (PCR_EVENT2_HEADER_SIZE + digests_size + PCR_EVENT2_EVENT_SIZE_SIZE) as u32
}

/// Size of a whole record, `None` on overflow.
pub(crate) fn record_size(digests: &DigestList, event: &[u8]) -> Option<usize> {
    usize::try_from(event_get_size(digests))
        .ok()?
        .checked_add(event.len())
}

/// Encode a record into the start of `out` and return its size.
///
/// Fails with [`Status::ENOBUFS`] without writing anything if `out` is too
/// short, and with [`Status::EINVAL`] if the event does not fit the 32-bit
/// size field.
pub fn log_append(
    pcr: PcrIndex,
    event_type: EventType,
    digests: &DigestList,
    event: &[u8],
    out: &mut [u8],
) -> Result<usize> {
    let event_size = u32::try_from(event.len()).map_err(|_| Status::EINVAL)?;
    let size = record_size(digests, event).ok_or(Status::ENOBUFS)?;
    let out = out.get_mut(..size).ok_or(Status::ENOBUFS)?;

    let mut writer = ByteWriter::new(out);
    writer.put_u32(pcr.0)?;
    writer.put_u32(event_type.0)?;
    // The list never holds more than `MAX_DIGESTS` entries.
    writer.put_u32(digests.len() as u32)?;
    for digest in digests {
        writer.put_u16(digest.algorithm().0)?;
        writer.put_bytes(digest.as_bytes())?;
    }
    writer.put_u32(event_size)?;
    writer.put_bytes(event)?;

    Ok(writer.offset())
}

/// Size of the `Spec ID Event03` event data for `algorithm_count`
/// algorithms, including the vendor info size byte.
#[must_use]
pub const fn spec_id_event_size(algorithm_count: usize) -> usize {
    SPEC_ID_EVENT_FIXED_SIZE + algorithm_count * SPEC_ID_EVENT_ALGORITHM_SIZE + 1
}

/// Size of the whole header record for `algorithm_count` algorithms.
#[must_use]
pub const fn spec_id_header_size(algorithm_count: usize) -> usize {
    PCR_EVENT_HEADER_SIZE + spec_id_event_size(algorithm_count)
}

/// Algorithms of `algorithms` recorded in a log for the `active` banks.
pub(crate) fn log_algorithms(
    algorithms: &[DigestAlgorithm],
    active: HashAlgorithm,
) -> impl Iterator<Item = &DigestAlgorithm> {
    algorithms
        .iter()
        .filter(move |alg| active.contains(alg.mask) && alg.is_implemented())
}

/// Write the log header for the `active` banks into the start of `out` and
/// return its size.
///
/// Fails with [`Status::ENOBUFS`] without writing anything if `out` is too
/// short.
pub fn write_spec_id_event(
    active: HashAlgorithm,
    algorithms: &[DigestAlgorithm],
    out: &mut [u8],
) -> Result<usize> {
    let count = log_algorithms(algorithms, active).count();
    let event_size = spec_id_event_size(count);
    let size = spec_id_header_size(count);
    let out = out.get_mut(..size).ok_or(Status::ENOBUFS)?;

    let mut writer = ByteWriter::new(out);

    // TCG_PCR_EVENT in the SHA-1 format.
    writer.put_u32(0)?;
    writer.put_u32(EventType::NO_ACTION.0)?;
    writer.put_bytes(&[0; SHA1_DIGEST_SIZE as usize])?;
    writer.put_u32(u32::try_from(event_size).map_err(|_| Status::EINVAL)?)?;

    // TCG_EfiSpecIDEventStruct
    writer.put_bytes(&SPEC_ID_EVENT_SIGNATURE_03)?;
    writer.put_u32(0)?;
    writer.put_u8(SPEC_ID_EVENT_SPEC_VERSION_MINOR_TPM2)?;
    writer.put_u8(SPEC_ID_EVENT_SPEC_VERSION_MAJOR_TPM2)?;
    writer.put_u8(SPEC_ID_EVENT_SPEC_VERSION_ERRATA_TPM2)?;
    writer.put_u8(SPEC_ID_EVENT_UINTN_SIZE)?;
    writer.put_u32(u32::try_from(count).map_err(|_| Status::EINVAL)?)?;
    for alg in log_algorithms(algorithms, active) {
        writer.put_u16(alg.id.0)?;
        writer.put_u16(alg.digest_size)?;
    }
    // Vendor info size.
    writer.put_u8(0)?;

    Ok(writer.offset())
}
