// SPDX-License-Identifier: MIT OR Apache-2.0

//! [TCG] (Trusted Computing Group) crypto-agile event log definitions.
//!
//! The layout of the log is defined in the [TCG PC Client Platform Firmware
//! Profile Specification][spec]. A log starts with a `TCG_PCR_EVENT` in the
//! old SHA-1 format whose event data is the `Spec ID Event03` structure
//! listing the hash algorithms of the log. Every following record is a
//! `TCG_PCR_EVENT2` carrying one digest per listed algorithm.
//!
//! All integers in the log are little-endian, independent of the host.
//!
//! [spec]: https://trustedcomputinggroup.org/resource/pc-client-specific-platform-firmware-profile-specification/
//! [TCG]: https://trustedcomputinggroup.org/

mod enums;
pub use enums::*;

use bitflags::bitflags;
use core::mem;

/// Platform Configuration Register (PCR) index.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct PcrIndex(pub u32);

bitflags! {
    /// PCR banks (hash algorithms) as a bitmask.
    ///
    /// Used for both the banks a TPM supports and the banks that are
    /// currently active, i.e. extended on every measurement.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct HashAlgorithm: u32 {
        /// SHA-1 hash.
        const SHA1 = 0x0000_0001;

        /// SHA-256 hash.
        const SHA256 = 0x0000_0002;

        /// SHA-384 hash.
        const SHA384 = 0x0000_0004;

        /// SHA-512 hash.
        const SHA512 = 0x0000_0008;

        /// SM3-256 hash.
        const SM3_256 = 0x0000_0010;
    }
}

impl HashAlgorithm {
    /// Mask bit for a TPM algorithm identifier, or an empty mask if the
    /// identifier is not a hash algorithm that can back a PCR bank.
    #[must_use]
    pub const fn from_algorithm_id(alg: AlgorithmId) -> Self {
        match alg {
            AlgorithmId::SHA1 => Self::SHA1,
            AlgorithmId::SHA256 => Self::SHA256,
            AlgorithmId::SHA384 => Self::SHA384,
            AlgorithmId::SHA512 => Self::SHA512,
            AlgorithmId::SM3_256 => Self::SM3_256,
            _ => Self::empty(),
        }
    }
}

/// Size in bytes of a SHA-1 digest.
pub const SHA1_DIGEST_SIZE: u16 = 20;
/// Size in bytes of a SHA-256 digest.
pub const SHA256_DIGEST_SIZE: u16 = 32;
/// Size in bytes of a SHA-384 digest.
pub const SHA384_DIGEST_SIZE: u16 = 48;
/// Size in bytes of a SHA-512 digest.
pub const SHA512_DIGEST_SIZE: u16 = 64;
/// Size in bytes of a SM3-256 digest.
pub const SM3_256_DIGEST_SIZE: u16 = 32;

/// Largest digest of any supported algorithm.
pub const MAX_DIGEST_SIZE: usize = SHA512_DIGEST_SIZE as usize;

/// Canonical digest size of a hash algorithm, `None` for anything else.
#[must_use]
pub const fn algorithm_digest_size(alg: AlgorithmId) -> Option<u16> {
    match alg {
        AlgorithmId::SHA1 => Some(SHA1_DIGEST_SIZE),
        AlgorithmId::SHA256 => Some(SHA256_DIGEST_SIZE),
        AlgorithmId::SHA384 => Some(SHA384_DIGEST_SIZE),
        AlgorithmId::SHA512 => Some(SHA512_DIGEST_SIZE),
        AlgorithmId::SM3_256 => Some(SM3_256_DIGEST_SIZE),
        _ => None,
    }
}

/// Maximum number of PCR banks a TPM reports in a PCR selection list
/// (`TPM2_NUM_PCR_BANKS`).
pub const NUM_PCR_BANKS: usize = 16;

/// Size of the PCR select bitmap of one bank.
pub const PCR_SELECT_MAX: usize = 4;

/// Upper bound of digests in one record: one per known hash algorithm.
pub const MAX_DIGESTS: usize = 5;

/// Signature of the `Spec ID Event03` header, including the terminating
/// null byte.
pub const SPEC_ID_EVENT_SIGNATURE_03: [u8; 16] = *b"Spec ID Event03\0";

/// Major spec version written to and expected in the header (TPM 2.0).
pub const SPEC_ID_EVENT_SPEC_VERSION_MAJOR_TPM2: u8 = 2;
/// Minor spec version written to and expected in the header (TPM 2.0).
pub const SPEC_ID_EVENT_SPEC_VERSION_MINOR_TPM2: u8 = 0;
/// Spec errata written to and expected in the header (TPM 2.0).
pub const SPEC_ID_EVENT_SPEC_VERSION_ERRATA_TPM2: u8 = 2;

/// `uintn_size` of the header: size of `UINTN` in units of `u32`.
pub const SPEC_ID_EVENT_UINTN_SIZE: u8 = (mem::size_of::<usize>() / mem::size_of::<u32>()) as u8;

/// Size of the SHA-1 format `TCG_PCR_EVENT` before its event data:
/// PCR index, event type, SHA-1 digest and event size.
pub const PCR_EVENT_HEADER_SIZE: usize = 4 + 4 + SHA1_DIGEST_SIZE as usize + 4;

/// Size of the fixed part of the `Spec ID Event03` data before the
/// algorithm table: signature, platform class, version, errata, uintn size
/// and number of algorithms.
pub const SPEC_ID_EVENT_FIXED_SIZE: usize = 16 + 4 + 1 + 1 + 1 + 1 + 4;

/// Size of one `{algorithm_id, digest_size}` entry of the header.
pub const SPEC_ID_EVENT_ALGORITHM_SIZE: usize = 2 + 2;

/// Size of the `TCG_PCR_EVENT2` fields before the first digest: PCR index,
/// event type and digest count.
pub const PCR_EVENT2_HEADER_SIZE: usize = 4 + 4 + 4;

/// Size of the algorithm id preceding each digest in a record.
pub const PCR_EVENT2_ALGORITHM_ID_SIZE: usize = 2;

/// Size of the event size field following the digests of a record.
pub const PCR_EVENT2_EVENT_SIZE_SIZE: usize = 4;

/// Separator event data recorded when measurement finished normally.
pub const SEPARATOR_SUCCESS: u32 = 0xffff_ffff;
/// Separator event data recorded when measurement was aborted by an error.
pub const SEPARATOR_ERROR: u32 = 0x0000_0001;

/// PCRs capped with a separator at the end of a measurement session.
pub const SEPARATOR_PCRS: core::ops::RangeInclusive<u32> = 0..=7;

/// Version of the final events table header.
pub const FINAL_EVENTS_TABLE_VERSION: u64 = 1;

/// Size of the final events table header: version and number of events.
pub const FINAL_EVENTS_TABLE_HEADER_SIZE: usize = 8 + 8;
