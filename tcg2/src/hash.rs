// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-algorithm digests over measured data.
//!
//! The hash algorithms known to the log live in the immutable
//! [`DIGEST_ALGORITHMS`] table. A measurement computes one digest per entry
//! whose bank is active in the TPM, always in table order so that the bytes
//! of the log do not depend on the order in which the TPM reports its banks.

use crate::tcg::{
    algorithm_digest_size, AlgorithmId, HashAlgorithm, MAX_DIGESTS, MAX_DIGEST_SIZE,
    SHA1_DIGEST_SIZE, SHA256_DIGEST_SIZE, SHA384_DIGEST_SIZE, SHA512_DIGEST_SIZE,
    SM3_256_DIGEST_SIZE,
};
use crate::tpm::{self, Tpm2};
use crate::{Result, Status};
use core::fmt::{self, Debug, Formatter};
use core::slice;
use log::{error, warn};

/// One-shot hash function. Writes the digest of the input into the output
/// slice, which is exactly the canonical digest size of the algorithm.
pub type HashFn = fn(&[u8], &mut [u8]);

#[allow(dead_code)]
fn hash_one_shot<D: digest::Digest>(data: &[u8], out: &mut [u8]) {
    for (dst, src) in out.iter_mut().zip(D::digest(data)) {
        *dst = src;
    }
}

#[cfg(feature = "sha1")]
const SHA1_HASH: Option<HashFn> = Some(hash_one_shot::<sha1::Sha1> as HashFn);
#[cfg(not(feature = "sha1"))]
const SHA1_HASH: Option<HashFn> = None;

#[cfg(feature = "sha256")]
const SHA256_HASH: Option<HashFn> = Some(hash_one_shot::<sha2::Sha256> as HashFn);
#[cfg(not(feature = "sha256"))]
const SHA256_HASH: Option<HashFn> = None;

#[cfg(feature = "sha384")]
const SHA384_HASH: Option<HashFn> = Some(hash_one_shot::<sha2::Sha384> as HashFn);
#[cfg(not(feature = "sha384"))]
const SHA384_HASH: Option<HashFn> = None;

#[cfg(feature = "sha512")]
const SHA512_HASH: Option<HashFn> = Some(hash_one_shot::<sha2::Sha512> as HashFn);
#[cfg(not(feature = "sha512"))]
const SHA512_HASH: Option<HashFn> = None;

/// A hash algorithm the log can record.
#[derive(Clone, Copy, Debug)]
pub struct DigestAlgorithm {
    /// Short name used in diagnostics.
    pub name: &'static str,
    /// TPM algorithm identifier.
    pub id: AlgorithmId,
    /// Bit of the algorithm in a PCR bank mask.
    pub mask: HashAlgorithm,
    /// Canonical digest size in bytes.
    pub digest_size: u16,
    /// Implementation, `None` if the algorithm is not compiled in.
    pub hash: Option<HashFn>,
}

impl DigestAlgorithm {
    /// Whether a hash implementation is available.
    #[must_use]
    pub const fn is_implemented(&self) -> bool {
        self.hash.is_some()
    }
}

/// Known hash algorithms in canonical log order.
///
/// SM3-256 is listed so that the bank is recognised, but it never has an
/// implementation.
pub const DIGEST_ALGORITHMS: [DigestAlgorithm; MAX_DIGESTS] = [
    DigestAlgorithm {
        name: "sha1",
        id: AlgorithmId::SHA1,
        mask: HashAlgorithm::SHA1,
        digest_size: SHA1_DIGEST_SIZE,
        hash: SHA1_HASH,
    },
    DigestAlgorithm {
        name: "sha256",
        id: AlgorithmId::SHA256,
        mask: HashAlgorithm::SHA256,
        digest_size: SHA256_DIGEST_SIZE,
        hash: SHA256_HASH,
    },
    DigestAlgorithm {
        name: "sha384",
        id: AlgorithmId::SHA384,
        mask: HashAlgorithm::SHA384,
        digest_size: SHA384_DIGEST_SIZE,
        hash: SHA384_HASH,
    },
    DigestAlgorithm {
        name: "sha512",
        id: AlgorithmId::SHA512,
        mask: HashAlgorithm::SHA512,
        digest_size: SHA512_DIGEST_SIZE,
        hash: SHA512_HASH,
    },
    DigestAlgorithm {
        name: "sm3_256",
        id: AlgorithmId::SM3_256,
        mask: HashAlgorithm::SM3_256,
        digest_size: SM3_256_DIGEST_SIZE,
        hash: None,
    },
];

/// Banks of `algorithms` that have an implementation.
#[must_use]
pub fn implemented_banks(algorithms: &[DigestAlgorithm]) -> HashAlgorithm {
    algorithms
        .iter()
        .filter(|alg| alg.is_implemented())
        .fold(HashAlgorithm::empty(), |acc, alg| acc | alg.mask)
}

/// Look up an algorithm of the table by identifier.
#[must_use]
pub fn find_algorithm(algorithms: &[DigestAlgorithm], id: AlgorithmId) -> Option<&DigestAlgorithm> {
    algorithms.iter().find(|alg| alg.id == id)
}

/// A single digest tagged with its algorithm.
///
/// The digest always has the canonical length of its algorithm.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DigestValue {
    alg: AlgorithmId,
    len: u8,
    digest: [u8; MAX_DIGEST_SIZE],
}

impl DigestValue {
    /// Create a digest value. Returns `None` if `alg` is not a hash
    /// algorithm or `digest` does not have its canonical length.
    #[must_use]
    pub fn new(alg: AlgorithmId, digest: &[u8]) -> Option<Self> {
        let mut val = Self::zeroed(alg)?;
        if digest.len() != val.as_bytes().len() {
            return None;
        }
        val.as_bytes_mut().copy_from_slice(digest);
        Some(val)
    }

    /// All-zero digest of the canonical length of `alg`.
    #[must_use]
    pub fn zeroed(alg: AlgorithmId) -> Option<Self> {
        let size = algorithm_digest_size(alg)?;
        Some(Self {
            alg,
            len: u8::try_from(size).ok()?,
            digest: [0; MAX_DIGEST_SIZE],
        })
    }

    /// Algorithm of the digest.
    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmId {
        self.alg
    }

    /// Digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.digest[..usize::from(self.len)]
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.digest[..usize::from(self.len)]
    }

    /// Whether every byte of the digest is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }
}

impl Default for DigestValue {
    fn default() -> Self {
        Self {
            alg: AlgorithmId::NULL,
            len: 0,
            digest: [0; MAX_DIGEST_SIZE],
        }
    }
}

impl Debug for DigestValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:", self.alg)?;
        for b in self.as_bytes() {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Ordered list of digests of one measurement, at most one per known
/// algorithm.
#[derive(Clone, Copy, Default)]
pub struct DigestList {
    count: usize,
    digests: [DigestValue; MAX_DIGESTS],
}

impl DigestList {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a digest. Fails with [`Status::ENOBUFS`] if the list is full.
    pub fn push(&mut self, value: DigestValue) -> Result {
        let slot = self.digests.get_mut(self.count).ok_or(Status::ENOBUFS)?;
        *slot = value;
        self.count += 1;
        Ok(())
    }

    /// Number of digests.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the list holds no digest.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Digests in list order.
    #[must_use]
    pub fn as_slice(&self) -> &[DigestValue] {
        &self.digests[..self.count]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [DigestValue] {
        &mut self.digests[..self.count]
    }

    /// Iterator over the digests in list order.
    pub fn iter(&self) -> slice::Iter<'_, DigestValue> {
        self.as_slice().iter()
    }

    /// Digest of a given algorithm.
    #[must_use]
    pub fn get(&self, alg: AlgorithmId) -> Option<&DigestValue> {
        self.iter().find(|val| val.algorithm() == alg)
    }

    /// Bank mask of the algorithms in the list.
    #[must_use]
    pub fn banks(&self) -> HashAlgorithm {
        self.iter().fold(HashAlgorithm::empty(), |acc, val| {
            acc | HashAlgorithm::from_algorithm_id(val.algorithm())
        })
    }
}

impl PartialEq for DigestList {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for DigestList {}

impl Debug for DigestList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a DigestList {
    type Item = &'a DigestValue;
    type IntoIter = slice::Iter<'a, DigestValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Digest `data` with every algorithm of `algorithms` whose bank is set in
/// `active`.
///
/// Active banks without an implementation are skipped with a warning.
#[must_use]
pub fn digest_with_banks(
    algorithms: &[DigestAlgorithm],
    active: HashAlgorithm,
    data: &[u8],
) -> DigestList {
    let mut list = DigestList::new();
    for alg in algorithms.iter().filter(|alg| active.contains(alg.mask)) {
        let Some(hash) = alg.hash else {
            warn!("{} hash not implemented, skipping bank", alg.name);
            continue;
        };
        let Some(mut value) = DigestValue::zeroed(alg.id) else {
            warn!("{:?} is not a hash algorithm, skipping bank", alg.id);
            continue;
        };
        hash(data, value.as_bytes_mut());
        if list.push(value).is_err() {
            warn!("too many algorithms, dropping {}", alg.name);
            break;
        }
    }
    list
}

/// Digest `data` with every active PCR bank of `tpm`.
pub fn create_digest<T: Tpm2>(
    tpm: &mut T,
    algorithms: &[DigestAlgorithm],
    data: &[u8],
) -> Result<DigestList> {
    let active = tpm::get_active_pcr_banks(tpm)?;
    Ok(digest_with_banks(algorithms, active, data))
}

/// Check that every active bank has a compiled implementation.
///
/// Fails with [`Status::ENOTSUPP`] otherwise. Measuring with such a
/// configuration would leave banks unextended.
pub fn check_active_banks(algorithms: &[DigestAlgorithm], active: HashAlgorithm) -> Result {
    let implemented = implemented_banks(algorithms);
    if implemented.contains(active) {
        return Ok(());
    }

    error!("PCR bank mismatch, TPM active banks {active:?}, compiled algorithms {implemented:?}");
    for alg in algorithms {
        if active.contains(alg.mask) && !alg.is_implemented() {
            error!("missing {} hash, enable it or deactivate the bank", alg.name);
        }
    }
    Err(Status::ENOTSUPP.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_digest_value_checked() {
        assert!(DigestValue::new(AlgorithmId::SHA1, &[0; 20]).is_some());
        assert!(DigestValue::new(AlgorithmId::SHA1, &[0; 32]).is_none());
        assert!(DigestValue::new(AlgorithmId::RSA, &[0; 20]).is_none());

        let val = DigestValue::zeroed(AlgorithmId::SHA384).unwrap();
        assert_eq!(val.as_bytes().len(), 48);
        assert!(val.is_zero());
    }

    #[test]
    fn test_digest_list_capacity() {
        let mut list = DigestList::new();
        let val = DigestValue::zeroed(AlgorithmId::SHA1).unwrap();
        for _ in 0..MAX_DIGESTS {
            list.push(val).unwrap();
        }
        assert_eq!(list.push(val).unwrap_err().status(), Status::ENOBUFS);
        assert_eq!(list.len(), MAX_DIGESTS);
    }

    #[test]
    fn test_sha256_abc() {
        let list = digest_with_banks(&DIGEST_ALGORITHMS, HashAlgorithm::SHA256, b"abc");
        assert_eq!(list.len(), 1);
        let val = list.get(AlgorithmId::SHA256).unwrap();
        assert_eq!(
            val.as_bytes(),
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn test_canonical_order() {
        let active = HashAlgorithm::SHA256 | HashAlgorithm::SHA1;
        let list = digest_with_banks(&DIGEST_ALGORITHMS, active, b"abc");
        let algs: [AlgorithmId; 2] = [list.as_slice()[0].algorithm(), list.as_slice()[1].algorithm()];
        assert_eq!(algs, [AlgorithmId::SHA1, AlgorithmId::SHA256]);
        assert_eq!(
            list.as_slice()[0].as_bytes(),
            hex!("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
        assert_eq!(list.banks(), active);
    }

    #[test]
    fn test_unimplemented_bank_skipped() {
        let active = HashAlgorithm::SM3_256 | HashAlgorithm::SHA512;
        let list = digest_with_banks(&DIGEST_ALGORITHMS, active, b"");
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].algorithm(), AlgorithmId::SHA512);
        assert_eq!(list.as_slice()[0].as_bytes().len(), 64);
    }

    #[test]
    fn test_check_active_banks() {
        assert!(check_active_banks(&DIGEST_ALGORITHMS, HashAlgorithm::SHA1 | HashAlgorithm::SHA384).is_ok());
        assert_eq!(
            check_active_banks(&DIGEST_ALGORITHMS, HashAlgorithm::SM3_256)
                .unwrap_err()
                .status(),
            Status::ENOTSUPP
        );
        assert!(check_active_banks(&DIGEST_ALGORITHMS[..1], HashAlgorithm::SHA256).is_err());
    }
}
