// SPDX-License-Identifier: MIT OR Apache-2.0

//! The crypto-agile event log.
//!
//! An [`EventLog`] owns the log buffer and a write cursor. It is created
//! either by replaying a log left by an earlier boot stage
//! ([`EventLog::parse`]) or by writing a fresh `Spec ID Event03` header
//! ([`EventLog::init`]). Records are only ever appended after that.
//!
//! Once the log has been handed to a consumer ([`EventLog::handoff`]), every
//! new record is also copied into the final events log if one is attached.
//! After [`EventLog::seal`] the main log no longer changes and only the
//! final events log grows.

pub mod codec;
pub mod parse;

pub use codec::{event_get_size, log_append, spec_id_event_size, spec_id_header_size, write_spec_id_event};
pub use parse::{AlgorithmDigestSize, EventLogIter, PcrEvent, PcrEventDigests, SpecIdHeader};

use crate::hash::{DigestAlgorithm, DigestList, DigestValue};
use crate::tcg::{
    EventType, HashAlgorithm, PcrIndex, FINAL_EVENTS_TABLE_HEADER_SIZE,
    FINAL_EVENTS_TABLE_VERSION,
};
use crate::tpm::{self, Tpm2};
use crate::{Result, Status};
use core::fmt::{self, Debug, Formatter};
use log::{debug, error, info, warn};

/// Location of the last entry and truncation state of a handed off log.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EventLogInfo {
    /// Offset of the last entry. This is the header if the log has no
    /// events.
    pub last_entry: usize,
    /// Whether an event could not be recorded for lack of space.
    pub truncated: bool,
}

/// Event log in a caller provided buffer.
///
/// `B` is the mapping of the log memory. Dropping the log drops, and
/// thereby releases, the mapping.
pub struct EventLog<B> {
    buffer: B,
    position: usize,
    last_event_size: usize,
    found: bool,
    truncated: bool,
    handed_off: bool,
    sealed: bool,
    final_events: Option<FinalEventLog<B>>,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> EventLog<B> {
    /// Wrap `buffer` without reading or writing it.
    ///
    /// The log is empty until [`init`] or [`parse`] is called.
    ///
    /// [`init`]: Self::init
    /// [`parse`]: Self::parse
    pub const fn new(buffer: B) -> Self {
        Self {
            buffer,
            position: 0,
            last_event_size: 0,
            found: false,
            truncated: false,
            handed_off: false,
            sealed: false,
            final_events: None,
        }
    }

    /// Size of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    /// Write cursor, i.e. the size of the log.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Whether the log was replayed from an earlier boot stage.
    #[must_use]
    pub const fn found(&self) -> bool {
        self.found
    }

    /// Whether an event was dropped for lack of space. No more events are
    /// recorded in the main log once this is set.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Whether [`handoff`] was called.
    ///
    /// [`handoff`]: Self::handoff
    #[must_use]
    pub const fn handed_off(&self) -> bool {
        self.handed_off
    }

    /// Whether [`seal`] was called.
    ///
    /// [`seal`]: Self::seal
    #[must_use]
    pub const fn sealed(&self) -> bool {
        self.sealed
    }

    /// Offset of the last record. The header counts as a record.
    #[must_use]
    pub const fn last_entry_offset(&self) -> usize {
        self.position.saturating_sub(self.last_event_size)
    }

    /// Bytes of the log.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref().get(..self.position).unwrap_or_default()
    }

    /// Events of the log, after the header.
    #[must_use]
    pub fn records(&self) -> EventLogIter<'_> {
        EventLogIter::new(self.as_bytes())
    }

    /// Final events log, if attached.
    #[must_use]
    pub const fn final_events(&self) -> Option<&FinalEventLog<B>> {
        self.final_events.as_ref()
    }

    /// Release the log and return the buffer and the final events buffer.
    pub fn into_inner(self) -> (B, Option<B>) {
        (self.buffer, self.final_events.map(FinalEventLog::into_inner))
    }

    /// Write a fresh header for the `active` banks.
    ///
    /// On success the log holds only the header and the rest of the buffer
    /// is zeroed. Fails with [`Status::ENOBUFS`] and leaves the buffer
    /// untouched if the header does not fit.
    pub fn init(&mut self, active: HashAlgorithm, algorithms: &[DigestAlgorithm]) -> Result {
        let size = write_spec_id_event(active, algorithms, self.buffer.as_mut()).inspect_err(|_| {
            let count = codec::log_algorithms(algorithms, active).count();
            error!(
                "event log buffer of {:#x} bytes too small for a header of {:#x} bytes",
                self.capacity(),
                spec_id_header_size(count)
            );
        })?;

        if let Some(rest) = self.buffer.as_mut().get_mut(size..) {
            rest.fill(0);
        }
        self.position = size;
        self.last_event_size = size;
        self.found = false;
        self.truncated = false;
        debug!("new event log, header of {size:#x} bytes");
        Ok(())
    }

    /// Replay the log left in the buffer by an earlier boot stage.
    ///
    /// A log is only replayed if its header is a TPM 2.0 `Spec ID Event03`
    /// header without vendor info whose algorithms are exactly the `active`
    /// banks. Anything else is treated as an absent log: [`found`] stays
    /// `false` and `Ok` is returned.
    ///
    /// For a replayable log the PCR 0 values are read. If any is non-zero
    /// the digests of every record are extended again into their PCRs. The
    /// records are walked until the first one that does not decode, and the
    /// write cursor is placed right after the last valid one.
    ///
    /// Only TPM errors are returned.
    ///
    /// [`found`]: Self::found
    pub fn parse<T: Tpm2 + ?Sized>(&mut self, tpm: &mut T, active: HashAlgorithm) -> Result {
        self.found = false;

        let bytes = self.buffer.as_ref();
        let Some(header) = SpecIdHeader::parse(bytes) else {
            info!("no event log found");
            return Ok(());
        };
        if !header.is_tpm2() || !header.vendor_info().is_empty() {
            info!(
                "ignoring event log with spec version {:?}",
                header.spec_version()
            );
            return Ok(());
        }
        if header.banks() != active {
            warn!(
                "event log algorithms {:?} differ from active PCR banks {:?}, ignoring log",
                header.banks(),
                active
            );
            return Ok(());
        }

        let mut pcr0 = DigestList::new();
        for elem in header.algorithm_digest_sizes() {
            pcr0.push(DigestValue::zeroed(elem.algorithm_id).ok_or(Status::EINVAL)?)?;
        }
        tpm::pcr_read(tpm, PcrIndex(0), &mut pcr0)?;
        let extend = pcr0.iter().any(|digest| !digest.is_zero());

        let mut last_event_size = header.size_in_bytes();
        let mut count = 0;
        let mut iter = EventLogIter::with_header(bytes, Some(header));
        for event in iter.by_ref() {
            if extend {
                let digests = event.digest_list().ok_or(Status::EINVAL)?;
                tpm::pcr_extend(tpm, event.pcr_index(), &digests)?;
            }
            last_event_size = event.size_in_bytes();
            count += 1;
        }

        self.position = iter.offset();
        self.last_event_size = last_event_size;
        self.found = true;
        info!(
            "replayed event log with {count} events, {:#x} bytes{}",
            self.position,
            if extend { ", PCRs extended" } else { "" }
        );
        Ok(())
    }

    /// Append a record.
    ///
    /// Fails with [`Status::ENOBUFS`] without writing anything if the record
    /// does not fit. The log is then marked truncated and every later append
    /// to the main log fails the same way.
    pub fn append(
        &mut self,
        pcr: PcrIndex,
        event_type: EventType,
        digests: &DigestList,
        event: &[u8],
    ) -> Result {
        let size = codec::record_size(digests, event).ok_or(Status::ENOBUFS)?;

        if !self.sealed {
            if self.truncated {
                return Err(Status::ENOBUFS.into());
            }
            let capacity = self.capacity();
            let Some(end) = self.position.checked_add(size).filter(|end| *end <= capacity) else {
                self.truncated = true;
                error!(
                    "event log full, {size:#x} byte event for PCR {} does not fit",
                    pcr.0
                );
                return Err(Status::ENOBUFS.into());
            };
            let out = self
                .buffer
                .as_mut()
                .get_mut(self.position..end)
                .ok_or(Status::ENOBUFS)?;
            log_append(pcr, event_type, digests, event, out)?;
            self.position = end;
            self.last_event_size = size;
        }

        if self.handed_off {
            if let Some(final_events) = self.final_events.as_mut() {
                final_events.append(pcr, event_type, digests, event)?;
            }
        }
        Ok(())
    }

    /// Attach a final events log in `buffer`. See [`FinalEventLog::new`].
    pub fn attach_final_events(&mut self, buffer: B) -> Result {
        self.final_events = Some(FinalEventLog::new(buffer)?);
        Ok(())
    }

    /// Hand the log to a consumer.
    ///
    /// Events recorded afterwards are mirrored into the final events log.
    pub fn handoff(&mut self) -> EventLogInfo {
        self.handed_off = true;
        EventLogInfo {
            last_entry: self.last_entry_offset(),
            truncated: self.truncated,
        }
    }

    /// Freeze the main log. Later events only go to the final events log.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Use the log in `discovered` or create a new one.
    ///
    /// Unless `ignore_existing_log` is set, the log in `discovered` is
    /// replayed with [`parse`]. If a `user` buffer is given, a replayed log
    /// is copied into it (failing with [`Status::ENOBUFS`] if it is smaller
    /// than the log), the discovered buffer is released and the log
    /// continues in `user`. Without a replayable log a fresh header is
    /// written with [`init`].
    ///
    /// A failure to discover the log buffer is only fatal without a `user`
    /// buffer.
    ///
    /// [`init`]: Self::init
    /// [`parse`]: Self::parse
    pub fn prepare<T: Tpm2 + ?Sized>(
        tpm: &mut T,
        active: HashAlgorithm,
        algorithms: &[DigestAlgorithm],
        discovered: Result<B>,
        user: Option<B>,
        ignore_existing_log: bool,
    ) -> Result<Self> {
        let mut log = match (discovered, user) {
            (Ok(buffer), user) => {
                let mut discovered = Self::new(buffer);
                if !ignore_existing_log {
                    discovered.parse(tpm, active)?;
                }
                match user {
                    Some(user) => {
                        let mut log = Self::new(user);
                        if discovered.found {
                            log.copy_from(&discovered)?;
                        }
                        log
                    }
                    None => discovered,
                }
            }
            (Err(err), Some(user)) => {
                debug!("no platform event log ({}), using caller buffer", err.status());
                Self::new(user)
            }
            (Err(err), None) => {
                error!("no event log buffer: {}", err.status());
                return Err(err);
            }
        };

        if !log.found {
            log.init(active, algorithms)?;
        }
        Ok(log)
    }

    fn copy_from(&mut self, other: &Self) -> Result {
        let src = other.as_bytes();
        let dst = self
            .buffer
            .as_mut()
            .get_mut(..src.len())
            .ok_or_else(|| {
                error!(
                    "caller event log buffer too small for the {:#x} byte log",
                    src.len()
                );
                Status::ENOBUFS
            })?;
        dst.copy_from_slice(src);
        self.position = other.position;
        self.last_event_size = other.last_event_size;
        self.found = true;
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl EventLog<alloc::boxed::Box<[u8]>> {
    /// Log in a newly allocated, zeroed buffer of `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(alloc::vec![0; capacity].into_boxed_slice())
    }
}

impl<B: AsRef<[u8]>> Debug for EventLog<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("capacity", &self.buffer.as_ref().len())
            .field("position", &self.position)
            .field("last_event_size", &self.last_event_size)
            .field("found", &self.found)
            .field("truncated", &self.truncated)
            .field("handed_off", &self.handed_off)
            .field("sealed", &self.sealed)
            .finish_non_exhaustive()
    }
}

/// Events measured after the event log was handed off.
///
/// Layout: `version` (`u64`, 1), `number_of_events` (`u64`), followed by
/// records in the format of the main log.
pub struct FinalEventLog<B> {
    buffer: B,
    position: usize,
    number_of_events: u64,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> FinalEventLog<B> {
    /// Write an empty table header into `buffer`.
    ///
    /// Fails with [`Status::ENOBUFS`] if the header does not fit.
    pub fn new(mut buffer: B) -> Result<Self> {
        let header = buffer
            .as_mut()
            .get_mut(..FINAL_EVENTS_TABLE_HEADER_SIZE)
            .ok_or(Status::ENOBUFS)?;
        header[..8].copy_from_slice(&FINAL_EVENTS_TABLE_VERSION.to_le_bytes());
        header[8..].copy_from_slice(&0u64.to_le_bytes());
        Ok(Self {
            buffer,
            position: FINAL_EVENTS_TABLE_HEADER_SIZE,
            number_of_events: 0,
        })
    }

    /// Number of records in the table.
    #[must_use]
    pub const fn number_of_events(&self) -> u64 {
        self.number_of_events
    }

    /// Bytes of the table, header included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref().get(..self.position).unwrap_or_default()
    }

    /// Records of the table, without the header.
    #[must_use]
    pub fn records_bytes(&self) -> &[u8] {
        self.as_bytes()
            .get(FINAL_EVENTS_TABLE_HEADER_SIZE..)
            .unwrap_or_default()
    }

    fn into_inner(self) -> B {
        self.buffer
    }

    fn append(
        &mut self,
        pcr: PcrIndex,
        event_type: EventType,
        digests: &DigestList,
        event: &[u8],
    ) -> Result {
        let out = self
            .buffer
            .as_mut()
            .get_mut(self.position..)
            .ok_or(Status::ENOBUFS)?;
        let size = log_append(pcr, event_type, digests, event, out).inspect_err(|_| {
            warn!("final events log full");
        })?;
        self.position += size;
        self.number_of_events += 1;

        let count = self
            .buffer
            .as_mut()
            .get_mut(8..FINAL_EVENTS_TABLE_HEADER_SIZE)
            .ok_or(Status::ENOBUFS)?;
        count.copy_from_slice(&self.number_of_events.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{digest_with_banks, DIGEST_ALGORITHMS};
    use crate::tcg::AlgorithmId;
    use crate::testing::FakeTpm;
    use crate::tpm::PcrSelection;
    use alloc::vec;
    use alloc::vec::Vec;

    const SHA1_SHA256: HashAlgorithm = HashAlgorithm::SHA1.union(HashAlgorithm::SHA256);

    fn tpm() -> FakeTpm {
        FakeTpm::with_banks(&[
            PcrSelection::all(AlgorithmId::SHA1),
            PcrSelection::all(AlgorithmId::SHA256),
        ])
    }

    fn append_event(log: &mut EventLog<Vec<u8>>, pcr: u32, event: &[u8]) -> Result {
        let digests = digest_with_banks(&DIGEST_ALGORITHMS, SHA1_SHA256, event);
        log.append(PcrIndex(pcr), EventType::IPL, &digests, event)
    }

    #[test]
    fn test_init_idempotent() {
        let mut first = EventLog::new(vec![0u8; 256]);
        first.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();
        let mut second = EventLog::new(vec![0u8; 256]);
        second.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();
        second.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();

        assert_eq!(first.position(), spec_id_header_size(2));
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert!(!first.found());
        assert_eq!(first.last_entry_offset(), 0);
    }

    #[test]
    fn test_init_too_small() {
        let mut log = EventLog::new(vec![0u8; spec_id_header_size(2) - 1]);
        let err = log.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap_err();
        assert_eq!(err.status(), Status::ENOBUFS);
        assert_eq!(log.position(), 0);
        let (buffer, _) = log.into_inner();
        assert!(buffer.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_append_grows_by_record_size() {
        let mut log = EventLog::new(vec![0u8; 256]);
        log.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();
        let before = log.position();

        append_event(&mut log, 4, b"abc").unwrap();
        let digests = digest_with_banks(&DIGEST_ALGORITHMS, SHA1_SHA256, b"abc");
        assert_eq!(
            log.position() - before,
            usize_from_size(event_get_size(&digests)) + 3
        );
        assert_eq!(log.last_entry_offset(), before);

        let events: Vec<_> = log.records().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pcr_index(), PcrIndex(4));
        assert_eq!(events[0].event_data(), b"abc");
    }

    fn usize_from_size(size: u32) -> usize {
        crate::util::usize_from_u32(size)
    }

    #[test]
    fn test_truncation_sticks() {
        // Header (69) + one record of 12 + 22 + 34 + 4 + 10 = 82 bytes.
        let mut log = EventLog::new(vec![0u8; 69 + 82 + 40]);
        log.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();

        append_event(&mut log, 0, &[0x11; 10]).unwrap();
        let position = log.position();

        assert_eq!(
            append_event(&mut log, 0, &[0x22; 10]).unwrap_err().status(),
            Status::ENOBUFS
        );
        assert!(log.truncated());
        assert_eq!(log.position(), position);

        // Even an event that would fit is refused now.
        let digests = DigestList::new();
        assert_eq!(
            log.append(PcrIndex(0), EventType::IPL, &digests, &[])
                .unwrap_err()
                .status(),
            Status::ENOBUFS
        );
        assert_eq!(log.position(), position);
        assert!(log.handoff().truncated);
    }

    #[test]
    fn test_final_events_mirror() {
        let mut log = EventLog::new(vec![0u8; 512]);
        log.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();
        log.attach_final_events(vec![0xffu8; 256]).unwrap();

        append_event(&mut log, 1, b"before").unwrap();
        assert_eq!(log.final_events().unwrap().number_of_events(), 0);

        let info = log.handoff();
        assert_eq!(info.last_entry, spec_id_header_size(2));
        assert!(!info.truncated);

        append_event(&mut log, 2, b"after").unwrap();
        let main_position = log.position();

        log.seal();
        append_event(&mut log, 3, b"sealed").unwrap();
        assert_eq!(log.position(), main_position);
        assert_eq!(log.records().count(), 2);

        let final_events = log.final_events().unwrap();
        assert_eq!(final_events.number_of_events(), 2);
        let bytes = final_events.as_bytes();
        assert_eq!(bytes[..8], 1u64.to_le_bytes());
        assert_eq!(bytes[8..16], 2u64.to_le_bytes());

        // Records use the main log format.
        let records = final_events.records_bytes();
        assert_eq!(records[..4], 2u32.to_le_bytes());
        let digests = digest_with_banks(&DIGEST_ALGORITHMS, SHA1_SHA256, b"after");
        let second = usize_from_size(event_get_size(&digests)) + 5;
        assert_eq!(records[second..second + 4], 3u32.to_le_bytes());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_with_capacity() {
        let mut log = EventLog::with_capacity(128);
        assert_eq!(log.capacity(), 128);
        log.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();
        assert_eq!(log.position(), spec_id_header_size(2));
    }

    #[test]
    fn test_final_events_too_small() {
        let mut log = EventLog::new(vec![0u8; 128]);
        assert_eq!(
            log.attach_final_events(vec![0u8; 15])
                .unwrap_err()
                .status(),
            Status::ENOBUFS
        );
    }

    fn prior_log(events: &[(u32, &[u8])]) -> (Vec<u8>, usize) {
        let mut log = EventLog::new(vec![0u8; 1024]);
        log.init(SHA1_SHA256, &DIGEST_ALGORITHMS).unwrap();
        for (pcr, event) in events {
            append_event(&mut log, *pcr, event).unwrap();
        }
        let position = log.position();
        (log.into_inner().0, position)
    }

    #[test]
    fn test_parse_pcr0_zero_walks_only() {
        let (buffer, end) = prior_log(&[(0, b"one"), (5, b"two")]);
        let mut tpm = tpm();

        let mut log = EventLog::new(buffer);
        log.parse(&mut tpm, SHA1_SHA256).unwrap();
        assert!(log.found());
        assert_eq!(log.position(), end);
        assert!(tpm.extends.is_empty());

        // Appends continue right after the replayed records.
        append_event(&mut log, 7, b"three").unwrap();
        assert_eq!(log.records().count(), 3);
    }

    #[test]
    fn test_parse_pcr0_set_extends() {
        let (buffer, end) = prior_log(&[(0, b"one"), (5, b"two")]);
        let mut tpm = tpm();
        tpm.set_pcr(PcrIndex(0), AlgorithmId::SHA256, &[0x5a; 32]);

        let mut log = EventLog::new(buffer);
        log.parse(&mut tpm, SHA1_SHA256).unwrap();
        assert!(log.found());
        assert_eq!(log.position(), end);

        let extended: Vec<_> = tpm.extends.iter().map(|e| (e.pcr.0, e.alg)).collect();
        assert_eq!(
            extended,
            [
                (0, AlgorithmId::SHA1),
                (0, AlgorithmId::SHA256),
                (5, AlgorithmId::SHA1),
                (5, AlgorithmId::SHA256),
            ]
        );
        let one = digest_with_banks(&DIGEST_ALGORITHMS, SHA1_SHA256, b"one");
        assert_eq!(tpm.extends[1].digest, one.as_slice()[1].as_bytes());
    }

    #[test]
    fn test_parse_bank_mismatch() {
        let (buffer, _) = prior_log(&[(0, b"one")]);
        let mut tpm = FakeTpm::with_banks(&[PcrSelection::all(AlgorithmId::SHA256)]);

        let mut log = EventLog::new(buffer);
        log.parse(&mut tpm, HashAlgorithm::SHA256).unwrap();
        assert!(!log.found());
        assert_eq!(log.position(), 0);
    }

    #[test]
    fn test_parse_garbage() {
        let mut tpm = tpm();
        let mut log = EventLog::new(vec![0xa5u8; 300]);
        log.parse(&mut tpm, SHA1_SHA256).unwrap();
        assert!(!log.found());
    }

    #[test]
    fn test_prepare_copies_into_user_buffer() {
        let (buffer, end) = prior_log(&[(0, b"one")]);
        let mut tpm = tpm();

        let log = EventLog::prepare(
            &mut tpm,
            SHA1_SHA256,
            &DIGEST_ALGORITHMS,
            Ok(buffer.clone()),
            Some(vec![0u8; 2048]),
            false,
        )
        .unwrap();
        assert!(log.found());
        assert_eq!(log.capacity(), 2048);
        assert_eq!(log.as_bytes(), &buffer[..end]);
    }

    #[test]
    fn test_prepare_user_buffer_too_small() {
        let (buffer, end) = prior_log(&[(0, b"one")]);
        let mut tpm = tpm();

        let err = EventLog::prepare(
            &mut tpm,
            SHA1_SHA256,
            &DIGEST_ALGORITHMS,
            Ok(buffer),
            Some(vec![0u8; end - 1]),
            false,
        )
        .unwrap_err();
        assert_eq!(err.status(), Status::ENOBUFS);
    }

    #[test]
    fn test_prepare_ignore_existing_log() {
        let (buffer, _) = prior_log(&[(0, b"one")]);
        let mut tpm = tpm();

        let log = EventLog::prepare(
            &mut tpm,
            SHA1_SHA256,
            &DIGEST_ALGORITHMS,
            Ok(buffer),
            None,
            true,
        )
        .unwrap();
        assert!(!log.found());
        assert_eq!(log.position(), spec_id_header_size(2));
        assert_eq!(log.records().count(), 0);
    }

    #[test]
    fn test_prepare_no_buffer() {
        let mut tpm = tpm();
        let err = EventLog::<Vec<u8>>::prepare(
            &mut tpm,
            SHA1_SHA256,
            &DIGEST_ALGORITHMS,
            Err(Status::ENOENT.into()),
            None,
            false,
        )
        .unwrap_err();
        assert_eq!(err.status(), Status::ENOENT);

        let log = EventLog::prepare(
            &mut tpm,
            SHA1_SHA256,
            &DIGEST_ALGORITHMS,
            Err(Status::ENOENT.into()),
            Some(vec![0u8; 128]),
            false,
        )
        .unwrap();
        assert_eq!(log.position(), spec_id_header_size(2));
    }
}
