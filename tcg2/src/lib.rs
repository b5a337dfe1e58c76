// SPDX-License-Identifier: MIT OR Apache-2.0

//! TCG2 measured boot for bootloaders.
//!
//! This crate records measurements of a boot stage in a TPM 2.0 and in the
//! crypto-agile event log defined by the [TCG PC Client Platform Firmware
//! Profile Specification][spec].
//!
//! # Crate organisation
//!
//! The top-level module contains the result and error types.
//!
//! - [`tcg`]: raw log definitions, re-exported from `tcg2-raw`.
//! - [`hash`]: multi-algorithm digests over the active PCR banks.
//! - [`tpm`]: the [`Tpm2`] transport trait, PCR bank queries and extends.
//! - [`event_log`]: encoding, bounds-checked parsing and storage of the log.
//! - [`measure`]: measurement sessions on top of a [`Platform`].
//!
//! The TPM command transport and the discovery of the log memory are not
//! part of this crate. The firmware provides them by implementing
//! [`Tpm2`] and [`Platform`].
//!
//! ## Optional crate features
//!
//! - `sha1`, `sha256`, `sha384`, `sha512` (all enabled by default): compile
//!   in the corresponding hash algorithm. A session fails to start if the
//!   TPM has an active PCR bank whose algorithm is not compiled in.
//! - `alloc`: Enable functionality requiring the [`alloc`] crate from
//!   the Rust standard library, such as allocating the log buffer with
//!   [`EventLog::with_capacity`].
//!
//! ## Logging
//!
//! Diagnostics are emitted through the [`log`] crate. Installing a logger
//! is up to the firmware.
//!
//! [spec]: https://trustedcomputinggroup.org/resource/pc-client-specific-platform-firmware-profile-specification/
//! [`Platform`]: measure::Platform
//! [`Tpm2`]: tpm::Tpm2
//! [`EventLog::with_capacity`]: event_log::EventLog::with_capacity

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![no_std]
// Enable some additional warnings and lints.
#![warn(clippy::ptr_as_ptr, missing_docs, unused)]
#![deny(clippy::all)]
#![deny(clippy::must_use_candidate)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

mod result;
pub use self::result::{Error, Result, ResultExt, Status, StatusExt};

pub use tcg2_raw::tcg;

pub mod event_log;
pub mod hash;
pub mod measure;
pub mod tpm;

mod util;

#[cfg(test)]
mod testing;
