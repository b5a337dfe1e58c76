// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw definitions for the TCG2 measured-boot event log.
//!
//! This crate holds the wire-level vocabulary shared by everything that
//! produces or consumes a crypto-agile TPM 2.0 event log: algorithm and event
//! type identifiers, the PCR bank bitmask, layout constants of the
//! `Spec ID Event03` header and of `TCG_PCR_EVENT2` records, and the status
//! codes returned by the measurement code.
//!
//! For building and replaying event logs, use the [`tcg2`] crate instead.
//!
//! [`tcg2`]: https://crates.io/crates/tcg2

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(
    clippy::all,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate,
    clippy::use_self,
    missing_debug_implementations,
    unused
)]

#[macro_use]
mod enums;

pub mod tcg;

mod status;

pub use status::Status;
