// SPDX-License-Identifier: MIT OR Apache-2.0

//! Measurement sessions.
//!
//! A [`Measurement`] brackets the measurements of one boot stage. It is
//! started with [`Measurement::init`], which finds the TPM, prepares the
//! event log and measures the firmware version. Every
//! [`Measurement::measure_data`] extends a PCR and appends a record to the
//! log. [`Measurement::term`] caps PCRs 0 to 7 with a separator event and
//! ends the session.
//!
//! The active PCR banks are read once when the session starts. Changing
//! them while a session is running is not supported.
//!
//! # Example
//!
//! ```no_run
//! use tcg2::measure::{measure_boot_images, BootImages, MeasurementConfig, Platform};
//! # fn boot<P: Platform>(platform: &mut P, kernel: &[u8], initrd: &[u8], fdt: &[u8]) -> tcg2::Result {
//! let images = BootImages {
//!     kernel,
//!     initrd,
//!     devicetree: fdt,
//!     bootargs: Some(c"console=ttyS0"),
//! };
//! measure_boot_images(platform, &MeasurementConfig::default(), &images)
//! # }
//! ```

use crate::event_log::EventLog;
use crate::hash::{check_active_banks, digest_with_banks, DigestAlgorithm, DIGEST_ALGORITHMS};
use crate::tcg::{EventType, HashAlgorithm, PcrIndex, SEPARATOR_ERROR, SEPARATOR_PCRS, SEPARATOR_SUCCESS};
use crate::tpm::{self, Capability, Tpm2, TpmVersion};
use crate::{Result, ResultExt, Status};
use core::ffi::CStr;
use log::{debug, error, warn};

/// Firmware version measured when [`Platform::firmware_version`] is not
/// overridden.
pub const DEFAULT_FIRMWARE_VERSION: &CStr = match CStr::from_bytes_with_nul(
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"), "\0").as_bytes(),
) {
    Ok(version) => version,
    Err(_) => panic!("invalid firmware version string"),
};

/// Platform services used by a measurement session.
pub trait Platform {
    /// TPM transport.
    type Tpm: Tpm2;

    /// Mapping of the event log memory. Dropping it unmaps the memory.
    type Log: AsRef<[u8]> + AsMut<[u8]>;

    /// Find the TPM 2.0 device. Fails with [`Status::ENODEV`] if there is
    /// none.
    fn get_tpm2(&mut self) -> Result<Self::Tpm>;

    /// Map the event log region of `tpm`, e.g. from the
    /// `tpm_event_log_addr`/`tpm_event_log_size` or
    /// `linux,sml-base`/`linux,sml-size` device tree properties, a
    /// `memory-region` or a bloblist entry.
    fn get_log(&mut self, tpm: &Self::Tpm) -> Result<Self::Log>;

    /// Version string measured into PCR 0 when a session starts.
    fn firmware_version(&self) -> &CStr {
        DEFAULT_FIRMWARE_VERSION
    }

    /// Called when a session fails to start after the TPM was found.
    fn startup_error(&mut self, status: Status) {
        let _ = status;
    }
}

/// Policy of a measurement session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MeasurementConfig {
    /// Start a new log instead of replaying the one found in the platform
    /// log region.
    pub ignore_existing_log: bool,
    /// Measure the device tree in [`measure_boot_images`].
    pub measure_devicetree: bool,
}

/// An active measurement session.
pub struct Measurement<T, B> {
    tpm: T,
    log: EventLog<B>,
    active: HashAlgorithm,
    algorithms: &'static [DigestAlgorithm],
}

impl<T: Tpm2, B: AsRef<[u8]> + AsMut<[u8]>> Measurement<T, B> {
    /// Start a session with the compiled [`DIGEST_ALGORITHMS`].
    ///
    /// See [`init_with_algorithms`](Self::init_with_algorithms).
    pub fn init<P>(platform: &mut P, config: &MeasurementConfig, user_log: Option<B>) -> Result<Self>
    where
        P: Platform<Tpm = T, Log = B>,
    {
        Self::init_with_algorithms(platform, config, user_log, &DIGEST_ALGORITHMS)
    }

    /// Start a session.
    ///
    /// Finds and starts the TPM, checks that every active PCR bank is
    /// covered by `algorithms`, prepares the event log (see
    /// [`EventLog::prepare`]; `user_log` is the caller supplied buffer) and
    /// measures [`Platform::firmware_version`] with its terminating null
    /// byte into PCR 0 as `EV_S_CRTM_VERSION`.
    ///
    /// Fails with [`Status::ENODEV`] if there is no TPM 2.0 device and with
    /// [`Status::ENOTSUPP`] if an active bank has no implementation. If the
    /// log cannot be prepared, PCRs 0 to 7 are capped with the error
    /// separator without logging. If the version cannot be measured, the
    /// session is terminated as failed. In every failure case after the TPM
    /// was found, [`Platform::startup_error`] is called.
    pub fn init_with_algorithms<P>(
        platform: &mut P,
        config: &MeasurementConfig,
        user_log: Option<B>,
        algorithms: &'static [DigestAlgorithm],
    ) -> Result<Self>
    where
        P: Platform<Tpm = T, Log = B>,
    {
        let mut tpm = platform.get_tpm2().inspect_err(|err| {
            error!("no TPM device: {}", err.status());
        })?;
        if tpm.version() != TpmVersion::V2 {
            error!("TPM is not a TPM 2.0 device");
            return Err(Status::ENODEV.into());
        }

        let start = tpm
            .auto_start()
            .and_then(|()| tpm::get_active_pcr_banks(&mut tpm))
            .and_then(|active| check_active_banks(algorithms, active).map(|()| active));
        let active = match start {
            Ok(active) => active,
            Err(err) => {
                platform.startup_error(err.status());
                return Err(err);
            }
        };
        debug!("active PCR banks {active:?}");

        let discovered = platform.get_log(&tpm);
        let log = match EventLog::prepare(
            &mut tpm,
            active,
            algorithms,
            discovered,
            user_log,
            config.ignore_existing_log,
        ) {
            Ok(log) => log,
            Err(err) => {
                cap_pcrs(&mut tpm, algorithms, active, true);
                platform.startup_error(err.status());
                return Err(err);
            }
        };

        let mut measurement = Self {
            tpm,
            log,
            active,
            algorithms,
        };

        let version = platform.firmware_version().to_bytes_with_nul();
        if let Err(err) = measurement.measure_event(PcrIndex(0), EventType::S_CRTM_VERSION, version) {
            error!("failed to measure firmware version: {}", err.status());
            measurement.term(true);
            platform.startup_error(err.status());
            return Err(err);
        }

        Ok(measurement)
    }

    /// Measure `data` into `pcr` and log `event`.
    ///
    /// `event` is digested instead when `data` is `None`. If extending the
    /// PCR fails the log is not touched. If the PCR was extended but the
    /// record does not fit, [`Status::ENOBUFS`] is returned and the PCR
    /// stays extended.
    pub fn measure_data(
        &mut self,
        pcr: PcrIndex,
        data: Option<&[u8]>,
        event_type: EventType,
        event: &[u8],
    ) -> Result {
        let digests = digest_with_banks(self.algorithms, self.active, data.unwrap_or(event));
        tpm::pcr_extend(&mut self.tpm, pcr, &digests)?;
        self.log.append(pcr, event_type, &digests, event)
    }

    /// Measure `event` into `pcr` and log it.
    pub fn measure_event(&mut self, pcr: PcrIndex, event_type: EventType, event: &[u8]) -> Result {
        self.measure_data(pcr, None, event_type, event)
    }

    /// End the session.
    ///
    /// Measures an `EV_SEPARATOR` event into each of PCRs 0 to 7, with the
    /// error value if `error` is set. Failures are logged and otherwise
    /// ignored. Returns the log; dropping it releases the buffer.
    pub fn term(mut self, error: bool) -> EventLog<B> {
        let separator = separator(error);
        for pcr in SEPARATOR_PCRS {
            let status = self
                .measure_event(PcrIndex(pcr), EventType::SEPARATOR, &separator)
                .status();
            if status.is_error() {
                warn!("failed to measure separator into PCR {pcr}: {status}");
            }
        }
        self.log
    }

    /// The event log.
    #[must_use]
    pub const fn log(&self) -> &EventLog<B> {
        &self.log
    }

    /// The event log, e.g. to hand it off or attach a final events log.
    pub fn log_mut(&mut self) -> &mut EventLog<B> {
        &mut self.log
    }

    /// The TPM.
    pub fn tpm_mut(&mut self) -> &mut T {
        &mut self.tpm
    }

    /// PCR banks measured by this session.
    #[must_use]
    pub const fn active_pcr_banks(&self) -> HashAlgorithm {
        self.active
    }

    /// Capability of the TPM of this session.
    pub fn capability(&mut self) -> Result<Capability> {
        Capability::query(&mut self.tpm)
    }
}

fn separator(error: bool) -> [u8; 4] {
    let value = if error { SEPARATOR_ERROR } else { SEPARATOR_SUCCESS };
    value.to_le_bytes()
}

/// Extend the separator into PCRs 0 to 7 without a log.
fn cap_pcrs<T: Tpm2>(tpm: &mut T, algorithms: &[DigestAlgorithm], active: HashAlgorithm, error: bool) {
    let digests = digest_with_banks(algorithms, active, &separator(error));
    for pcr in SEPARATOR_PCRS {
        if let Err(err) = tpm::pcr_extend(tpm, PcrIndex(pcr), &digests) {
            warn!("failed to cap PCR {pcr}: {}", err.status());
        }
    }
}

/// Images measured before booting an OS.
#[derive(Clone, Copy, Debug)]
pub struct BootImages<'a> {
    /// OS kernel.
    pub kernel: &'a [u8],
    /// Initial ramdisk, empty if there is none.
    pub initrd: &'a [u8],
    /// Flattened device tree.
    pub devicetree: &'a [u8],
    /// Kernel command line. `None` is measured as an empty string.
    pub bootargs: Option<&'a CStr>,
}

/// Measure the images of an OS boot in a session of its own.
///
/// | Image       | PCR | Event type                 | Event data   |
/// |-------------|-----|----------------------------|--------------|
/// | kernel      | 8   | `EV_COMPACT_HASH`          | `"linux\0"`  |
/// | initrd      | 9   | `EV_COMPACT_HASH`          | `"initrd\0"` |
/// | device tree | 1   | `EV_TABLE_OF_DEVICES`      | `"dts\0"`    |
/// | bootargs    | 1   | `EV_PLATFORM_CONFIG_FLAGS` | the bootargs |
///
/// The device tree is only measured if
/// [`MeasurementConfig::measure_devicetree`] is set. The bootargs are
/// measured with their null terminator. The session is terminated even if
/// a measurement fails, with the error separator in that case.
pub fn measure_boot_images<P: Platform>(
    platform: &mut P,
    config: &MeasurementConfig,
    images: &BootImages<'_>,
) -> Result {
    let mut measurement = Measurement::init(platform, config, None)?;
    let result = measure_images(&mut measurement, config, images);
    measurement.term(result.is_err());
    result
}

fn measure_images<T: Tpm2, B: AsRef<[u8]> + AsMut<[u8]>>(
    measurement: &mut Measurement<T, B>,
    config: &MeasurementConfig,
    images: &BootImages<'_>,
) -> Result {
    measurement.measure_data(
        PcrIndex(8),
        Some(images.kernel),
        EventType::COMPACT_HASH,
        b"linux\0",
    )?;
    measurement.measure_data(
        PcrIndex(9),
        Some(images.initrd),
        EventType::COMPACT_HASH,
        b"initrd\0",
    )?;
    if config.measure_devicetree {
        measurement.measure_data(
            PcrIndex(1),
            Some(images.devicetree),
            EventType::TABLE_OF_DEVICES,
            b"dts\0",
        )?;
    }

    let bootargs = images.bootargs.unwrap_or(c"").to_bytes_with_nul();
    measurement.measure_event(PcrIndex(1), EventType::PLATFORM_CONFIG_FLAGS, bootargs)
}
