// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facilities for dealing with measurement results.

use core::fmt::Debug;

/// The error type that we use, essentially a status code + optional additional data
mod error;
pub use error::Error;

/// Definition of the status codes
mod status;
pub use status::{Status, StatusExt};

/// Return type of most measurement functions. Both success and error payloads
/// are optional.
///
/// Maps [`Status::SUCCESS`] to the `Ok` variant (with optional `Output` data),
/// and every error status to the `Err` variant (with optional `ErrData`).
pub type Result<Output = (), ErrData = ()> = core::result::Result<Output, Error<ErrData>>;

/// Extension trait which provides some convenience methods for [`Result`].
pub trait ResultExt<Output, ErrData: Debug> {
    /// Extract the status from this result
    fn status(&self) -> Status;

    /// Transform the ErrData value to ()
    fn discard_errdata(self) -> Result<Output>;
}

impl<Output, ErrData: Debug> ResultExt<Output, ErrData> for Result<Output, ErrData> {
    fn status(&self) -> Status {
        match self {
            Ok(_) => Status::SUCCESS,
            Err(e) => e.status(),
        }
    }

    fn discard_errdata(self) -> Result<Output> {
        match self {
            Ok(o) => Ok(o),
            Err(e) => Err(e.status().into()),
        }
    }
}
