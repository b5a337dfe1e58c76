// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Result;

pub use tcg2_raw::Status;

/// Extension trait which provides some convenience methods for [`Status`].
///
/// Mostly useful for [`Tpm2`] implementations whose transport reports raw
/// return codes.
///
/// [`Tpm2`]: crate::tpm::Tpm2
pub trait StatusExt {
    /// Converts this status code into a [`tcg2::Result`].
    ///
    /// If the status does not indicate success, the status representing the specific error
    /// code is embedded into the `Err` variant of type [`tcg2::Error`].
    ///
    /// [`tcg2::Result`]: crate::Result
    /// [`tcg2::Error`]: crate::Error
    fn to_result(self) -> Result;

    /// Converts this status code into a [`tcg2::Result`] with a given `Ok` value.
    ///
    /// If the status does not indicate success, the status representing the specific error
    /// code is embedded into the `Err` variant of type [`tcg2::Error`].
    ///
    /// [`tcg2::Result`]: crate::Result
    /// [`tcg2::Error`]: crate::Error
    fn to_result_with_val<T>(self, val: impl FnOnce() -> T) -> Result<T, ()>;
}

impl StatusExt for Status {
    #[inline]
    fn to_result(self) -> Result {
        if self.is_success() {
            Ok(())
        } else {
            Err(self.into())
        }
    }

    #[inline]
    fn to_result_with_val<T>(self, val: impl FnOnce() -> T) -> Result<T, ()> {
        if self.is_success() {
            Ok(val())
        } else {
            Err(self.into())
        }
    }
}
