// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::Debug;

newtype_enum! {
/// Status codes reported by the measurement code.
///
/// The values follow the negative errno convention of the bootloader the
/// event log is shared with, so a status can be handed back to board code
/// unchanged. `Tpm2` implementations may return codes not listed here.
#[must_use]
pub enum Status: i32 => {
    /// The operation completed successfully.
    SUCCESS     =    0,
    /// The TPM transport reported an error.
    EIO         =   -5,
    /// No TPM2 device was found.
    ENODEV      =  -19,
    /// No event log region was found.
    ENOENT      =   -2,
    /// A parameter was incorrect.
    EINVAL      =  -22,
    /// The event log buffer is too small for the header or the next record.
    ENOBUFS     = -105,
    /// The operation or algorithm is not supported.
    ENOTSUPP    = -524,
}}

impl Status {
    /// Returns true if status code indicates success.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Returns true if the status code indicates an error.
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.0 < 0
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}
