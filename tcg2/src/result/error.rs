// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Status;
use core::fmt::{self, Debug, Display, Formatter};

/// An error: a status code plus optional additional data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error<Data: Debug = ()> {
    status: Status,
    data: Data,
}

impl<Data: Debug> Error<Data> {
    /// Create an `Error`.
    ///
    /// # Panics
    ///
    /// Panics if `status` is [`Status::SUCCESS`].
    pub const fn new(status: Status, data: Data) -> Self {
        assert!(!status.is_success());
        Self { status, data }
    }

    /// Get error `Status`.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Get error data.
    #[must_use]
    pub const fn data(&self) -> &Data {
        &self.data
    }

    /// Split this error into its inner status and error data
    #[allow(clippy::missing_const_for_fn)]
    pub fn split(self) -> (Status, Data) {
        (self.status, self.data)
    }
}

// Errors without error data can be autogenerated from statuses

impl From<Status> for Error<()> {
    fn from(status: Status) -> Self {
        Self::new(status, ())
    }
}

impl<Data: Debug> Display for Error<Data> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TCG2 error {}: {:?}", self.status(), self.data())
    }
}

impl<Data: Debug> Error<Data> {
    /// Transforms the generic payload of an error to `()`. This is useful if
    /// you want
    /// - to retain the erroneous status code,
    /// - do not care about the payload, and
    /// - refrain from generic type complexity in a higher API level.
    pub const fn to_err_without_payload(&self) -> Error<()> {
        Error {
            status: self.status,
            data: (),
        }
    }
}

impl<Data: Debug> core::error::Error for Error<Data> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status() {
        let err = Error::from(Status::ENOBUFS);
        assert_eq!(err.status(), Status::ENOBUFS);
        assert_eq!(err.split(), (Status::ENOBUFS, ()));
    }

    #[test]
    #[should_panic]
    fn test_error_from_success() {
        let _ = Error::from(Status::SUCCESS);
    }
}
