// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tooling for C-style enums read from or written to the event log.
//!
//! Values in an event log are produced by other firmware, so an unknown
//! algorithm or event type must be representable. Storing such a value in a
//! Rust `enum` would be undefined behavior, hence these types are modeled as
//! integer newtypes with a set of associated constants.

/// Interface a C-style enum as an integer newtype.
///
/// The generated type derives the usual comparison traits and has a
/// [`Debug`] impl that prints the constant name for known values and
/// `Type(value)` otherwise.
///
/// ```ignore
/// newtype_enum! {
///     /// Three-valued boolean.
///     pub enum UnixBool: i32 => {
///         FALSE          =  0,
///         TRUE           =  1,
///         FILE_NOT_FOUND = -1,
///     }
/// }
/// ```
///
/// [`Debug`]: core::fmt::Debug
macro_rules! newtype_enum {
    (
        $(#[$type_attrs:meta])*
        $visibility:vis enum $type:ident : $base_integer:ty => $(#[$impl_attrs:meta])* {
            $(
                $(#[$variant_attrs:meta])*
                $variant:ident = $value:expr,
            )*
        }
    ) => {
        $(#[$type_attrs])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
        $visibility struct $type(pub $base_integer);

        $(#[$impl_attrs])*
        #[allow(unused)]
        impl $type {
            $(
                $(#[$variant_attrs])*
                pub const $variant: $type = $type($value);
            )*
        }

        impl core::fmt::Debug for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match *self {
                    // Display variants by their name, like Rust enums do
                    $(
                        $type::$variant => write!(f, stringify!($variant)),
                    )*

                    // Display unknown variants in tuple struct format
                    $type(unknown) => {
                        write!(f, "{}({:#x})", stringify!($type), unknown)
                    }
                }
            }
        }
    }
}
