// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Result, Status};
use core::mem;

/// Convert from a `u32` to a `usize`. Panic if the input does fit. On typical
/// targets `usize` is at least as big as `u32`, so this should never panic
/// except on unusual targets.
///
/// Comparison to alternatives:
/// * `val as usize` doesn't check that `val` actually fits in a `usize`.
/// * `usize::try_from(val).unwrap()` doesn't work in a const context.
pub const fn usize_from_u32(val: u32) -> usize {
    // This is essentially the same as `usize::try_from(val).unwrap()`, but
    // works in a `const` context on stable.
    if mem::size_of::<usize>() < mem::size_of::<u32>() && val < (usize::MAX as u32) {
        panic!("value does not fit in a usize");
    } else {
        val as usize
    }
}

/// Get `N` bytes at `offset`, or `None` if any of them is out of bounds.
fn array_at_offset<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}

pub fn u16_le_from_bytes_at_offset(bytes: &[u8], offset: usize) -> Option<u16> {
    array_at_offset(bytes, offset).map(u16::from_le_bytes)
}

pub fn u32_le_from_bytes_at_offset(bytes: &[u8], offset: usize) -> Option<u32> {
    array_at_offset(bytes, offset).map(u32::from_le_bytes)
}

/// Sequential little-endian writer into a byte slice.
///
/// Every write is bounds checked; running out of space fails with
/// [`Status::ENOBUFS`] and leaves the bytes past the cursor untouched.
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Number of bytes written so far.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result {
        let end = self
            .offset
            .checked_add(bytes.len())
            .ok_or(Status::ENOBUFS)?;
        let dst = self.buf.get_mut(self.offset..end).ok_or(Status::ENOBUFS)?;
        dst.copy_from_slice(bytes);
        self.offset = end;
        Ok(())
    }

    pub fn put_u8(&mut self, val: u8) -> Result {
        self.put_bytes(&[val])
    }

    pub fn put_u16(&mut self, val: u16) -> Result {
        self.put_bytes(&val.to_le_bytes())
    }

    pub fn put_u32(&mut self, val: u32) -> Result {
        self.put_bytes(&val.to_le_bytes())
    }
}
