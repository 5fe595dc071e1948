//! Encoding and decoding of strings crossing the table boundary.

#![expect(unsafe_code, reason = "string views are raw pointer and length pairs")]

use core::ffi::{CStr, c_char};

use crate::constants::INVALID_UTF8;

/// Length of `bytes` as a wire `u32`.
///
/// Buffers longer than `u32::MAX` are clamped; the receiver then sees a
/// prefix, never memory past the end.
#[must_use]
pub fn abi_len(bytes: &[u8]) -> u32 {
    u32::try_from(bytes.len()).unwrap_or(u32::MAX)
}

/// Encode a string argument for a first generation table.
///
/// A zero length tells first generation providers to read a NUL-terminated
/// buffer, so an empty string is sent as a pointer to a lone NUL.
#[must_use]
pub fn legacy_arg(bytes: &[u8]) -> (*const u8, u32) {
    if bytes.is_empty() {
        (c"".as_ptr().cast::<u8>(), 0)
    } else {
        (bytes.as_ptr(), abi_len(bytes))
    }
}

/// View a `(ptr, len)` pair as bytes.
///
/// A null pointer or zero length yields an empty slice.
///
/// # Safety
///
/// When non-null, `ptr` must be valid for reads of `len` bytes for `'a`.
#[must_use]
pub unsafe fn decode_bytes<'a>(ptr: *const u8, len: u32) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    // SAFETY: the caller guarantees `len` readable bytes at `ptr`.
    unsafe { core::slice::from_raw_parts(ptr, len as usize) }
}

/// Decode an explicit-length string, substituting
/// [`INVALID_UTF8`](crate::constants::INVALID_UTF8) for bad input.
///
/// # Safety
///
/// Same contract as [`decode_bytes`].
#[must_use]
pub unsafe fn decode_str<'a>(ptr: *const u8, len: u32) -> &'a str {
    // SAFETY: forwarded caller contract.
    let bytes = unsafe { decode_bytes(ptr, len) };
    core::str::from_utf8(bytes).unwrap_or(INVALID_UTF8)
}

/// Decode a first generation string: `len == 0` means NUL-terminated.
///
/// # Safety
///
/// When `len == 0` and `ptr` is non-null, `ptr` must point to a
/// NUL-terminated buffer valid for `'a`. Otherwise the contract of
/// [`decode_bytes`] applies.
#[must_use]
pub unsafe fn decode_legacy_str<'a>(ptr: *const u8, len: u32) -> &'a str {
    if len != 0 {
        // SAFETY: forwarded caller contract.
        return unsafe { decode_str(ptr, len) };
    }
    if ptr.is_null() {
        return "";
    }
    // SAFETY: the caller guarantees a NUL-terminated buffer.
    let c_str = unsafe { CStr::from_ptr(ptr.cast::<c_char>()) };
    c_str.to_str().unwrap_or(INVALID_UTF8)
}
