//! Owned text buffers handed across the adapter boundary.
//!
//! A [`Buffer`] is produced whenever text is copied out of the vendor's transient string
//! representation. It is immutable, tracks its length explicitly and keeps a trailing
//! NUL so that [`Buffer::as_ptr`] can be passed to C as a string.

use std::ffi::{CStr, CString, NulError};
use std::fmt;
use std::str::Utf8Error;

use libc::{c_char, c_void};

/// Immutable, exclusively owned byte string.
///
/// Inside Rust the buffer is a move-only value freed by [`Buffer::release`] (or by going
/// out of scope). Across the C boundary it travels as the raw handle returned by
/// [`Buffer::into_raw`] and must be released exactly once with [`buffer_release`].
#[derive(PartialEq, Eq, Hash)]
pub struct Buffer {
    data: CString,
}

impl Buffer {
    /// Copy `bytes` into a new buffer. Fails if they contain a NUL byte.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, NulError> {
        Ok(Self {
            data: CString::new(bytes)?,
        })
    }

    /// Copy the bytes of a borrowed C string.
    pub fn from_c_str(text: &CStr) -> Self {
        Self {
            data: text.to_owned(),
        }
    }

    /// Number of bytes, excluding the terminator.
    pub fn len(&self) -> usize {
        self.data.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.data
    }

    /// Read-only pointer to the first byte, valid until the buffer is released.
    pub fn as_ptr(&self) -> *const c_char {
        self.data.as_ptr()
    }

    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        self.data.to_str()
    }

    pub fn to_string_lossy(&self) -> String {
        self.data.to_string_lossy().into_owned()
    }

    /// Free the storage. Equivalent to dropping the buffer, spelled out for call sites
    /// that mirror the explicit release of the C surface.
    pub fn release(self) {}

    /// Move the buffer to the heap and hand out a raw handle for a C caller.
    pub fn into_raw(self) -> *mut Buffer {
        Box::into_raw(Box::new(self))
    }

    /// Take back ownership of a handle produced by [`Buffer::into_raw`].
    ///
    /// # Safety
    ///
    /// `raw` must come from [`Buffer::into_raw`] and must not be used afterwards.
    pub unsafe fn from_raw(raw: *mut Buffer) -> Option<Buffer> {
        if raw.is_null() {
            None
        } else {
            Some(*Box::from_raw(raw))
        }
    }
}

impl TryFrom<&str> for Buffer {
    type Error = NulError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Buffer::new(text)
    }
}

impl From<CString> for Buffer {
    fn from(data: CString) -> Self {
        Self { data }
    }
}

impl AsRef<CStr> for Buffer {
    fn as_ref(&self) -> &CStr {
        &self.data
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer").field(&self.data).finish()
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data.to_string_lossy())
    }
}

/// Read-only view of a buffer handle's bytes. Null handles yield null.
///
/// # Safety
///
/// `buffer` must be null or a live handle from [`Buffer::into_raw`].
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn buffer_data(buffer: *const Buffer) -> *const c_void {
    match buffer.as_ref() {
        Some(buffer) => buffer.as_ptr() as *const c_void,
        None => std::ptr::null(),
    }
}

/// Length in bytes of a buffer handle, excluding the terminator. Null handles yield 0.
///
/// # Safety
///
/// `buffer` must be null or a live handle from [`Buffer::into_raw`].
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn buffer_len(buffer: *const Buffer) -> usize {
    buffer.as_ref().map_or(0, Buffer::len)
}

/// Free a buffer handle. Null is a no-op.
///
/// # Safety
///
/// `buffer` must be null or a live handle from [`Buffer::into_raw`]; it is invalid
/// afterwards.
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn buffer_release(buffer: *mut Buffer) {
    drop(Buffer::from_raw(buffer));
}
