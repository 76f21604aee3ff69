//! Conversion between the vendor's native text type and [`Buffer`].
//!
//! The SDK represents text as a `CFStringRef` on macOS and as a NUL-terminated UTF-8
//! `const char*` on Linux. [`NativeText`] states the contract once; the backend
//! matching the build target is re-exported as [`Platform`] and [`RawString`].
//!
//! The Windows SDK uses `BSTR`, for which there is no backend.

use std::ffi::CStr;

use crate::buffer::Buffer;

#[cfg(target_os = "windows")]
compile_error!("the Windows Blackmagic RAW SDK passes text as BSTR, which this crate does not support");

#[cfg(target_os = "macos")]
mod cf;
#[cfg(target_os = "macos")]
pub use cf::{CfText as Platform, RawString};

#[cfg(not(target_os = "macos"))]
mod c_string;
#[cfg(not(target_os = "macos"))]
pub use c_string::{CStringText as Platform, RawString};

/// One text representation the vendor library speaks.
pub trait NativeText {
    /// The value crossing the vendor ABI.
    type Raw: Copy;

    /// Keeps an input argument alive for the duration of a vendor call.
    type Arg<'a>;

    /// The representation of "no string".
    fn null() -> Self::Raw;

    fn is_null(raw: Self::Raw) -> bool;

    /// Copy the UTF-8 encoding of `raw` into a new buffer. Null maps to `None`.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a valid string of this representation.
    unsafe fn copy_from_native_string(raw: Self::Raw) -> Option<Buffer>;

    /// Give back a string the vendor handed out as an out-parameter, once it has been
    /// copied.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a string produced by the vendor for the caller.
    unsafe fn release_native_string(raw: Self::Raw);

    /// Wrap portable text for use as an input parameter. The vendor never takes
    /// ownership; the argument must outlive the call.
    fn from_portable(text: &CStr) -> Self::Arg<'_>;

    fn as_raw(arg: &Self::Arg<'_>) -> Self::Raw;

    fn to_native_string(buffer: &Buffer) -> Self::Arg<'_> {
        Self::from_portable(buffer.as_c_str())
    }
}

/// Copy `raw` with the build target's backend.
///
/// # Safety
///
/// See [`NativeText::copy_from_native_string`].
pub unsafe fn copy_from_native_string(raw: RawString) -> Option<Buffer> {
    Platform::copy_from_native_string(raw)
}

/// Copy and then release an out-parameter string.
///
/// # Safety
///
/// See [`NativeText::release_native_string`].
pub(crate) unsafe fn take_native_string(raw: RawString) -> Option<Buffer> {
    let buffer = Platform::copy_from_native_string(raw);
    Platform::release_native_string(raw);
    buffer
}

/// Run `f` with `text` converted to the native representation. A null pointer is passed
/// through as the native null.
///
/// # Safety
///
/// `text` must be null or a valid NUL-terminated string.
pub(crate) unsafe fn with_native_string<R>(
    text: *const libc::c_char,
    f: impl FnOnce(RawString) -> R,
) -> R {
    if text.is_null() {
        return f(Platform::null());
    }
    let arg = Platform::from_portable(CStr::from_ptr(text));
    f(Platform::as_raw(&arg))
}
