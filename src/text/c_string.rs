//! Backend for targets where the SDK takes plain NUL-terminated UTF-8.

use std::ffi::CStr;

use libc::c_char;

use super::NativeText;
use crate::buffer::Buffer;

pub type RawString = *const c_char;

pub struct CStringText;

impl NativeText for CStringText {
    type Raw = RawString;
    type Arg<'a> = &'a CStr;

    fn null() -> RawString {
        std::ptr::null()
    }

    fn is_null(raw: RawString) -> bool {
        raw.is_null()
    }

    unsafe fn copy_from_native_string(raw: RawString) -> Option<Buffer> {
        if raw.is_null() {
            return None;
        }
        Some(Buffer::from_c_str(CStr::from_ptr(raw)))
    }

    // Out-parameter strings stay owned by the vendor object that produced them.
    unsafe fn release_native_string(_raw: RawString) {}

    fn from_portable(text: &CStr) -> &CStr {
        text
    }

    fn as_raw(arg: &&CStr) -> RawString {
        arg.as_ptr()
    }
}
