//! Backend for macOS, where the SDK speaks `CFStringRef`.

use std::ffi::CStr;

use core_foundation::base::TCFType;
use core_foundation::string::CFString;
use core_foundation_sys::base::{kCFAllocatorDefault, CFRelease};
use core_foundation_sys::string::{
    kCFStringEncodingUTF8, CFStringCreateWithCString, CFStringGetCString, CFStringGetLength,
    CFStringGetMaximumSizeForEncoding, CFStringRef,
};

use super::NativeText;
use crate::buffer::Buffer;

pub type RawString = CFStringRef;

pub struct CfText;

impl NativeText for CfText {
    type Raw = RawString;
    type Arg<'a> = Option<CFString>;

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

        // Size for the worst-case UTF-8 expansion of every UTF-16 unit, plus the NUL.
        let length = CFStringGetLength(raw);
        let max_size = CFStringGetMaximumSizeForEncoding(length, kCFStringEncodingUTF8) + 1;
        let mut scratch = vec![0u8; max_size as usize];
        if CFStringGetCString(
            raw,
            scratch.as_mut_ptr() as *mut libc::c_char,
            max_size,
            kCFStringEncodingUTF8,
        ) == 0
        {
            return None;
        }

        let text = CStr::from_bytes_until_nul(&scratch).ok()?;
        Some(Buffer::from_c_str(text))
    }

    unsafe fn release_native_string(raw: RawString) {
        if !raw.is_null() {
            CFRelease(raw as *const libc::c_void);
        }
    }

    fn from_portable(text: &CStr) -> Option<CFString> {
        unsafe {
            let raw =
                CFStringCreateWithCString(kCFAllocatorDefault, text.as_ptr(), kCFStringEncodingUTF8);
            if raw.is_null() {
                None
            } else {
                Some(CFString::wrap_under_create_rule(raw))
            }
        }
    }

    fn as_raw(arg: &Option<CFString>) -> RawString {
        arg.as_ref()
            .map_or(std::ptr::null(), |s| s.as_concrete_TypeRef())
    }
}
