//! Owning pointer to a reference-counted vendor object.

use std::fmt;
use std::ptr::NonNull;

use libc::c_void;

use crate::base::{unknown_add_ref, unknown_query_interface, unknown_release, Interface};
use crate::errors::{check, Error, Result};

/// Owns one reference to a vendor object.
///
/// `Clone` adds a reference and `Drop` gives it back. The vendor objects are internally
/// synchronized, so the pointer may move between threads.
pub struct ComPtr<T: Interface> {
    ptr: NonNull<T>,
}

unsafe impl<T: Interface> Send for ComPtr<T> {}
unsafe impl<T: Interface> Sync for ComPtr<T> {}

impl<T: Interface> ComPtr<T> {
    /// Take over one reference. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live object whose reference the caller gives up.
    pub unsafe fn from_raw(raw: *mut T) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self { ptr })
    }

    /// Add a reference of our own to an object the caller only borrows.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live object.
    pub unsafe fn from_borrowed(raw: *mut T) -> Option<Self> {
        let ptr = NonNull::new(raw)?;
        unknown_add_ref(T::as_unknown(raw));
        Some(Self { ptr })
    }

    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Give up ownership without releasing.
    pub fn into_raw(self) -> *mut T {
        let raw = self.ptr.as_ptr();
        std::mem::forget(self);
        raw
    }

    /// Ask the object for another interface.
    pub fn query<U: Interface>(&self) -> Result<ComPtr<U>> {
        let mut out: *mut c_void = std::ptr::null_mut();
        unsafe {
            check(unknown_query_interface(
                T::as_unknown(self.as_ptr()),
                U::IID,
                &mut out,
            ))?;
            ComPtr::from_raw(out as *mut U).ok_or(Error::NullHandle("queried interface"))
        }
    }
}

impl<T: Interface> Clone for ComPtr<T> {
    fn clone(&self) -> Self {
        unsafe { unknown_add_ref(T::as_unknown(self.as_ptr())) };
        Self { ptr: self.ptr }
    }
}

impl<T: Interface> Drop for ComPtr<T> {
    fn drop(&mut self) {
        unsafe { unknown_release(T::as_unknown(self.as_ptr())) };
    }
}

impl<T: Interface> fmt::Debug for ComPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComPtr").field(&self.ptr).finish()
    }
}
