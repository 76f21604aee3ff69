//! Component-model primitives shared by every vendor interface.
//!
//! The Blackmagic RAW SDK follows the COM conventions on every platform: an object is a
//! pointer to a virtual table whose first three slots are `QueryInterface`, `AddRef` and
//! `Release`, and interfaces are identified by 128-bit identifiers passed by value.

use libc::c_void;

/// Status code returned by almost every vendor method. Zero means success.
pub type HRESULT = i32;

/// Reference count type used by `AddRef` / `Release`.
pub type ULONG = u32;

/// Interface identifier (`REFIID`), passed by value as 16 raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Iid {
    pub bytes: [u8; 16],
}

impl Iid {
    /// Build an identifier from its canonical `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX` fields.
    pub const fn from_fields(d1: u32, d2: u16, d3: u16, d4: [u8; 8]) -> Self {
        let a = d1.to_be_bytes();
        let b = d2.to_be_bytes();
        let c = d3.to_be_bytes();
        Self {
            bytes: [
                a[0], a[1], a[2], a[3], b[0], b[1], c[0], c[1], d4[0], d4[1], d4[2], d4[3],
                d4[4], d4[5], d4[6], d4[7],
            ],
        }
    }
}

/// `IUnknown`: 00000000-0000-0000-C000-000000000046
pub const IID_IUnknown: Iid = Iid::from_fields(
    0x0000_0000,
    0x0000,
    0x0000,
    [0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46],
);

/// Base virtual table embedded at the start of every interface's table.
#[repr(C)]
pub struct IUnknownVtbl {
    pub QueryInterface:
        unsafe extern "C" fn(this: *mut IUnknown, iid: Iid, out: *mut *mut c_void) -> HRESULT,
    pub AddRef: unsafe extern "C" fn(this: *mut IUnknown) -> ULONG,
    pub Release: unsafe extern "C" fn(this: *mut IUnknown) -> ULONG,
}

#[repr(C)]
pub struct IUnknown {
    pub lpVtbl: *const IUnknownVtbl,
}

/// Implemented by every `#[repr(C)]` interface struct whose table starts with
/// [`IUnknownVtbl`].
///
/// # Safety
///
/// The implementing type must be a single vtable pointer whose table begins with the
/// `IUnknown` slots, so that a pointer to it is also a valid `*mut IUnknown`.
pub unsafe trait Interface {
    /// Identifier the vendor answers to in `QueryInterface`.
    const IID: Iid;

    fn as_unknown(this: *mut Self) -> *mut IUnknown {
        this as *mut IUnknown
    }
}

unsafe impl Interface for IUnknown {
    const IID: Iid = IID_IUnknown;
}

/// Call a method through an interface's virtual table.
///
/// `vcall!(ptr, Method(args...))` expands to `((*(*ptr).lpVtbl).Method)(ptr, args...)`.
/// `vcall!(ptr, base.AddRef())` reaches the embedded `IUnknown` slots.
#[macro_export]
macro_rules! vcall {
    ($obj:expr, base.$method:ident($($arg:expr),* $(,)?)) => {{
        let obj = $obj;
        ((*(*obj).lpVtbl).base.$method)(obj as *mut $crate::base::IUnknown, $($arg),*)
    }};
    ($obj:expr, $method:ident($($arg:expr),* $(,)?)) => {{
        let obj = $obj;
        ((*(*obj).lpVtbl).$method)(obj, $($arg),*)
    }};
}

/// Increment the reference count of any component-model object.
///
/// # Safety
///
/// `obj` must point to a live object.
pub unsafe fn unknown_add_ref(obj: *mut IUnknown) -> ULONG {
    ((*(*obj).lpVtbl).AddRef)(obj)
}

/// Decrement the reference count of any component-model object.
///
/// # Safety
///
/// `obj` must point to a live object and the caller must own one reference.
pub unsafe fn unknown_release(obj: *mut IUnknown) -> ULONG {
    ((*(*obj).lpVtbl).Release)(obj)
}

/// Ask an object for another interface.
///
/// # Safety
///
/// `obj` must point to a live object; `out` must be null or writable.
pub unsafe fn unknown_query_interface(
    obj: *mut IUnknown,
    iid: Iid,
    out: *mut *mut c_void,
) -> HRESULT {
    ((*(*obj).lpVtbl).QueryInterface)(obj, iid, out)
}
