//! Blackmagic RAW status codes and the crate's error type.

#![allow(non_upper_case_globals)]

use std::ffi::NulError;
use std::path::PathBuf;

use crate::base::HRESULT;

pub const S_OK: HRESULT = 0;
pub const S_FALSE: HRESULT = 1;
pub const E_UNEXPECTED: HRESULT = 0x8000_FFFF_u32 as HRESULT;
pub const E_NOTIMPL: HRESULT = 0x8000_0001_u32 as HRESULT;
pub const E_OUTOFMEMORY: HRESULT = 0x8000_0002_u32 as HRESULT;
pub const E_INVALIDARG: HRESULT = 0x8000_0003_u32 as HRESULT;
pub const E_NOINTERFACE: HRESULT = 0x8000_0004_u32 as HRESULT;
pub const E_POINTER: HRESULT = 0x8000_0005_u32 as HRESULT;
pub const E_HANDLE: HRESULT = 0x8000_0006_u32 as HRESULT;
pub const E_ABORT: HRESULT = 0x8000_0007_u32 as HRESULT;
pub const E_FAIL: HRESULT = 0x8000_0008_u32 as HRESULT;
pub const E_ACCESSDENIED: HRESULT = 0x8000_0009_u32 as HRESULT;

/// Convert a status code to a human-readable message.
///
/// Codes outside the generic component-model table belong to the vendor and are
/// reported as unknown.
///
/// # Example
///
/// ```
/// use blackmagic_raw_sys::errors::{hresult_to_string, E_NOINTERFACE};
///
/// assert_eq!(hresult_to_string(E_NOINTERFACE), "No such interface supported");
/// ```
pub fn hresult_to_string(status: HRESULT) -> &'static str {
    match status {
        S_OK => "Success",
        S_FALSE => "Success (false)",
        E_UNEXPECTED => "Unexpected failure",
        E_NOTIMPL => "Not implemented",
        E_OUTOFMEMORY => "Out of memory",
        E_INVALIDARG => "Invalid argument",
        E_NOINTERFACE => "No such interface supported",
        E_POINTER => "Invalid pointer",
        E_HANDLE => "Invalid handle",
        E_ABORT => "Operation aborted",
        E_FAIL => "Unspecified failure",
        E_ACCESSDENIED => "Access denied",
        _ => "Unknown error",
    }
}

/// Check if a status code indicates success.
#[inline]
pub fn is_success(status: HRESULT) -> bool {
    status == S_OK
}

/// Convert a status code to a Result.
///
/// # Example
///
/// ```
/// use blackmagic_raw_sys::errors::{status_to_result, E_FAIL};
///
/// assert!(status_to_result(0).is_ok());
/// assert_eq!(status_to_result(E_FAIL), Err(E_FAIL));
/// ```
pub fn status_to_result(status: HRESULT) -> std::result::Result<(), HRESULT> {
    if status == S_OK {
        Ok(())
    } else {
        Err(status)
    }
}

/// Errors surfaced by the safe wrappers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("blackmagic raw error: {} (0x{:08x})", hresult_to_string(*.0), *.0 as u32)]
    Status(HRESULT),

    #[error("string argument contains an interior nul byte")]
    InteriorNul(#[from] NulError),

    #[error("unable to load the Blackmagic RAW API from {}: {source}", path.display())]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("no Blackmagic RAW API library found; set BLACKMAGIC_RAW_API_DIR")]
    LibraryNotFound,

    #[error("built without BlackmagicRawAPI.h; set BLACKMAGIC_RAW_SDK_DIR and rebuild")]
    InterfaceIdsUnresolved,

    #[error("unable to create blackmagic raw factory. the latest drivers may need to be installed")]
    FactoryUnavailable,

    #[error("vendor returned a null {0}")]
    NullHandle(&'static str),
}

impl Error {
    /// The vendor status code, if this error carries one.
    pub fn status(&self) -> Option<HRESULT> {
        match self {
            Error::Status(status) => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Map a status code onto the crate's [`Result`].
#[inline]
pub fn check(status: HRESULT) -> Result<()> {
    status_to_result(status).map_err(Error::Status)
}
