//! Reference-counted implementation of `IBlackmagicRawCallback`.
//!
//! The codec delivers job results by calling methods on a callback object from its own
//! worker threads. [`create_blackmagic_raw_callback`] builds such an object whose every
//! method forwards its arguments, unchanged apart from text marshaling, to one of the
//! free functions in a [`CallbackPorts`] table. The opaque context pointer given at
//! construction is passed first to every port and never touched otherwise.
//!
//! # Example
//!
//! ```
//! use blackmagic_raw_sys::base::unknown_release;
//! use blackmagic_raw_sys::callback::{create_blackmagic_raw_callback, CallbackPorts};
//! use blackmagic_raw_sys::interfaces::IBlackmagicRawJob;
//! use libc::c_void;
//!
//! unsafe extern "C" fn on_decode(_ctx: *mut c_void, _job: *mut IBlackmagicRawJob, result: i32) {
//!     assert_eq!(result, 0);
//! }
//!
//! let ports = CallbackPorts {
//!     decode_complete: Some(on_decode),
//!     ..Default::default()
//! };
//! unsafe {
//!     let callback = create_blackmagic_raw_callback(&ports, std::ptr::null_mut());
//!     // Hand `callback` to `blackmagic_raw_set_callback`, then drop the creator's reference.
//!     unknown_release(callback.cast());
//! }
//! ```

use std::sync::atomic::{fence, AtomicU32, Ordering};

use libc::{c_char, c_void};

use crate::base::{IUnknown, IUnknownVtbl, Iid, Interface, IID_IUnknown, HRESULT, ULONG};
use crate::errors::{E_INVALIDARG, E_NOINTERFACE, S_OK};
use crate::interfaces::{
    IBlackmagicRawCallback, IBlackmagicRawCallbackVtbl, IBlackmagicRawClip, IBlackmagicRawFrame,
    IBlackmagicRawJob, IBlackmagicRawProcessedImage,
};
use crate::text::{self, RawString};

pub type ReadCompletePort = unsafe extern "C" fn(
    context: *mut c_void,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
    frame: *mut IBlackmagicRawFrame,
);
pub type DecodeCompletePort =
    unsafe extern "C" fn(context: *mut c_void, job: *mut IBlackmagicRawJob, result: HRESULT);
pub type ProcessCompletePort = unsafe extern "C" fn(
    context: *mut c_void,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
    processed_image: *mut IBlackmagicRawProcessedImage,
);
pub type TrimProgressPort =
    unsafe extern "C" fn(context: *mut c_void, job: *mut IBlackmagicRawJob, progress: f32);
pub type TrimCompletePort =
    unsafe extern "C" fn(context: *mut c_void, job: *mut IBlackmagicRawJob, result: HRESULT);
/// Text arguments are NUL-terminated UTF-8 (or null) and only valid during the call.
pub type SidecarMetadataPort = unsafe extern "C" fn(
    context: *mut c_void,
    clip: *mut IBlackmagicRawClip,
    file_name: *const c_char,
    line_number: u32,
    info: *const c_char,
);
pub type PreparePipelineCompletePort =
    unsafe extern "C" fn(context: *mut c_void, user_data: *mut c_void, result: HRESULT);
pub type DestroyedPort = unsafe extern "C" fn(context: *mut c_void);

/// Free functions receiving the forwarded events. Unset ports drop their event.
///
/// Ports run on the vendor's worker threads, possibly concurrently, and must not block.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct CallbackPorts {
    pub read_complete: Option<ReadCompletePort>,
    pub decode_complete: Option<DecodeCompletePort>,
    pub process_complete: Option<ProcessCompletePort>,
    pub trim_progress: Option<TrimProgressPort>,
    pub trim_complete: Option<TrimCompletePort>,
    pub sidecar_metadata_parse_warning: Option<SidecarMetadataPort>,
    pub sidecar_metadata_parse_error: Option<SidecarMetadataPort>,
    pub prepare_pipeline_complete: Option<PreparePipelineCompletePort>,
    /// Called once, after the last reference is released.
    pub destroyed: Option<DestroyedPort>,
}

/// Heap object handed to the codec. Starts with the vtable pointer so that a pointer to
/// it is a valid `IBlackmagicRawCallback*`.
#[repr(C)]
struct CallbackTrampoline {
    #[allow(dead_code)]
    lpVtbl: *const IBlackmagicRawCallbackVtbl,
    ref_count: AtomicU32,
    ports: CallbackPorts,
    context: *mut c_void,
}

static CALLBACK_VTBL: IBlackmagicRawCallbackVtbl = IBlackmagicRawCallbackVtbl {
    base: IUnknownVtbl {
        QueryInterface: query_interface,
        AddRef: add_ref,
        Release: release,
    },
    ReadComplete: read_complete,
    DecodeComplete: decode_complete,
    ProcessComplete: process_complete,
    TrimProgress: trim_progress,
    TrimComplete: trim_complete,
    SidecarMetadataParseWarning: sidecar_metadata_parse_warning,
    SidecarMetadataParseError: sidecar_metadata_parse_error,
    PreparePipelineComplete: prepare_pipeline_complete,
};

/// Create a callback object with a reference count of 1, owned by the caller.
///
/// The ports are copied; `context` is stored as-is. Release the returned object with
/// [`crate::base::unknown_release`] once it has been handed to the codec.
///
/// # Safety
///
/// `ports` must be null (no ports) or point to a valid table. Whatever `context` refers
/// to must stay valid until the `destroyed` port runs, and must tolerate concurrent use
/// by the ports.
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn create_blackmagic_raw_callback(
    ports: *const CallbackPorts,
    context: *mut c_void,
) -> *mut IBlackmagicRawCallback {
    let trampoline = Box::new(CallbackTrampoline {
        lpVtbl: &CALLBACK_VTBL,
        ref_count: AtomicU32::new(1),
        ports: ports.as_ref().copied().unwrap_or_default(),
        context,
    });
    Box::into_raw(trampoline) as *mut IBlackmagicRawCallback
}

#[inline]
unsafe fn trampoline<'a, T>(this: *mut T) -> &'a CallbackTrampoline {
    &*(this as *const CallbackTrampoline)
}

unsafe extern "C" fn query_interface(
    this: *mut IUnknown,
    iid: Iid,
    out: *mut *mut c_void,
) -> HRESULT {
    if out.is_null() {
        return E_INVALIDARG;
    }

    if iid == IID_IUnknown || iid == IBlackmagicRawCallback::IID {
        *out = this as *mut c_void;
        add_ref(this);
        S_OK
    } else {
        *out = std::ptr::null_mut();
        E_NOINTERFACE
    }
}

/// Returns the count before the increment.
unsafe extern "C" fn add_ref(this: *mut IUnknown) -> ULONG {
    trampoline(this).ref_count.fetch_add(1, Ordering::Relaxed)
}

/// Returns the count before the decrement and frees the object when it reaches zero.
unsafe extern "C" fn release(this: *mut IUnknown) -> ULONG {
    let previous = trampoline(this).ref_count.fetch_update(
        Ordering::Release,
        Ordering::Relaxed,
        |count| count.checked_sub(1),
    );

    match previous {
        Ok(1) => {
            fence(Ordering::Acquire);
            let trampoline = Box::from_raw(this as *mut CallbackTrampoline);
            tracing::trace!(context = ?trampoline.context, "callback object destroyed");
            if let Some(destroyed) = trampoline.ports.destroyed {
                destroyed(trampoline.context);
            }
            1
        }
        Ok(previous) => previous,
        Err(_) => {
            tracing::error!("release called on a callback object with no references left");
            0
        }
    }
}

unsafe extern "C" fn read_complete(
    this: *mut IBlackmagicRawCallback,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
    frame: *mut IBlackmagicRawFrame,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.read_complete {
        port(t.context, job, result, frame);
    }
}

unsafe extern "C" fn decode_complete(
    this: *mut IBlackmagicRawCallback,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.decode_complete {
        port(t.context, job, result);
    }
}

unsafe extern "C" fn process_complete(
    this: *mut IBlackmagicRawCallback,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
    processed_image: *mut IBlackmagicRawProcessedImage,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.process_complete {
        port(t.context, job, result, processed_image);
    }
}

unsafe extern "C" fn trim_progress(
    this: *mut IBlackmagicRawCallback,
    job: *mut IBlackmagicRawJob,
    progress: f32,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.trim_progress {
        port(t.context, job, progress);
    }
}

unsafe extern "C" fn trim_complete(
    this: *mut IBlackmagicRawCallback,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.trim_complete {
        port(t.context, job, result);
    }
}

/// Convert both text arguments to portable buffers for the duration of the port call.
unsafe fn forward_sidecar(
    port: SidecarMetadataPort,
    context: *mut c_void,
    clip: *mut IBlackmagicRawClip,
    file_name: RawString,
    line_number: u32,
    info: RawString,
) {
    let file_name = text::copy_from_native_string(file_name);
    let info = text::copy_from_native_string(info);
    port(
        context,
        clip,
        file_name.as_ref().map_or(std::ptr::null(), |b| b.as_ptr()),
        line_number,
        info.as_ref().map_or(std::ptr::null(), |b| b.as_ptr()),
    );
}

unsafe extern "C" fn sidecar_metadata_parse_warning(
    this: *mut IBlackmagicRawCallback,
    clip: *mut IBlackmagicRawClip,
    file_name: RawString,
    line_number: u32,
    info: RawString,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.sidecar_metadata_parse_warning {
        forward_sidecar(port, t.context, clip, file_name, line_number, info);
    }
}

unsafe extern "C" fn sidecar_metadata_parse_error(
    this: *mut IBlackmagicRawCallback,
    clip: *mut IBlackmagicRawClip,
    file_name: RawString,
    line_number: u32,
    info: RawString,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.sidecar_metadata_parse_error {
        forward_sidecar(port, t.context, clip, file_name, line_number, info);
    }
}

unsafe extern "C" fn prepare_pipeline_complete(
    this: *mut IBlackmagicRawCallback,
    user_data: *mut c_void,
    result: HRESULT,
) {
    let t = trampoline(this);
    if let Some(port) = t.ports.prepare_pipeline_complete {
        port(t.context, user_data, result);
    }
}
