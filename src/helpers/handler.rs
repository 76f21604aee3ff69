//! The [`Callback`] trait and the ports that bridge it onto the callback object.

use std::any::Any;
use std::ffi::CStr;
use std::panic::{self, AssertUnwindSafe};

use libc::{c_char, c_void};

use super::{Clip, Frame, Job, ProcessedImage};
use crate::base::HRESULT;
use crate::callback::CallbackPorts;
use crate::errors::{check, Result};
use crate::interfaces::{
    IBlackmagicRawClip, IBlackmagicRawFrame, IBlackmagicRawJob, IBlackmagicRawProcessedImage,
};

/// Receives the results of submitted jobs.
///
/// Methods run on the codec's worker threads, possibly several at once, so
/// implementations must be `Send + Sync` and should return quickly. Every method has an
/// empty default.
///
/// The [`Job`] passed to each event holds its own reference and may be kept past
/// the call.
///
/// A panic inside a method is caught and logged.
pub trait Callback: Send + Sync + 'static {
    fn read_complete(&self, _job: Job, _frame: Result<Frame>) {}

    fn decode_complete(&self, _job: Job, _result: Result<()>) {}

    fn process_complete(&self, _job: Job, _image: Result<ProcessedImage>) {}

    fn trim_progress(&self, _job: Job, _progress: f32) {}

    fn trim_complete(&self, _job: Job, _result: Result<()>) {}

    fn sidecar_metadata_parse_warning(
        &self,
        _clip: Clip,
        _file_name: &str,
        _line_number: u32,
        _info: &str,
    ) {
    }

    fn sidecar_metadata_parse_error(
        &self,
        _clip: Clip,
        _file_name: &str,
        _line_number: u32,
        _info: &str,
    ) {
    }

    /// `user_data` is the pointer given when the pipeline preparation was requested.
    fn prepare_pipeline_complete(&self, _user_data: *mut c_void, _result: Result<()>) {}
}

/// Ports forwarding every event to a boxed `C` passed as context. The `destroyed` port
/// frees the box.
pub(crate) fn ports<C: Callback>() -> CallbackPorts {
    CallbackPorts {
        read_complete: Some(read_complete::<C>),
        decode_complete: Some(decode_complete::<C>),
        process_complete: Some(process_complete::<C>),
        trim_progress: Some(trim_progress::<C>),
        trim_complete: Some(trim_complete::<C>),
        sidecar_metadata_parse_warning: Some(sidecar_metadata_parse_warning::<C>),
        sidecar_metadata_parse_error: Some(sidecar_metadata_parse_error::<C>),
        prepare_pipeline_complete: Some(prepare_pipeline_complete::<C>),
        destroyed: Some(destroyed::<C>),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Run one event handler without letting a panic cross into vendor code.
unsafe fn dispatch<C: Callback>(context: *mut c_void, event: &'static str, f: impl FnOnce(&C)) {
    let callback = &*(context as *const C);
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| f(callback))) {
        tracing::error!(
            event,
            callback = std::any::type_name::<C>(),
            message = panic_message(payload.as_ref()),
            "panic in Blackmagic RAW callback"
        );
    }
}

/// Turn a completion result and its payload pointer into a `Result`.
unsafe fn completed<P, W>(
    result: HRESULT,
    payload: *mut P,
    wrap: unsafe fn(*mut P) -> Result<W>,
) -> Result<W> {
    check(result)?;
    wrap(payload)
}

unsafe fn borrow_job(event: &'static str, job: *mut IBlackmagicRawJob) -> Option<Job> {
    let job = Job::from_borrowed(job).ok();
    if job.is_none() {
        tracing::warn!(event, "Blackmagic RAW callback without a job");
    }
    job
}

unsafe fn text<'a>(text: *const c_char) -> std::borrow::Cow<'a, str> {
    if text.is_null() {
        "".into()
    } else {
        CStr::from_ptr(text).to_string_lossy()
    }
}

unsafe extern "C" fn read_complete<C: Callback>(
    context: *mut c_void,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
    frame: *mut IBlackmagicRawFrame,
) {
    dispatch::<C>(context, "read_complete", |callback| {
        if let Some(job) = borrow_job("read_complete", job) {
            callback.read_complete(job, completed(result, frame, Frame::from_borrowed));
        }
    });
}

unsafe extern "C" fn decode_complete<C: Callback>(
    context: *mut c_void,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
) {
    dispatch::<C>(context, "decode_complete", |callback| {
        if let Some(job) = borrow_job("decode_complete", job) {
            callback.decode_complete(job, check(result));
        }
    });
}

unsafe extern "C" fn process_complete<C: Callback>(
    context: *mut c_void,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
    processed_image: *mut IBlackmagicRawProcessedImage,
) {
    dispatch::<C>(context, "process_complete", |callback| {
        if let Some(job) = borrow_job("process_complete", job) {
            callback.process_complete(
                job,
                completed(result, processed_image, ProcessedImage::from_borrowed),
            );
        }
    });
}

unsafe extern "C" fn trim_progress<C: Callback>(
    context: *mut c_void,
    job: *mut IBlackmagicRawJob,
    progress: f32,
) {
    dispatch::<C>(context, "trim_progress", |callback| {
        if let Some(job) = borrow_job("trim_progress", job) {
            callback.trim_progress(job, progress);
        }
    });
}

unsafe extern "C" fn trim_complete<C: Callback>(
    context: *mut c_void,
    job: *mut IBlackmagicRawJob,
    result: HRESULT,
) {
    dispatch::<C>(context, "trim_complete", |callback| {
        if let Some(job) = borrow_job("trim_complete", job) {
            callback.trim_complete(job, check(result));
        }
    });
}

unsafe extern "C" fn sidecar_metadata_parse_warning<C: Callback>(
    context: *mut c_void,
    clip: *mut IBlackmagicRawClip,
    file_name: *const c_char,
    line_number: u32,
    info: *const c_char,
) {
    dispatch::<C>(context, "sidecar_metadata_parse_warning", |callback| {
        if let Ok(clip) = Clip::from_borrowed(clip) {
            callback.sidecar_metadata_parse_warning(
                clip,
                &text(file_name),
                line_number,
                &text(info),
            );
        }
    });
}

unsafe extern "C" fn sidecar_metadata_parse_error<C: Callback>(
    context: *mut c_void,
    clip: *mut IBlackmagicRawClip,
    file_name: *const c_char,
    line_number: u32,
    info: *const c_char,
) {
    dispatch::<C>(context, "sidecar_metadata_parse_error", |callback| {
        if let Ok(clip) = Clip::from_borrowed(clip) {
            callback.sidecar_metadata_parse_error(clip, &text(file_name), line_number, &text(info));
        }
    });
}

unsafe extern "C" fn prepare_pipeline_complete<C: Callback>(
    context: *mut c_void,
    user_data: *mut c_void,
    result: HRESULT,
) {
    dispatch::<C>(context, "prepare_pipeline_complete", |callback| {
        callback.prepare_pipeline_complete(user_data, check(result));
    });
}

unsafe extern "C" fn destroyed<C: Callback>(context: *mut c_void) {
    let callback = Box::from_raw(context as *mut C);
    if panic::catch_unwind(AssertUnwindSafe(move || drop(callback))).is_err() {
        tracing::error!(callback = std::any::type_name::<C>(), "panic while dropping Blackmagic RAW callback");
    }
}
