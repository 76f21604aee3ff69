//! The codec: opens clips and runs jobs.

use std::ffi::CString;

use libc::c_void;

use super::{handler, Callback, Clip};
use crate::api;
use crate::base::unknown_release;
use crate::callback::create_blackmagic_raw_callback;
use crate::errors::{check, Result};
use crate::interfaces::IBlackmagicRaw;

com_wrapper!(
    /// A decoder instance. Results of its jobs go to the installed [`Callback`].
    Codec,
    IBlackmagicRaw
);

impl Codec {
    pub fn open_clip(&self, file_name: &str) -> Result<Clip> {
        let file_name = CString::new(file_name)?;
        let mut clip = std::ptr::null_mut();
        unsafe {
            check(api::blackmagic_raw_open_clip(
                self.as_raw(),
                file_name.as_ptr(),
                &mut clip,
            ))?;
            Clip::from_raw(clip)
        }
    }

    /// Install `callback`, replacing any previous one.
    ///
    /// The codec keeps the callback alive until it is replaced, cleared or the codec is
    /// destroyed. It is called from the codec's worker threads.
    pub fn set_callback<C: Callback>(&self, callback: C) -> Result<()> {
        let context = Box::into_raw(Box::new(callback)) as *mut c_void;
        let ports = handler::ports::<C>();
        unsafe {
            let trampoline = create_blackmagic_raw_callback(&ports, context);
            let status = api::blackmagic_raw_set_callback(self.as_raw(), trampoline);
            // The codec holds its own reference now; on failure this frees the callback.
            unknown_release(trampoline.cast());
            check(status)?;
        }
        tracing::debug!(callback = std::any::type_name::<C>(), "installed Blackmagic RAW callback");
        Ok(())
    }

    /// Remove the installed callback. Events of jobs still in flight are dropped.
    pub fn clear_callback(&self) -> Result<()> {
        check(unsafe { api::blackmagic_raw_set_callback(self.as_raw(), std::ptr::null_mut()) })
    }

    /// Block until every submitted job has completed and its callbacks have run.
    pub fn flush_jobs(&self) -> Result<()> {
        check(unsafe { api::blackmagic_raw_flush_jobs(self.as_raw()) })
    }
}
