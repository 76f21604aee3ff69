//! Asynchronous vendor jobs.

use crate::api;
use crate::errors::{check, Result};
use crate::interfaces::IBlackmagicRawJob;

com_wrapper!(
    /// A read, decode or trim operation, run by the codec once submitted.
    ///
    /// The codec holds its own reference to a queued job until the completion event
    /// has been delivered, so the wrapper can be dropped right after [`Job::submit`].
    /// Jobs handed to a [`super::Callback`] are borrowed the same way.
    Job,
    IBlackmagicRawJob
);

impl Job {
    /// Queue the job on the codec's worker threads.
    pub fn submit(&self) -> Result<()> {
        check(unsafe { api::blackmagic_raw_job_submit(self.as_raw()) })
    }

    /// Ask the codec to cancel the job. The completion callback still runs.
    pub fn abort(&self) -> Result<()> {
        check(unsafe { api::blackmagic_raw_job_abort(self.as_raw()) })
    }
}
