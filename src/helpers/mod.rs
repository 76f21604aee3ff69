//! Safe wrappers around the Blackmagic RAW interfaces.
//!
//! Each wrapper owns one reference to its vendor object and releases it on drop. Results
//! are delivered through a [`Callback`] installed on the [`Codec`].
//! Enable with the `helpers` feature flag (on by default).
//!
//! # Example
//!
//! ```no_run
//! use blackmagic_raw_sys::formats::ResourceFormat;
//! use blackmagic_raw_sys::helpers::{Callback, Factory, Frame, Job, ProcessedImage};
//! use blackmagic_raw_sys::errors::Result;
//!
//! struct Decoder;
//!
//! impl Callback for Decoder {
//!     fn read_complete(&self, _job: Job, frame: Result<Frame>) {
//!         if let Ok(frame) = frame {
//!             frame.set_resource_format(ResourceFormat::RGBA_U8).unwrap();
//!             frame.create_job_decode_and_process_frame(None, None).unwrap().submit().unwrap();
//!         }
//!     }
//!
//!     fn process_complete(&self, _job: Job, image: Result<ProcessedImage>) {
//!         if let Ok(image) = image {
//!             println!("{}x{}", image.width().unwrap(), image.height().unwrap());
//!         }
//!     }
//! }
//!
//! let factory = Factory::new().expect("Blackmagic RAW API not installed");
//! let codec = factory.create_codec().unwrap();
//! let clip = codec.open_clip("/media/A001_08122231_C001.braw").unwrap();
//! codec.set_callback(Decoder).unwrap();
//! clip.create_job_read_frame(0).unwrap().submit().unwrap();
//! codec.flush_jobs().unwrap();
//! ```

/// Generates an owning wrapper around `ComPtr<$iface>`.
macro_rules! com_wrapper {
    ($(#[$meta:meta])* $name:ident, $iface:ty) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            ptr: $crate::helpers::ComPtr<$iface>,
        }

        impl $name {
            /// Take ownership of one reference to `raw`.
            ///
            /// # Safety
            ///
            /// `raw` must be null or a live object whose reference the caller gives up.
            pub unsafe fn from_raw(raw: *mut $iface) -> $crate::errors::Result<Self> {
                $crate::helpers::ComPtr::from_raw(raw)
                    .map(|ptr| Self { ptr })
                    .ok_or($crate::errors::Error::NullHandle(stringify!($name)))
            }

            /// Wrap `raw` with a reference of our own.
            ///
            /// # Safety
            ///
            /// `raw` must be null or a live object.
            pub unsafe fn from_borrowed(raw: *mut $iface) -> $crate::errors::Result<Self> {
                $crate::helpers::ComPtr::from_borrowed(raw)
                    .map(|ptr| Self { ptr })
                    .ok_or($crate::errors::Error::NullHandle(stringify!($name)))
            }

            pub fn as_raw(&self) -> *mut $iface {
                self.ptr.as_ptr()
            }

            /// Give up ownership of the reference without releasing it.
            pub fn into_raw(self) -> *mut $iface {
                self.ptr.into_raw()
            }
        }
    };
}

mod clip;
mod codec;
mod com_ptr;
mod factory;
mod frame;
mod handler;
mod job;
mod metadata;

pub use clip::{Clip, ClipAudio, ClipProcessingAttributes};
pub use codec::Codec;
pub use com_ptr::ComPtr;
pub use factory::Factory;
pub use frame::{Frame, FrameProcessingAttributes, ProcessedImage};
pub use handler::Callback;
pub use job::Job;
pub use metadata::{MetadataIterator, MetadataValue};

use crate::buffer::Buffer;
use crate::errors::{check, Error, Result};
use crate::base::HRESULT;

/// Run a getter with a scalar out-parameter.
fn get<T: Default>(f: impl FnOnce(*mut T) -> HRESULT) -> Result<T> {
    let mut out = T::default();
    check(f(&mut out))?;
    Ok(out)
}

/// Run a getter with a string out-parameter. A missing string is an error.
fn get_string(what: &'static str, f: impl FnOnce(*mut *mut Buffer) -> HRESULT) -> Result<String> {
    let mut out: *mut Buffer = std::ptr::null_mut();
    let status = f(&mut out);
    let text = unsafe { Buffer::from_raw(out) };
    check(status)?;
    text.map(|text| text.to_string_lossy())
        .ok_or(Error::NullHandle(what))
}
