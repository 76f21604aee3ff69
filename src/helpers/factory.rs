//! Entry point: a factory created by the loaded vendor library.

use std::path::Path;

use super::Codec;
use crate::api;
use crate::errors::{check, Error, Result};
use crate::interfaces::IBlackmagicRawFactory;
use crate::library::ApiLibrary;

com_wrapper!(
    /// Creates codecs. One per process is enough.
    Factory,
    IBlackmagicRawFactory
);

impl Factory {
    /// Load the vendor library from `BLACKMAGIC_RAW_API_DIR` or the platform's default
    /// install location and create a factory.
    pub fn new() -> Result<Self> {
        Self::from_library(ApiLibrary::load_default()?)
    }

    /// Load the vendor library from `dir` and create a factory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use blackmagic_raw_sys::helpers::Factory;
    ///
    /// let factory = Factory::new_from_path("/opt/blackmagic/BlackmagicRAWSDK/Linux/Libraries")
    ///     .expect("Failed to load Blackmagic RAW API");
    /// let codec = factory.create_codec().expect("Failed to create codec");
    /// ```
    pub fn new_from_path(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_library(ApiLibrary::load(dir.as_ref())?)
    }

    fn from_library(library: &ApiLibrary) -> Result<Self> {
        unsafe { Self::from_raw(library.create_factory()) }.map_err(|_| Error::FactoryUnavailable)
    }

    pub fn create_codec(&self) -> Result<Codec> {
        let mut codec = std::ptr::null_mut();
        unsafe {
            check(api::blackmagic_raw_factory_create_codec(self.as_raw(), &mut codec))?;
            Codec::from_raw(codec)
        }
    }
}
