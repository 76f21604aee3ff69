//! Run-time loading of the vendor's shared library.
//!
//! The SDK ships `libBlackmagicRawAPI.so` on Linux and `BlackmagicRawAPI.framework` on
//! macOS. Only two symbols are needed: the factory constructor and `VariantClear`. The
//! first library loaded successfully is kept until the process exits.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use libloading::Library;

use crate::base::HRESULT;
use crate::errors::{Error, Result, S_OK};
use crate::interfaces::{IBlackmagicRawFactory, Variant, SDK_HEADER};

/// Environment variable naming the directory that holds the vendor library.
pub const API_DIR_ENV: &str = "BLACKMAGIC_RAW_API_DIR";

#[cfg(target_os = "linux")]
const LIBRARY_FILE: &str = "libBlackmagicRawAPI.so";
#[cfg(target_os = "macos")]
const LIBRARY_FILE: &str = "BlackmagicRawAPI.framework/BlackmagicRawAPI";
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const LIBRARY_FILE: &str = "libBlackmagicRawAPI.so";

#[cfg(target_os = "linux")]
const DEFAULT_DIRS: &[&str] = &[
    "/usr/lib64/blackmagic/BlackmagicRAWSDK/Linux/Libraries",
    "/usr/lib/blackmagic/BlackmagicRAWSDK/Linux/Libraries",
    "/opt/blackmagic/BlackmagicRAWSDK/Linux/Libraries",
    "/usr/local/lib",
];
#[cfg(target_os = "macos")]
const DEFAULT_DIRS: &[&str] = &[
    "/Applications/Blackmagic RAW/Blackmagic RAW SDK/Mac/Libraries",
    "/Library/Frameworks",
];
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
const DEFAULT_DIRS: &[&str] = &[];

type CreateFactoryFn = unsafe extern "C" fn() -> *mut IBlackmagicRawFactory;
type VariantClearFn = unsafe extern "C" fn(variant: *mut Variant) -> HRESULT;

/// A loaded vendor library and the entry points resolved from it.
pub struct ApiLibrary {
    dir: PathBuf,
    path: PathBuf,
    create_factory: CreateFactoryFn,
    variant_clear: Option<VariantClearFn>,
    // Keeps the code behind the function pointers mapped.
    _library: Library,
}

static LOADED: OnceLock<ApiLibrary> = OnceLock::new();

impl ApiLibrary {
    /// Open the vendor library inside `dir` and resolve its entry points.
    ///
    /// Fails with [`Error::InterfaceIdsUnresolved`] when the crate was built without the
    /// SDK header, since no interface could then be queried.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(LIBRARY_FILE);
        let library_error = |source| Error::Library {
            path: path.clone(),
            source,
        };

        unsafe {
            let library = Library::new(&path).map_err(library_error)?;
            let create_factory = *library
                .get::<CreateFactoryFn>(b"CreateBlackmagicRawFactoryInstance\0")
                .map_err(library_error)?;
            let variant_clear = library
                .get::<VariantClearFn>(b"VariantClear\0")
                .ok()
                .map(|symbol| *symbol);

            if SDK_HEADER.is_none() {
                tracing::error!(path = %path.display(), "Blackmagic RAW interface identifiers unresolved");
                return Err(Error::InterfaceIdsUnresolved);
            }

            Ok(Self {
                dir: dir.to_path_buf(),
                path: path.clone(),
                create_factory,
                variant_clear,
                _library: library,
            })
        }
    }

    /// Load the library from `dir`, or return the one already loaded by this process.
    pub fn load(dir: &Path) -> Result<&'static ApiLibrary> {
        if let Some(loaded) = LOADED.get() {
            if loaded.dir != dir {
                tracing::warn!(
                    loaded = %loaded.path.display(),
                    requested = %dir.display(),
                    "Blackmagic RAW API already loaded; ignoring requested directory"
                );
            }
            return Ok(loaded);
        }

        let library = Self::open(dir)?;
        tracing::debug!(path = %library.path.display(), "loaded Blackmagic RAW API");
        Ok(LOADED.get_or_init(|| library))
    }

    /// Load from [`API_DIR_ENV`] if set, otherwise from the first platform default
    /// directory that works.
    pub fn load_default() -> Result<&'static ApiLibrary> {
        if let Some(loaded) = LOADED.get() {
            return Ok(loaded);
        }

        let mut last_error = None;
        for dir in search_dirs(env::var_os(API_DIR_ENV).as_deref()) {
            match Self::load(&dir) {
                Ok(library) => return Ok(library),
                Err(err) => {
                    tracing::debug!(dir = %dir.display(), error = %err, "Blackmagic RAW API not found");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or(Error::LibraryNotFound))
    }

    /// The library loaded by this process, if any.
    pub fn get() -> Option<&'static ApiLibrary> {
        LOADED.get()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ask the library for a new factory. Null when the vendor refuses.
    pub fn create_factory(&self) -> *mut IBlackmagicRawFactory {
        unsafe { (self.create_factory)() }
    }

    /// Free whatever a variant owns. No-op when the library does not export it.
    ///
    /// # Safety
    ///
    /// `variant` must point to a variant filled in by the vendor.
    pub unsafe fn variant_clear(&self, variant: *mut Variant) -> HRESULT {
        match self.variant_clear {
            Some(clear) => clear(variant),
            None => S_OK,
        }
    }
}

/// Directories to try, in order: the configured one first, then the platform defaults.
fn search_dirs(configured: Option<&OsStr>) -> Vec<PathBuf> {
    configured
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .into_iter()
        .chain(DEFAULT_DIRS.iter().map(PathBuf::from))
        .collect()
}
