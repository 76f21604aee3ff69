//! Clip and frame metadata.

use std::fmt;

use crate::api;
use crate::base::HRESULT;
use crate::buffer::Buffer;
use crate::errors::{check, is_success, Result};
use crate::formats::variant_type;
use crate::interfaces::{IBlackmagicRawMetadataIterator, Variant};

/// A decoded metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Empty,
    U8(u8),
    S16(i16),
    U16(u16),
    S32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
    String(String),
    /// Arrays and any tag this crate does not decode, with the raw tag.
    Unsupported(u32),
}

impl MetadataValue {
    /// Decode a variant filled in by the vendor.
    ///
    /// # Safety
    ///
    /// The variant's payload must match its tag.
    pub unsafe fn from_variant(variant: &Variant) -> Self {
        let value = &variant.value;
        match variant.vt {
            variant_type::EMPTY => Self::Empty,
            variant_type::U8 => Self::U8(value.u8_val),
            variant_type::S16 => Self::S16(value.i16_val),
            variant_type::U16 => Self::U16(value.u16_val),
            variant_type::S32 => Self::S32(value.i32_val),
            variant_type::U32 => Self::U32(value.u32_val),
            variant_type::FLOAT32 => Self::F32(value.f32_val),
            variant_type::FLOAT64 => Self::F64(value.f64_val),
            variant_type::STRING => {
                let mut text: *mut Buffer = std::ptr::null_mut();
                api::blackmagic_raw_variant_get_string(variant, &mut text);
                Buffer::from_raw(text).map_or(Self::Empty, |text| Self::String(text.to_string_lossy()))
            }
            other => Self::Unsupported(other),
        }
    }

    /// Fill a variant with `f`, decode it and clear it.
    pub(crate) fn read(f: impl FnOnce(*mut Variant) -> HRESULT) -> Result<Self> {
        let mut variant = Variant::default();
        let status = f(&mut variant);
        let value = check(status).map(|()| unsafe { Self::from_variant(&variant) });
        unsafe { api::blackmagic_raw_variant_clear(&mut variant) };
        value
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::U8(v) => write!(f, "{v}"),
            Self::S16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::S32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Unsupported(tag) => write!(f, "<unsupported variant {tag}>"),
        }
    }
}

/// Walks the key/value pairs of a metadata iterator.
///
/// Iteration ends when the vendor reports no further key.
///
/// # Example
///
/// ```no_run
/// # fn run(clip: &blackmagic_raw_sys::helpers::Clip) -> blackmagic_raw_sys::errors::Result<()> {
/// for entry in clip.metadata_iter()? {
///     let (key, value) = entry?;
///     println!("{key} = {value}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct MetadataIterator {
    ptr: super::ComPtr<IBlackmagicRawMetadataIterator>,
    done: bool,
}

impl MetadataIterator {
    /// Take ownership of one reference to `raw`.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live iterator whose reference the caller gives up.
    pub unsafe fn from_raw(raw: *mut IBlackmagicRawMetadataIterator) -> Result<Self> {
        super::ComPtr::from_raw(raw)
            .map(|ptr| Self { ptr, done: false })
            .ok_or(crate::errors::Error::NullHandle("MetadataIterator"))
    }

    pub fn as_raw(&self) -> *mut IBlackmagicRawMetadataIterator {
        self.ptr.as_ptr()
    }

    fn key(&self) -> Option<String> {
        let mut key: *mut Buffer = std::ptr::null_mut();
        let status = unsafe { api::blackmagic_raw_metadata_iterator_get_key(self.as_raw(), &mut key) };
        let key = unsafe { Buffer::from_raw(key) };
        if is_success(status) {
            key.map(|key| key.to_string_lossy())
        } else {
            None
        }
    }
}

impl Iterator for MetadataIterator {
    type Item = Result<(String, MetadataValue)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(key) = self.key() else {
            self.done = true;
            return None;
        };

        let raw = self.as_raw();
        let value = MetadataValue::read(|data| unsafe {
            api::blackmagic_raw_metadata_iterator_get_data(raw, data)
        });
        if unsafe { api::blackmagic_raw_metadata_iterator_next(raw) } < 0 {
            self.done = true;
        }
        Some(value.map(|value| (key, value)))
    }
}
