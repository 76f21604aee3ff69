//! Flat forwarding surface over the vendor interfaces.
//!
//! Every function is one call through a virtual table. Status codes are returned
//! untouched. Text inputs are NUL-terminated UTF-8 and are converted to the platform's
//! native text for the duration of the call; text outputs are copied into [`Buffer`]
//! handles that the caller frees with [`crate::buffer::buffer_release`].
//!
//! With the `capi` feature these functions are exported unmangled so that a non-Rust
//! host can link against the crate directly.
//!
//! # Safety
//!
//! All functions require live object pointers of the named interface and writable
//! out-pointers, exactly as the vendor methods they forward to.

use libc::{c_char, c_void};

use crate::base::{self, IUnknown, Iid, Interface, HRESULT, ULONG};
pub use crate::buffer::{buffer_data, buffer_len, buffer_release};
pub use crate::callback::create_blackmagic_raw_callback;
use crate::buffer::Buffer;
use crate::errors::S_OK;
use crate::formats::variant_type;
use crate::interfaces::*;
use crate::library::ApiLibrary;
use crate::text::{self, NativeText, Platform, RawString};
use crate::vcall;

/// Call `f` with a native string out-slot, then store a copy in `out`.
unsafe fn string_out(
    out: *mut *mut Buffer,
    f: impl FnOnce(*mut RawString) -> HRESULT,
) -> HRESULT {
    let mut raw = Platform::null();
    let result = f(&mut raw);
    let buffer = text::take_native_string(raw);
    if !out.is_null() {
        *out = buffer.map_or(std::ptr::null_mut(), Buffer::into_raw);
    }
    result
}

// ============================================
// Component model
// ============================================

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_unknown_add_ref(obj: *mut IUnknown) -> ULONG {
    base::unknown_add_ref(obj)
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_unknown_release(obj: *mut IUnknown) -> ULONG {
    base::unknown_release(obj)
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_unknown_query_interface(
    obj: *mut IUnknown,
    iid: Iid,
    iface: *mut *mut c_void,
) -> HRESULT {
    base::unknown_query_interface(obj, iid, iface)
}

// ============================================
// Factory and codec
// ============================================

#[cfg(unix)]
fn path_from_c(path: &std::ffi::CStr) -> Option<&std::path::Path> {
    use std::os::unix::ffi::OsStrExt;
    Some(std::path::Path::new(std::ffi::OsStr::from_bytes(path.to_bytes())))
}

#[cfg(not(unix))]
fn path_from_c(path: &std::ffi::CStr) -> Option<&std::path::Path> {
    path.to_str().ok().map(std::path::Path::new)
}

/// Load the vendor library from the directory `path` and create a factory. Returns null
/// if either step fails.
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn create_blackmagic_raw_factory_instance_from_path(
    path: *const c_char,
) -> *mut IBlackmagicRawFactory {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let Some(dir) = path_from_c(std::ffi::CStr::from_ptr(path)) else {
        return std::ptr::null_mut();
    };
    match ApiLibrary::load(dir) {
        Ok(library) => library.create_factory(),
        Err(err) => {
            tracing::debug!(error = %err, "cannot create Blackmagic RAW factory");
            std::ptr::null_mut()
        }
    }
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_factory_create_codec(
    factory: *mut IBlackmagicRawFactory,
    out: *mut *mut IBlackmagicRaw,
) -> HRESULT {
    vcall!(factory, CreateCodec(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_open_clip(
    codec: *mut IBlackmagicRaw,
    file_name: *const c_char,
    out: *mut *mut IBlackmagicRawClip,
) -> HRESULT {
    text::with_native_string(file_name, |file_name| vcall!(codec, OpenClip(file_name, out)))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_set_callback(
    codec: *mut IBlackmagicRaw,
    callback: *mut IBlackmagicRawCallback,
) -> HRESULT {
    vcall!(codec, SetCallback(callback))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_flush_jobs(codec: *mut IBlackmagicRaw) -> HRESULT {
    vcall!(codec, FlushJobs())
}

// ============================================
// Clip
// ============================================

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_width(
    clip: *mut IBlackmagicRawClip,
    out: *mut u32,
) -> HRESULT {
    vcall!(clip, GetWidth(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_height(
    clip: *mut IBlackmagicRawClip,
    out: *mut u32,
) -> HRESULT {
    vcall!(clip, GetHeight(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_frame_rate(
    clip: *mut IBlackmagicRawClip,
    out: *mut f32,
) -> HRESULT {
    vcall!(clip, GetFrameRate(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_frame_count(
    clip: *mut IBlackmagicRawClip,
    out: *mut u64,
) -> HRESULT {
    vcall!(clip, GetFrameCount(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_timecode_for_frame(
    clip: *mut IBlackmagicRawClip,
    frame_index: u64,
    out: *mut *mut Buffer,
) -> HRESULT {
    string_out(out, |raw| vcall!(clip, GetTimecodeForFrame(frame_index, raw)))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_camera_type(
    clip: *mut IBlackmagicRawClip,
    out: *mut *mut Buffer,
) -> HRESULT {
    string_out(out, |raw| vcall!(clip, GetCameraType(raw)))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_metadata_iterator(
    clip: *mut IBlackmagicRawClip,
    iterator: *mut *mut IBlackmagicRawMetadataIterator,
) -> HRESULT {
    vcall!(clip, GetMetadataIterator(iterator))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_metadata(
    clip: *mut IBlackmagicRawClip,
    key: *const c_char,
    value: *mut Variant,
) -> HRESULT {
    text::with_native_string(key, |key| vcall!(clip, GetMetadata(key, value)))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_clone_processing_attributes(
    clip: *mut IBlackmagicRawClip,
    out: *mut *mut IBlackmagicRawClipProcessingAttributes,
) -> HRESULT {
    vcall!(clip, CloneClipProcessingAttributes(out))
}

/// Query the clip for its audio interface. The result owns one reference.
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_get_audio(
    clip: *mut IBlackmagicRawClip,
    out: *mut *mut IBlackmagicRawClipAudio,
) -> HRESULT {
    base::unknown_query_interface(
        IBlackmagicRawClip::as_unknown(clip),
        IBlackmagicRawClipAudio::IID,
        out as *mut *mut c_void,
    )
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_create_job_read_frame(
    clip: *mut IBlackmagicRawClip,
    frame_index: u64,
    job: *mut *mut IBlackmagicRawJob,
) -> HRESULT {
    vcall!(clip, CreateJobReadFrame(frame_index, job))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_create_job_trim(
    clip: *mut IBlackmagicRawClip,
    file_name: *const c_char,
    frame_index: u64,
    frame_count: u64,
    clip_processing_attributes: *mut IBlackmagicRawClipProcessingAttributes,
    frame_processing_attributes: *mut IBlackmagicRawFrameProcessingAttributes,
    job: *mut *mut IBlackmagicRawJob,
) -> HRESULT {
    text::with_native_string(file_name, |file_name| {
        vcall!(
            clip,
            CreateJobTrim(
                file_name,
                frame_index,
                frame_count,
                clip_processing_attributes,
                frame_processing_attributes,
                job,
            )
        )
    })
}

// ============================================
// Clip audio
// ============================================

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_audio_get_format(
    audio: *mut IBlackmagicRawClipAudio,
    out: *mut u32,
) -> HRESULT {
    vcall!(audio, GetAudioFormat(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_audio_get_bit_depth(
    audio: *mut IBlackmagicRawClipAudio,
    out: *mut u32,
) -> HRESULT {
    vcall!(audio, GetAudioBitDepth(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_audio_get_channel_count(
    audio: *mut IBlackmagicRawClipAudio,
    out: *mut u32,
) -> HRESULT {
    vcall!(audio, GetAudioChannelCount(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_audio_get_sample_rate(
    audio: *mut IBlackmagicRawClipAudio,
    out: *mut u32,
) -> HRESULT {
    vcall!(audio, GetAudioSampleRate(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_audio_get_sample_count(
    audio: *mut IBlackmagicRawClipAudio,
    out: *mut u64,
) -> HRESULT {
    vcall!(audio, GetAudioSampleCount(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_clip_audio_get_samples(
    audio: *mut IBlackmagicRawClipAudio,
    sample_frame_index: i64,
    buffer: *mut c_void,
    buffer_size_bytes: u32,
    max_sample_count: u32,
    samples_read: *mut u32,
    bytes_read: *mut u32,
) -> HRESULT {
    vcall!(
        audio,
        GetAudioSamples(
            sample_frame_index,
            buffer,
            buffer_size_bytes,
            max_sample_count,
            samples_read,
            bytes_read,
        )
    )
}

// ============================================
// Metadata
// ============================================

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_metadata_iterator_next(
    it: *mut IBlackmagicRawMetadataIterator,
) -> HRESULT {
    vcall!(it, Next())
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_metadata_iterator_get_key(
    it: *mut IBlackmagicRawMetadataIterator,
    key: *mut *mut Buffer,
) -> HRESULT {
    string_out(key, |raw| vcall!(it, GetKey(raw)))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_metadata_iterator_get_data(
    it: *mut IBlackmagicRawMetadataIterator,
    data: *mut Variant,
) -> HRESULT {
    vcall!(it, GetData(data))
}

/// Copy the string held by a string-typed variant. Other variants yield null.
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_variant_get_string(
    variant: *const Variant,
    out: *mut *mut Buffer,
) {
    if out.is_null() {
        return;
    }
    *out = match variant.as_ref() {
        Some(v) if v.vt == variant_type::STRING => text::copy_from_native_string(v.value.string_val)
            .map_or(std::ptr::null_mut(), Buffer::into_raw),
        _ => std::ptr::null_mut(),
    };
}

/// Free whatever the vendor allocated for a variant and reset it to empty.
#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_variant_clear(variant: *mut Variant) -> HRESULT {
    if variant.is_null() {
        return S_OK;
    }
    let result = match ApiLibrary::get() {
        Some(library) => library.variant_clear(variant),
        None => S_OK,
    };
    *variant = Variant::default();
    result
}

// ============================================
// Job
// ============================================

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_job_submit(job: *mut IBlackmagicRawJob) -> HRESULT {
    vcall!(job, Submit())
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_job_abort(job: *mut IBlackmagicRawJob) -> HRESULT {
    vcall!(job, Abort())
}

// ============================================
// Frame
// ============================================

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_frame_get_frame_index(
    frame: *mut IBlackmagicRawFrame,
    out: *mut u64,
) -> HRESULT {
    vcall!(frame, GetFrameIndex(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_frame_get_timecode(
    frame: *mut IBlackmagicRawFrame,
    out: *mut *mut Buffer,
) -> HRESULT {
    string_out(out, |raw| vcall!(frame, GetTimecode(raw)))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_frame_get_metadata_iterator(
    frame: *mut IBlackmagicRawFrame,
    iterator: *mut *mut IBlackmagicRawMetadataIterator,
) -> HRESULT {
    vcall!(frame, GetMetadataIterator(iterator))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_frame_set_resource_format(
    frame: *mut IBlackmagicRawFrame,
    format: u32,
) -> HRESULT {
    vcall!(frame, SetResourceFormat(format))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_frame_get_resource_format(
    frame: *mut IBlackmagicRawFrame,
    out: *mut u32,
) -> HRESULT {
    vcall!(frame, GetResourceFormat(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_frame_clone_processing_attributes(
    frame: *mut IBlackmagicRawFrame,
    out: *mut *mut IBlackmagicRawFrameProcessingAttributes,
) -> HRESULT {
    vcall!(frame, CloneFrameProcessingAttributes(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_frame_create_job_decode_and_process_frame(
    frame: *mut IBlackmagicRawFrame,
    clip_processing_attributes: *mut IBlackmagicRawClipProcessingAttributes,
    frame_processing_attributes: *mut IBlackmagicRawFrameProcessingAttributes,
    job: *mut *mut IBlackmagicRawJob,
) -> HRESULT {
    vcall!(
        frame,
        CreateJobDecodeAndProcessFrame(clip_processing_attributes, frame_processing_attributes, job)
    )
}

// ============================================
// Processed image
// ============================================

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_processed_image_get_width(
    img: *mut IBlackmagicRawProcessedImage,
    out: *mut u32,
) -> HRESULT {
    vcall!(img, GetWidth(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_processed_image_get_height(
    img: *mut IBlackmagicRawProcessedImage,
    out: *mut u32,
) -> HRESULT {
    vcall!(img, GetHeight(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_processed_image_get_resource_size_bytes(
    img: *mut IBlackmagicRawProcessedImage,
    out: *mut u32,
) -> HRESULT {
    vcall!(img, GetResourceSizeBytes(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_processed_image_get_resource_format(
    img: *mut IBlackmagicRawProcessedImage,
    out: *mut u32,
) -> HRESULT {
    vcall!(img, GetResourceFormat(out))
}

#[cfg_attr(feature = "capi", no_mangle)]
pub unsafe extern "C" fn blackmagic_raw_processed_image_get_resource(
    img: *mut IBlackmagicRawProcessedImage,
    bytes: *mut *mut c_void,
) -> HRESULT {
    vcall!(img, GetResource(bytes))
}
