//! Virtual-table layouts of the Blackmagic RAW SDK interfaces.
//!
//! Each interface is a pointer to a `#[repr(C)]` table of `extern "C"` function pointers
//! with `this` as first argument. Slot order follows `BlackmagicRawAPI.h`; slots that
//! belong to the GPU pipeline are kept as untyped placeholders so the layout stays
//! correct without binding them.
//!
//! Interface identifiers are read from `BlackmagicRawAPI.h` at build time; see
//! [`SDK_HEADER`].

use libc::c_void;

use crate::base::{Iid, Interface, IUnknownVtbl, HRESULT};
use crate::text::RawString;

/// Slot that exists in the vendor table but is not bound by this crate.
pub type Reserved = Option<unsafe extern "C" fn()>;

macro_rules! interface {
    ($(#[$meta:meta])* $name:ident, $vtbl:ident, $iid:expr) => {
        $(#[$meta])*
        #[repr(C)]
        pub struct $name {
            pub lpVtbl: *const $vtbl,
        }

        unsafe impl Interface for $name {
            const IID: Iid = $iid;
        }
    };
}

// `IID_*` constants and `SDK_HEADER`, written by the build script from
// `BlackmagicRawAPI.h`. Without the header every identifier is a placeholder and
// `SDK_HEADER` is `None`.
include!(concat!(env!("OUT_DIR"), "/interface_ids.rs"));

/// Opaque vendor array carried by array-typed variants.
#[repr(C)]
pub struct SafeArray {
    _private: [u8; 0],
}

/// Payload of a [`Variant`]; which field is live is given by [`Variant::vt`].
#[repr(C)]
#[derive(Clone, Copy)]
pub union VariantValue {
    pub u8_val: u8,
    pub i16_val: i16,
    pub u16_val: u16,
    pub i32_val: i32,
    pub u32_val: u32,
    pub f32_val: f32,
    pub f64_val: f64,
    pub string_val: RawString,
    pub array_val: *mut SafeArray,
}

/// Tagged value returned by metadata getters.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Variant {
    /// One of [`crate::formats::variant_type`].
    pub vt: u32,
    pub value: VariantValue,
}

impl Default for Variant {
    fn default() -> Self {
        Self {
            vt: crate::formats::variant_type::EMPTY,
            value: VariantValue { f64_val: 0.0 },
        }
    }
}

#[repr(C)]
pub struct IBlackmagicRawFactoryVtbl {
    pub base: IUnknownVtbl,
    pub CreateCodec: unsafe extern "C" fn(
        this: *mut IBlackmagicRawFactory,
        codec: *mut *mut IBlackmagicRaw,
    ) -> HRESULT,
    pub CreatePipelineIterator: Reserved,
    pub CreatePipelineDeviceIterator: Reserved,
}

interface!(
    /// Entry point returned by the loaded library.
    IBlackmagicRawFactory,
    IBlackmagicRawFactoryVtbl,
    IID_IBlackmagicRawFactory
);

#[repr(C)]
pub struct IBlackmagicRawVtbl {
    pub base: IUnknownVtbl,
    pub OpenClip: unsafe extern "C" fn(
        this: *mut IBlackmagicRaw,
        file_name: RawString,
        clip: *mut *mut IBlackmagicRawClip,
    ) -> HRESULT,
    pub SetCallback: unsafe extern "C" fn(
        this: *mut IBlackmagicRaw,
        callback: *mut IBlackmagicRawCallback,
    ) -> HRESULT,
    pub PreparePipeline: Reserved,
    pub PreparePipelineForDevice: Reserved,
    pub FlushJobs: unsafe extern "C" fn(this: *mut IBlackmagicRaw) -> HRESULT,
}

interface!(
    /// The codec: opens clips and delivers job results to its callback.
    IBlackmagicRaw,
    IBlackmagicRawVtbl,
    IID_IBlackmagicRaw
);

#[repr(C)]
pub struct IBlackmagicRawClipVtbl {
    pub base: IUnknownVtbl,
    pub GetWidth: unsafe extern "C" fn(this: *mut IBlackmagicRawClip, width: *mut u32) -> HRESULT,
    pub GetHeight:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClip, height: *mut u32) -> HRESULT,
    pub GetFrameRate:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClip, frame_rate: *mut f32) -> HRESULT,
    pub GetFrameCount:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClip, frame_count: *mut u64) -> HRESULT,
    pub GetTimecodeForFrame: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        frame_index: u64,
        timecode: *mut RawString,
    ) -> HRESULT,
    pub GetMetadataIterator: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        iterator: *mut *mut IBlackmagicRawMetadataIterator,
    ) -> HRESULT,
    pub GetMetadata: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        key: RawString,
        value: *mut Variant,
    ) -> HRESULT,
    pub SetMetadata: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        key: RawString,
        value: *mut Variant,
    ) -> HRESULT,
    pub GetCameraType:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClip, camera_type: *mut RawString) -> HRESULT,
    pub CloneClipProcessingAttributes: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        attributes: *mut *mut IBlackmagicRawClipProcessingAttributes,
    ) -> HRESULT,
    pub GetMulticardFileCount:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClip, count: *mut u32) -> HRESULT,
    pub IsMulticardFilePresent: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        index: u32,
        present: *mut bool,
    ) -> HRESULT,
    pub GetSidecarFileAttached:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClip, attached: *mut bool) -> HRESULT,
    pub SaveSidecarFile: unsafe extern "C" fn(this: *mut IBlackmagicRawClip) -> HRESULT,
    pub ReloadSidecarFile: unsafe extern "C" fn(this: *mut IBlackmagicRawClip) -> HRESULT,
    pub CreateJobReadFrame: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        frame_index: u64,
        job: *mut *mut IBlackmagicRawJob,
    ) -> HRESULT,
    pub CreateJobTrim: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClip,
        file_name: RawString,
        frame_index: u64,
        frame_count: u64,
        clip_processing_attributes: *mut IBlackmagicRawClipProcessingAttributes,
        frame_processing_attributes: *mut IBlackmagicRawFrameProcessingAttributes,
        job: *mut *mut IBlackmagicRawJob,
    ) -> HRESULT,
}

interface!(IBlackmagicRawClip, IBlackmagicRawClipVtbl, IID_IBlackmagicRawClip);

#[repr(C)]
pub struct IBlackmagicRawClipAudioVtbl {
    pub base: IUnknownVtbl,
    pub GetAudioFormat:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClipAudio, format: *mut u32) -> HRESULT,
    pub GetAudioBitDepth:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClipAudio, bit_depth: *mut u32) -> HRESULT,
    pub GetAudioChannelCount:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClipAudio, count: *mut u32) -> HRESULT,
    pub GetAudioSampleRate:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClipAudio, rate: *mut u32) -> HRESULT,
    pub GetAudioSampleCount:
        unsafe extern "C" fn(this: *mut IBlackmagicRawClipAudio, count: *mut u64) -> HRESULT,
    pub GetAudioSamples: unsafe extern "C" fn(
        this: *mut IBlackmagicRawClipAudio,
        sample_frame_index: i64,
        buffer: *mut c_void,
        buffer_size_bytes: u32,
        max_sample_count: u32,
        samples_read: *mut u32,
        bytes_read: *mut u32,
    ) -> HRESULT,
}

interface!(
    /// Audio view of a clip, obtained through `QueryInterface`.
    IBlackmagicRawClipAudio,
    IBlackmagicRawClipAudioVtbl,
    IID_IBlackmagicRawClipAudio
);

#[repr(C)]
pub struct IBlackmagicRawMetadataIteratorVtbl {
    pub base: IUnknownVtbl,
    pub Next: unsafe extern "C" fn(this: *mut IBlackmagicRawMetadataIterator) -> HRESULT,
    pub GetKey: unsafe extern "C" fn(
        this: *mut IBlackmagicRawMetadataIterator,
        key: *mut RawString,
    ) -> HRESULT,
    pub GetData: unsafe extern "C" fn(
        this: *mut IBlackmagicRawMetadataIterator,
        data: *mut Variant,
    ) -> HRESULT,
}

interface!(
    IBlackmagicRawMetadataIterator,
    IBlackmagicRawMetadataIteratorVtbl,
    IID_IBlackmagicRawMetadataIterator
);

#[repr(C)]
pub struct IBlackmagicRawJobVtbl {
    pub base: IUnknownVtbl,
    pub Submit: unsafe extern "C" fn(this: *mut IBlackmagicRawJob) -> HRESULT,
    pub Abort: unsafe extern "C" fn(this: *mut IBlackmagicRawJob) -> HRESULT,
    pub SetUserData:
        unsafe extern "C" fn(this: *mut IBlackmagicRawJob, user_data: *mut c_void) -> HRESULT,
    pub GetUserData:
        unsafe extern "C" fn(this: *mut IBlackmagicRawJob, user_data: *mut *mut c_void) -> HRESULT,
}

interface!(IBlackmagicRawJob, IBlackmagicRawJobVtbl, IID_IBlackmagicRawJob);

#[repr(C)]
pub struct IBlackmagicRawFrameVtbl {
    pub base: IUnknownVtbl,
    pub GetFrameIndex:
        unsafe extern "C" fn(this: *mut IBlackmagicRawFrame, frame_index: *mut u64) -> HRESULT,
    pub GetTimecode:
        unsafe extern "C" fn(this: *mut IBlackmagicRawFrame, timecode: *mut RawString) -> HRESULT,
    pub GetMetadataIterator: unsafe extern "C" fn(
        this: *mut IBlackmagicRawFrame,
        iterator: *mut *mut IBlackmagicRawMetadataIterator,
    ) -> HRESULT,
    pub GetMetadata: unsafe extern "C" fn(
        this: *mut IBlackmagicRawFrame,
        key: RawString,
        value: *mut Variant,
    ) -> HRESULT,
    pub SetMetadata: unsafe extern "C" fn(
        this: *mut IBlackmagicRawFrame,
        key: RawString,
        value: *mut Variant,
    ) -> HRESULT,
    pub CloneFrameProcessingAttributes: unsafe extern "C" fn(
        this: *mut IBlackmagicRawFrame,
        attributes: *mut *mut IBlackmagicRawFrameProcessingAttributes,
    ) -> HRESULT,
    pub SetResolutionScale:
        unsafe extern "C" fn(this: *mut IBlackmagicRawFrame, scale: u32) -> HRESULT,
    pub GetResolutionScale:
        unsafe extern "C" fn(this: *mut IBlackmagicRawFrame, scale: *mut u32) -> HRESULT,
    pub SetResourceFormat:
        unsafe extern "C" fn(this: *mut IBlackmagicRawFrame, format: u32) -> HRESULT,
    pub GetResourceFormat:
        unsafe extern "C" fn(this: *mut IBlackmagicRawFrame, format: *mut u32) -> HRESULT,
    pub CreateJobDecodeAndProcessFrame: unsafe extern "C" fn(
        this: *mut IBlackmagicRawFrame,
        clip_processing_attributes: *mut IBlackmagicRawClipProcessingAttributes,
        frame_processing_attributes: *mut IBlackmagicRawFrameProcessingAttributes,
        job: *mut *mut IBlackmagicRawJob,
    ) -> HRESULT,
}

interface!(IBlackmagicRawFrame, IBlackmagicRawFrameVtbl, IID_IBlackmagicRawFrame);

#[repr(C)]
pub struct IBlackmagicRawProcessedImageVtbl {
    pub base: IUnknownVtbl,
    pub GetWidth:
        unsafe extern "C" fn(this: *mut IBlackmagicRawProcessedImage, width: *mut u32) -> HRESULT,
    pub GetHeight:
        unsafe extern "C" fn(this: *mut IBlackmagicRawProcessedImage, height: *mut u32) -> HRESULT,
    pub GetResource: unsafe extern "C" fn(
        this: *mut IBlackmagicRawProcessedImage,
        resource: *mut *mut c_void,
    ) -> HRESULT,
    pub GetResourceType: unsafe extern "C" fn(
        this: *mut IBlackmagicRawProcessedImage,
        resource_type: *mut u32,
    ) -> HRESULT,
    pub GetResourceFormat:
        unsafe extern "C" fn(this: *mut IBlackmagicRawProcessedImage, format: *mut u32) -> HRESULT,
    pub GetResourceSizeBytes: unsafe extern "C" fn(
        this: *mut IBlackmagicRawProcessedImage,
        size_bytes: *mut u32,
    ) -> HRESULT,
    pub GetResourceContext: Reserved,
}

interface!(
    IBlackmagicRawProcessedImage,
    IBlackmagicRawProcessedImageVtbl,
    IID_IBlackmagicRawProcessedImage
);

/// Only the `IUnknown` slots are bound; attribute editing is not exposed.
#[repr(C)]
pub struct IBlackmagicRawClipProcessingAttributesVtbl {
    pub base: IUnknownVtbl,
}

interface!(
    IBlackmagicRawClipProcessingAttributes,
    IBlackmagicRawClipProcessingAttributesVtbl,
    IID_IBlackmagicRawClipProcessingAttributes
);

/// Only the `IUnknown` slots are bound; attribute editing is not exposed.
#[repr(C)]
pub struct IBlackmagicRawFrameProcessingAttributesVtbl {
    pub base: IUnknownVtbl,
}

interface!(
    IBlackmagicRawFrameProcessingAttributes,
    IBlackmagicRawFrameProcessingAttributesVtbl,
    IID_IBlackmagicRawFrameProcessingAttributes
);

/// Event sink the codec calls from its worker threads.
#[repr(C)]
pub struct IBlackmagicRawCallbackVtbl {
    pub base: IUnknownVtbl,
    pub ReadComplete: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        job: *mut IBlackmagicRawJob,
        result: HRESULT,
        frame: *mut IBlackmagicRawFrame,
    ),
    pub DecodeComplete: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        job: *mut IBlackmagicRawJob,
        result: HRESULT,
    ),
    pub ProcessComplete: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        job: *mut IBlackmagicRawJob,
        result: HRESULT,
        processed_image: *mut IBlackmagicRawProcessedImage,
    ),
    pub TrimProgress: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        job: *mut IBlackmagicRawJob,
        progress: f32,
    ),
    pub TrimComplete: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        job: *mut IBlackmagicRawJob,
        result: HRESULT,
    ),
    pub SidecarMetadataParseWarning: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        clip: *mut IBlackmagicRawClip,
        file_name: RawString,
        line_number: u32,
        info: RawString,
    ),
    pub SidecarMetadataParseError: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        clip: *mut IBlackmagicRawClip,
        file_name: RawString,
        line_number: u32,
        info: RawString,
    ),
    pub PreparePipelineComplete: unsafe extern "C" fn(
        this: *mut IBlackmagicRawCallback,
        user_data: *mut c_void,
        result: HRESULT,
    ),
}

interface!(
    IBlackmagicRawCallback,
    IBlackmagicRawCallbackVtbl,
    IID_IBlackmagicRawCallback
);
