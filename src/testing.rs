//! In-process stand-ins for vendor objects, used by the unit tests.
//!
//! Every mock is a heap object laid out like a real one: a vtable pointer first, then an
//! atomic reference count, then its state. A [`MockHandle`] owns one reference, so a
//! test can hand extra references to the code under test and watch the count.

#![allow(dead_code)]

use std::ffi::CStr;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use libc::c_void;

use crate::base::{IUnknown, IUnknownVtbl, Iid, Interface, IID_IUnknown, HRESULT, ULONG};
use crate::buffer::Buffer;
use crate::errors::{E_FAIL, E_INVALIDARG, E_NOINTERFACE, E_NOTIMPL, E_POINTER, S_OK};
use crate::formats::{variant_type, ResourceFormat};
use crate::interfaces::*;
use crate::text::{self, RawString};
use crate::vcall;

/// Status the mock iterator returns from `GetKey` once it is exhausted.
pub const END_OF_ITERATION: HRESULT = E_FAIL;

pub trait MockState: Sized + Send + Sync + 'static {
    type Interface: Interface;

    fn vtbl() -> *const c_void;

    /// Interfaces other than `Self::Interface` this object can be queried for. The
    /// returned pointer must already carry a new reference.
    fn query(&self, _iid: Iid) -> Option<*mut c_void> {
        None
    }
}

#[repr(C)]
pub struct Mock<S> {
    vtbl: *const c_void,
    refs: AtomicU32,
    state: S,
}

/// Allocate a mock with one reference and give that reference to the caller.
pub fn into_raw<S: MockState>(state: S) -> *mut S::Interface {
    Box::into_raw(Box::new(Mock {
        vtbl: S::vtbl(),
        refs: AtomicU32::new(1),
        state,
    })) as *mut S::Interface
}

/// State of the mock behind `this`.
///
/// # Safety
///
/// `this` must point to a live `Mock<S>`.
pub unsafe fn state<'a, S, T>(this: *mut T) -> &'a S {
    &(*(this as *const Mock<S>)).state
}

unsafe extern "C" fn query_interface<S: MockState>(
    this: *mut IUnknown,
    iid: Iid,
    out: *mut *mut c_void,
) -> HRESULT {
    if out.is_null() {
        return E_POINTER;
    }
    if iid == IID_IUnknown || iid == <S::Interface as Interface>::IID {
        add_ref::<S>(this);
        *out = this as *mut c_void;
        return S_OK;
    }
    match state::<S, _>(this).query(iid) {
        Some(other) => {
            *out = other;
            S_OK
        }
        None => {
            *out = std::ptr::null_mut();
            E_NOINTERFACE
        }
    }
}

unsafe extern "C" fn add_ref<S: MockState>(this: *mut IUnknown) -> ULONG {
    (*(this as *const Mock<S>)).refs.fetch_add(1, Ordering::SeqCst) + 1
}

unsafe extern "C" fn release<S: MockState>(this: *mut IUnknown) -> ULONG {
    let previous = (*(this as *const Mock<S>)).refs.fetch_sub(1, Ordering::SeqCst);
    assert!(previous > 0, "mock released more often than referenced");
    if previous == 1 {
        drop(Box::from_raw(this as *mut Mock<S>));
    }
    previous - 1
}

pub const fn unknown_vtbl<S: MockState>() -> IUnknownVtbl {
    IUnknownVtbl {
        QueryInterface: query_interface::<S>,
        AddRef: add_ref::<S>,
        Release: release::<S>,
    }
}

/// Test-side owner of one reference to a mock.
pub struct MockHandle<S: MockState> {
    ptr: NonNull<Mock<S>>,
}

impl<S: MockState> MockHandle<S> {
    pub fn wrap(state: S) -> Self {
        let raw = into_raw(state) as *mut Mock<S>;
        Self {
            ptr: NonNull::new(raw).unwrap(),
        }
    }

    pub fn as_ptr(&self) -> *mut S::Interface {
        self.ptr.as_ptr() as *mut S::Interface
    }

    /// Add a reference and return the pointer, for code that takes ownership of one.
    pub fn new_ref(&self) -> *mut S::Interface {
        unsafe { add_ref::<S>(self.ptr.as_ptr() as *mut IUnknown) };
        self.as_ptr()
    }

    pub fn refs(&self) -> u32 {
        unsafe { self.ptr.as_ref() }.refs.load(Ordering::SeqCst)
    }
}

impl<S: MockState> std::ops::Deref for MockHandle<S> {
    type Target = S;

    fn deref(&self) -> &S {
        unsafe { &self.ptr.as_ref().state }
    }
}

impl<S: MockState> Drop for MockHandle<S> {
    fn drop(&mut self) {
        unsafe { release::<S>(self.ptr.as_ptr() as *mut IUnknown) };
    }
}

// ============================================
// Native strings handed out by mocks
// ============================================

/// Native string for an out-parameter. The C-string backend lends the buffer's bytes;
/// the CF backend creates a string the caller releases.
#[cfg(not(target_os = "macos"))]
fn native_out(text: &Buffer) -> RawString {
    text.as_ptr()
}

#[cfg(target_os = "macos")]
fn native_out(text: &Buffer) -> RawString {
    use crate::text::{NativeText, Platform};
    use core_foundation::base::TCFType;

    match Platform::to_native_string(text) {
        Some(string) => {
            let raw = string.as_concrete_TypeRef();
            std::mem::forget(string);
            raw
        }
        None => std::ptr::null(),
    }
}

fn buffer(text: &str) -> Buffer {
    Buffer::new(text).unwrap()
}

/// Tracks the lifetime and calls of a mock job.
#[derive(Default)]
pub struct JobLog {
    pub description: String,
    pub submitted: AtomicBool,
    pub aborted: AtomicBool,
    pub released: AtomicBool,
}

/// A job created by a mock, with the pointer the test can feed back into callbacks.
#[derive(Clone)]
pub struct JobRecord {
    pub ptr: usize,
    pub log: Arc<JobLog>,
}

impl JobRecord {
    pub fn as_ptr(&self) -> *mut IBlackmagicRawJob {
        self.ptr as *mut IBlackmagicRawJob
    }

    /// Drop the reference the mock codec took on submit, as the codec does once the
    /// completion event has been delivered or the queue is torn down.
    pub fn retire(&self) {
        assert!(self.log.submitted.load(Ordering::SeqCst), "job was never queued");
        unsafe { release::<JobState>(self.as_ptr().cast()) };
    }
}

fn create_job(
    description: String,
    jobs: &Mutex<Vec<JobRecord>>,
    out: *mut *mut IBlackmagicRawJob,
) -> HRESULT {
    if out.is_null() {
        return E_POINTER;
    }
    let log = Arc::new(JobLog {
        description,
        ..Default::default()
    });
    let job = into_raw(JobState { log: log.clone() });
    jobs.lock().unwrap().push(JobRecord {
        ptr: job as usize,
        log,
    });
    unsafe { *out = job };
    S_OK
}

// ============================================
// Processed image
// ============================================

pub struct ImageState {
    pub width: u32,
    pub height: u32,
    pub format: ResourceFormat,
    pixels: Vec<u8>,
}

impl ImageState {
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

pub type MockProcessedImage = MockHandle<ImageState>;

impl MockHandle<ImageState> {
    /// An 8-bit BGRA image filled with `fill`.
    pub fn new(width: u32, height: u32, fill: u8) -> Self {
        Self::wrap(ImageState {
            width,
            height,
            format: ResourceFormat::BGRA_U8,
            pixels: vec![fill; (width * height * 4) as usize],
        })
    }
}

impl MockState for ImageState {
    type Interface = IBlackmagicRawProcessedImage;

    fn vtbl() -> *const c_void {
        &IMAGE_VTBL as *const _ as *const c_void
    }
}

static IMAGE_VTBL: IBlackmagicRawProcessedImageVtbl = IBlackmagicRawProcessedImageVtbl {
    base: unknown_vtbl::<ImageState>(),
    GetWidth: image_get_width,
    GetHeight: image_get_height,
    GetResource: image_get_resource,
    GetResourceType: image_get_resource_type,
    GetResourceFormat: image_get_resource_format,
    GetResourceSizeBytes: image_get_resource_size_bytes,
    GetResourceContext: None,
};

unsafe extern "C" fn image_get_width(this: *mut IBlackmagicRawProcessedImage, out: *mut u32) -> HRESULT {
    *out = state::<ImageState, _>(this).width;
    S_OK
}

unsafe extern "C" fn image_get_height(this: *mut IBlackmagicRawProcessedImage, out: *mut u32) -> HRESULT {
    *out = state::<ImageState, _>(this).height;
    S_OK
}

unsafe extern "C" fn image_get_resource(
    this: *mut IBlackmagicRawProcessedImage,
    out: *mut *mut c_void,
) -> HRESULT {
    *out = state::<ImageState, _>(this).pixels.as_ptr() as *mut c_void;
    S_OK
}

unsafe extern "C" fn image_get_resource_type(
    _this: *mut IBlackmagicRawProcessedImage,
    out: *mut u32,
) -> HRESULT {
    // CPU memory
    *out = u32::from_be_bytes(*b"cpub");
    S_OK
}

unsafe extern "C" fn image_get_resource_format(
    this: *mut IBlackmagicRawProcessedImage,
    out: *mut u32,
) -> HRESULT {
    *out = state::<ImageState, _>(this).format.0;
    S_OK
}

unsafe extern "C" fn image_get_resource_size_bytes(
    this: *mut IBlackmagicRawProcessedImage,
    out: *mut u32,
) -> HRESULT {
    *out = state::<ImageState, _>(this).pixels.len() as u32;
    S_OK
}

// ============================================
// Metadata iterator
// ============================================

#[derive(Clone, Debug)]
pub enum MockValue {
    U8(u8),
    S16(i16),
    U16(u16),
    S32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
    Text(String),
    Array,
}

#[derive(Clone, Debug)]
pub struct MetadataEntry {
    pub key: String,
    pub value: MockValue,
}

impl MetadataEntry {
    pub fn string(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: MockValue::Text(value.to_string()),
        }
    }

    pub fn u32(key: &str, value: u32) -> Self {
        Self {
            key: key.to_string(),
            value: MockValue::U32(value),
        }
    }

    pub fn f32(key: &str, value: f32) -> Self {
        Self {
            key: key.to_string(),
            value: MockValue::F32(value),
        }
    }

    pub fn value(key: &str, value: MockValue) -> Self {
        Self {
            key: key.to_string(),
            value,
        }
    }
}

/// An entry with its text already in the form handed across the vendor ABI.
struct StoredEntry {
    key: Buffer,
    value: MockValue,
    text: Option<Buffer>,
}

impl StoredEntry {
    fn new(entry: &MetadataEntry) -> Self {
        let text = match &entry.value {
            MockValue::Text(text) => Some(buffer(text)),
            _ => None,
        };
        Self {
            key: buffer(&entry.key),
            value: entry.value.clone(),
            text,
        }
    }

    fn to_variant(&self) -> Variant {
        let (vt, value) = match &self.value {
            MockValue::U8(v) => (variant_type::U8, VariantValue { u8_val: *v }),
            MockValue::S16(v) => (variant_type::S16, VariantValue { i16_val: *v }),
            MockValue::U16(v) => (variant_type::U16, VariantValue { u16_val: *v }),
            MockValue::S32(v) => (variant_type::S32, VariantValue { i32_val: *v }),
            MockValue::U32(v) => (variant_type::U32, VariantValue { u32_val: *v }),
            MockValue::F32(v) => (variant_type::FLOAT32, VariantValue { f32_val: *v }),
            MockValue::F64(v) => (variant_type::FLOAT64, VariantValue { f64_val: *v }),
            MockValue::Text(_) => (
                variant_type::STRING,
                VariantValue {
                    string_val: self.text.as_ref().map_or(std::ptr::null(), native_out),
                },
            ),
            MockValue::Array => (
                variant_type::SAFE_ARRAY,
                VariantValue {
                    array_val: std::ptr::null_mut(),
                },
            ),
        };
        Variant { vt, value }
    }
}

pub struct IteratorState {
    entries: Vec<StoredEntry>,
    position: AtomicUsize,
}

impl IteratorState {
    fn new(entries: &[MetadataEntry]) -> Self {
        Self {
            entries: entries.iter().map(StoredEntry::new).collect(),
            position: AtomicUsize::new(0),
        }
    }

    fn current(&self) -> Option<&StoredEntry> {
        self.entries.get(self.position.load(Ordering::SeqCst))
    }
}

pub type MockMetadataIterator = MockHandle<IteratorState>;

impl MockHandle<IteratorState> {
    pub fn new(entries: Vec<MetadataEntry>) -> Self {
        Self::wrap(IteratorState::new(&entries))
    }
}

impl MockState for IteratorState {
    type Interface = IBlackmagicRawMetadataIterator;

    fn vtbl() -> *const c_void {
        &ITERATOR_VTBL as *const _ as *const c_void
    }
}

static ITERATOR_VTBL: IBlackmagicRawMetadataIteratorVtbl = IBlackmagicRawMetadataIteratorVtbl {
    base: unknown_vtbl::<IteratorState>(),
    Next: iterator_next,
    GetKey: iterator_get_key,
    GetData: iterator_get_data,
};

unsafe extern "C" fn iterator_next(this: *mut IBlackmagicRawMetadataIterator) -> HRESULT {
    let it = state::<IteratorState, _>(this);
    let _ = it
        .position
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |p| {
            (p < it.entries.len()).then_some(p + 1)
        });
    S_OK
}

unsafe extern "C" fn iterator_get_key(
    this: *mut IBlackmagicRawMetadataIterator,
    key: *mut RawString,
) -> HRESULT {
    match state::<IteratorState, _>(this).current() {
        Some(entry) => {
            *key = native_out(&entry.key);
            S_OK
        }
        None => END_OF_ITERATION,
    }
}

unsafe extern "C" fn iterator_get_data(
    this: *mut IBlackmagicRawMetadataIterator,
    data: *mut Variant,
) -> HRESULT {
    match state::<IteratorState, _>(this).current() {
        Some(entry) => {
            *data = entry.to_variant();
            S_OK
        }
        None => END_OF_ITERATION,
    }
}

// ============================================
// Job
// ============================================

pub struct JobState {
    log: Arc<JobLog>,
}

impl Drop for JobState {
    fn drop(&mut self) {
        self.log.released.store(true, Ordering::SeqCst);
    }
}

impl MockState for JobState {
    type Interface = IBlackmagicRawJob;

    fn vtbl() -> *const c_void {
        &JOB_VTBL as *const _ as *const c_void
    }
}

static JOB_VTBL: IBlackmagicRawJobVtbl = IBlackmagicRawJobVtbl {
    base: unknown_vtbl::<JobState>(),
    Submit: job_submit,
    Abort: job_abort,
    SetUserData: job_set_user_data,
    GetUserData: job_get_user_data,
};

/// A queued job is held by the codec until its completion has been delivered.
unsafe extern "C" fn job_submit(this: *mut IBlackmagicRawJob) -> HRESULT {
    let log = &state::<JobState, _>(this).log;
    if log.submitted.swap(true, Ordering::SeqCst) {
        return E_FAIL;
    }
    add_ref::<JobState>(this.cast());
    S_OK
}

unsafe extern "C" fn job_abort(this: *mut IBlackmagicRawJob) -> HRESULT {
    state::<JobState, _>(this).log.aborted.store(true, Ordering::SeqCst);
    S_OK
}

unsafe extern "C" fn job_set_user_data(_this: *mut IBlackmagicRawJob, _data: *mut c_void) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn job_get_user_data(
    _this: *mut IBlackmagicRawJob,
    _data: *mut *mut c_void,
) -> HRESULT {
    E_NOTIMPL
}

// ============================================
// Processing attributes
// ============================================

pub struct ClipAttributesState;

impl MockState for ClipAttributesState {
    type Interface = IBlackmagicRawClipProcessingAttributes;

    fn vtbl() -> *const c_void {
        &CLIP_ATTRIBUTES_VTBL as *const _ as *const c_void
    }
}

static CLIP_ATTRIBUTES_VTBL: IBlackmagicRawClipProcessingAttributesVtbl =
    IBlackmagicRawClipProcessingAttributesVtbl {
        base: unknown_vtbl::<ClipAttributesState>(),
    };

pub struct FrameAttributesState;

impl MockState for FrameAttributesState {
    type Interface = IBlackmagicRawFrameProcessingAttributes;

    fn vtbl() -> *const c_void {
        &FRAME_ATTRIBUTES_VTBL as *const _ as *const c_void
    }
}

static FRAME_ATTRIBUTES_VTBL: IBlackmagicRawFrameProcessingAttributesVtbl =
    IBlackmagicRawFrameProcessingAttributesVtbl {
        base: unknown_vtbl::<FrameAttributesState>(),
    };

// ============================================
// Clip audio
// ============================================

pub struct AudioState {
    pub channel_count: u32,
    pub sample_rate: u32,
    pub sample_count: u64,
    pub bit_depth: u32,
}

pub type MockClipAudio = MockHandle<AudioState>;

impl MockHandle<AudioState> {
    pub fn new(channel_count: u32, sample_rate: u32, sample_count: u64) -> Self {
        Self::wrap(AudioState {
            channel_count,
            sample_rate,
            sample_count,
            bit_depth: 24,
        })
    }
}

impl MockState for AudioState {
    type Interface = IBlackmagicRawClipAudio;

    fn vtbl() -> *const c_void {
        &AUDIO_VTBL as *const _ as *const c_void
    }
}

static AUDIO_VTBL: IBlackmagicRawClipAudioVtbl = IBlackmagicRawClipAudioVtbl {
    base: unknown_vtbl::<AudioState>(),
    GetAudioFormat: audio_get_format,
    GetAudioBitDepth: audio_get_bit_depth,
    GetAudioChannelCount: audio_get_channel_count,
    GetAudioSampleRate: audio_get_sample_rate,
    GetAudioSampleCount: audio_get_sample_count,
    GetAudioSamples: audio_get_samples,
};

unsafe extern "C" fn audio_get_format(_this: *mut IBlackmagicRawClipAudio, out: *mut u32) -> HRESULT {
    // PCM little endian
    *out = u32::from_be_bytes(*b"pcml");
    S_OK
}

unsafe extern "C" fn audio_get_bit_depth(this: *mut IBlackmagicRawClipAudio, out: *mut u32) -> HRESULT {
    *out = state::<AudioState, _>(this).bit_depth;
    S_OK
}

unsafe extern "C" fn audio_get_channel_count(this: *mut IBlackmagicRawClipAudio, out: *mut u32) -> HRESULT {
    *out = state::<AudioState, _>(this).channel_count;
    S_OK
}

unsafe extern "C" fn audio_get_sample_rate(this: *mut IBlackmagicRawClipAudio, out: *mut u32) -> HRESULT {
    *out = state::<AudioState, _>(this).sample_rate;
    S_OK
}

unsafe extern "C" fn audio_get_sample_count(this: *mut IBlackmagicRawClipAudio, out: *mut u64) -> HRESULT {
    *out = state::<AudioState, _>(this).sample_count;
    S_OK
}

/// Fills the buffer with the low byte of each sample frame index.
unsafe extern "C" fn audio_get_samples(
    this: *mut IBlackmagicRawClipAudio,
    sample_frame_index: i64,
    buffer: *mut c_void,
    buffer_size_bytes: u32,
    max_sample_count: u32,
    samples_read: *mut u32,
    bytes_read: *mut u32,
) -> HRESULT {
    let audio = state::<AudioState, _>(this);
    let frame_bytes = audio.channel_count * audio.bit_depth / 8;
    if sample_frame_index < 0 || buffer.is_null() || frame_bytes == 0 {
        return E_INVALIDARG;
    }
    let remaining = audio.sample_count.saturating_sub(sample_frame_index as u64);
    let count = (max_sample_count as u64)
        .min(remaining)
        .min((buffer_size_bytes / frame_bytes) as u64) as u32;

    let out = std::slice::from_raw_parts_mut(buffer as *mut u8, (count * frame_bytes) as usize);
    for (i, frame) in out.chunks_mut(frame_bytes as usize).enumerate() {
        frame.fill((sample_frame_index as u64 + i as u64) as u8);
    }
    if !samples_read.is_null() {
        *samples_read = count;
    }
    if !bytes_read.is_null() {
        *bytes_read = count * frame_bytes;
    }
    S_OK
}

// ============================================
// Frame
// ============================================

pub struct FrameState {
    pub index: u64,
    pub format: AtomicU32,
    timecode: Buffer,
    pub jobs: Mutex<Vec<JobRecord>>,
}

pub type MockFrame = MockHandle<FrameState>;

impl MockHandle<FrameState> {
    pub fn new(index: u64) -> Self {
        Self::wrap(FrameState {
            index,
            format: AtomicU32::new(ResourceFormat::RGBA_U8.0),
            timecode: buffer(&format!("01:00:00:{:02}", index % 24)),
            jobs: Mutex::new(Vec::new()),
        })
    }

    pub fn last_job(&self) -> JobRecord {
        self.jobs.lock().unwrap().last().cloned().unwrap()
    }
}

impl MockState for FrameState {
    type Interface = IBlackmagicRawFrame;

    fn vtbl() -> *const c_void {
        &FRAME_VTBL as *const _ as *const c_void
    }
}

static FRAME_VTBL: IBlackmagicRawFrameVtbl = IBlackmagicRawFrameVtbl {
    base: unknown_vtbl::<FrameState>(),
    GetFrameIndex: frame_get_frame_index,
    GetTimecode: frame_get_timecode,
    GetMetadataIterator: frame_get_metadata_iterator,
    GetMetadata: frame_get_metadata,
    SetMetadata: frame_set_metadata,
    CloneFrameProcessingAttributes: frame_clone_processing_attributes,
    SetResolutionScale: frame_set_resolution_scale,
    GetResolutionScale: frame_get_resolution_scale,
    SetResourceFormat: frame_set_resource_format,
    GetResourceFormat: frame_get_resource_format,
    CreateJobDecodeAndProcessFrame: frame_create_job_decode_and_process_frame,
};

unsafe extern "C" fn frame_get_frame_index(this: *mut IBlackmagicRawFrame, out: *mut u64) -> HRESULT {
    *out = state::<FrameState, _>(this).index;
    S_OK
}

unsafe extern "C" fn frame_get_timecode(this: *mut IBlackmagicRawFrame, out: *mut RawString) -> HRESULT {
    *out = native_out(&state::<FrameState, _>(this).timecode);
    S_OK
}

unsafe extern "C" fn frame_get_metadata_iterator(
    this: *mut IBlackmagicRawFrame,
    out: *mut *mut IBlackmagicRawMetadataIterator,
) -> HRESULT {
    let frame = state::<FrameState, _>(this);
    *out = into_raw(IteratorState::new(&[
        MetadataEntry::value("frame_index", MockValue::U32(frame.index as u32)),
        MetadataEntry::f32("white_balance_kelvin", 5600.0),
    ]));
    S_OK
}

unsafe extern "C" fn frame_get_metadata(
    _this: *mut IBlackmagicRawFrame,
    _key: RawString,
    _value: *mut Variant,
) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn frame_set_metadata(
    _this: *mut IBlackmagicRawFrame,
    _key: RawString,
    _value: *mut Variant,
) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn frame_clone_processing_attributes(
    _this: *mut IBlackmagicRawFrame,
    out: *mut *mut IBlackmagicRawFrameProcessingAttributes,
) -> HRESULT {
    *out = into_raw(FrameAttributesState);
    S_OK
}

unsafe extern "C" fn frame_set_resolution_scale(_this: *mut IBlackmagicRawFrame, _scale: u32) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn frame_get_resolution_scale(_this: *mut IBlackmagicRawFrame, _scale: *mut u32) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn frame_set_resource_format(this: *mut IBlackmagicRawFrame, format: u32) -> HRESULT {
    if ResourceFormat(format).to_fourcc_string().contains('?') {
        return E_INVALIDARG;
    }
    state::<FrameState, _>(this).format.store(format, Ordering::SeqCst);
    S_OK
}

unsafe extern "C" fn frame_get_resource_format(this: *mut IBlackmagicRawFrame, out: *mut u32) -> HRESULT {
    *out = state::<FrameState, _>(this).format.load(Ordering::SeqCst);
    S_OK
}

unsafe extern "C" fn frame_create_job_decode_and_process_frame(
    this: *mut IBlackmagicRawFrame,
    clip_processing_attributes: *mut IBlackmagicRawClipProcessingAttributes,
    frame_processing_attributes: *mut IBlackmagicRawFrameProcessingAttributes,
    job: *mut *mut IBlackmagicRawJob,
) -> HRESULT {
    let frame = state::<FrameState, _>(this);
    let description = format!(
        "decode {} clip_attributes={} frame_attributes={}",
        frame.index,
        !clip_processing_attributes.is_null(),
        !frame_processing_attributes.is_null()
    );
    create_job(description, &frame.jobs, job)
}

// ============================================
// Clip
// ============================================

pub struct ClipState {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f32,
    pub frame_count: u64,
    camera_type: Buffer,
    metadata: Vec<MetadataEntry>,
    stored: Vec<StoredEntry>,
    timecodes: Mutex<Vec<Buffer>>,
    audio: Option<MockClipAudio>,
    pub jobs: Mutex<Vec<JobRecord>>,
}

impl ClipState {
    pub fn new(metadata: Vec<MetadataEntry>, audio: Option<MockClipAudio>) -> Self {
        Self {
            width: 4096,
            height: 2160,
            frame_rate: 24.0,
            frame_count: 48,
            camera_type: buffer("Blackmagic URSA Mini Pro 12K"),
            stored: metadata.iter().map(StoredEntry::new).collect(),
            metadata,
            timecodes: Mutex::new(Vec::new()),
            audio,
            jobs: Mutex::new(Vec::new()),
        }
    }
}

pub type MockClip = MockHandle<ClipState>;

impl MockHandle<ClipState> {
    pub fn new(metadata: Vec<MetadataEntry>, audio: Option<MockClipAudio>) -> Self {
        Self::wrap(ClipState::new(metadata, audio))
    }

    pub fn last_job(&self) -> JobRecord {
        self.jobs.lock().unwrap().last().cloned().unwrap()
    }
}

// The mock never touches its clip audio from more than one thread at a time.
unsafe impl Send for ClipState {}
unsafe impl Sync for ClipState {}

impl MockState for ClipState {
    type Interface = IBlackmagicRawClip;

    fn vtbl() -> *const c_void {
        &CLIP_VTBL as *const _ as *const c_void
    }

    fn query(&self, iid: Iid) -> Option<*mut c_void> {
        match &self.audio {
            Some(audio) if iid == IBlackmagicRawClipAudio::IID => Some(audio.new_ref() as *mut c_void),
            _ => None,
        }
    }
}

static CLIP_VTBL: IBlackmagicRawClipVtbl = IBlackmagicRawClipVtbl {
    base: unknown_vtbl::<ClipState>(),
    GetWidth: clip_get_width,
    GetHeight: clip_get_height,
    GetFrameRate: clip_get_frame_rate,
    GetFrameCount: clip_get_frame_count,
    GetTimecodeForFrame: clip_get_timecode_for_frame,
    GetMetadataIterator: clip_get_metadata_iterator,
    GetMetadata: clip_get_metadata,
    SetMetadata: clip_set_metadata,
    GetCameraType: clip_get_camera_type,
    CloneClipProcessingAttributes: clip_clone_processing_attributes,
    GetMulticardFileCount: clip_get_multicard_file_count,
    IsMulticardFilePresent: clip_is_multicard_file_present,
    GetSidecarFileAttached: clip_get_sidecar_file_attached,
    SaveSidecarFile: clip_save_sidecar_file,
    ReloadSidecarFile: clip_reload_sidecar_file,
    CreateJobReadFrame: clip_create_job_read_frame,
    CreateJobTrim: clip_create_job_trim,
};

unsafe extern "C" fn clip_get_width(this: *mut IBlackmagicRawClip, out: *mut u32) -> HRESULT {
    *out = state::<ClipState, _>(this).width;
    S_OK
}

unsafe extern "C" fn clip_get_height(this: *mut IBlackmagicRawClip, out: *mut u32) -> HRESULT {
    *out = state::<ClipState, _>(this).height;
    S_OK
}

unsafe extern "C" fn clip_get_frame_rate(this: *mut IBlackmagicRawClip, out: *mut f32) -> HRESULT {
    *out = state::<ClipState, _>(this).frame_rate;
    S_OK
}

unsafe extern "C" fn clip_get_frame_count(this: *mut IBlackmagicRawClip, out: *mut u64) -> HRESULT {
    *out = state::<ClipState, _>(this).frame_count;
    S_OK
}

unsafe extern "C" fn clip_get_timecode_for_frame(
    this: *mut IBlackmagicRawClip,
    frame_index: u64,
    out: *mut RawString,
) -> HRESULT {
    let clip = state::<ClipState, _>(this);
    if frame_index >= clip.frame_count {
        return E_INVALIDARG;
    }
    let fps = clip.frame_rate as u64;
    let seconds = frame_index / fps;
    let timecode = buffer(&format!("01:00:{:02}:{:02}", seconds, frame_index % fps));
    *out = native_out(&timecode);
    // Keep the bytes alive for as long as the clip, like the vendor does.
    clip.timecodes.lock().unwrap().push(timecode);
    S_OK
}

unsafe extern "C" fn clip_get_metadata_iterator(
    this: *mut IBlackmagicRawClip,
    out: *mut *mut IBlackmagicRawMetadataIterator,
) -> HRESULT {
    *out = into_raw(IteratorState::new(&state::<ClipState, _>(this).metadata));
    S_OK
}

unsafe extern "C" fn clip_get_metadata(
    this: *mut IBlackmagicRawClip,
    key: RawString,
    value: *mut Variant,
) -> HRESULT {
    let Some(key) = text::copy_from_native_string(key) else {
        return E_POINTER;
    };
    match state::<ClipState, _>(this)
        .stored
        .iter()
        .find(|entry| entry.key == key)
    {
        Some(entry) => {
            *value = entry.to_variant();
            S_OK
        }
        None => E_INVALIDARG,
    }
}

unsafe extern "C" fn clip_set_metadata(
    _this: *mut IBlackmagicRawClip,
    _key: RawString,
    _value: *mut Variant,
) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn clip_get_camera_type(this: *mut IBlackmagicRawClip, out: *mut RawString) -> HRESULT {
    *out = native_out(&state::<ClipState, _>(this).camera_type);
    S_OK
}

unsafe extern "C" fn clip_clone_processing_attributes(
    _this: *mut IBlackmagicRawClip,
    out: *mut *mut IBlackmagicRawClipProcessingAttributes,
) -> HRESULT {
    *out = into_raw(ClipAttributesState);
    S_OK
}

unsafe extern "C" fn clip_get_multicard_file_count(_this: *mut IBlackmagicRawClip, _count: *mut u32) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn clip_is_multicard_file_present(
    _this: *mut IBlackmagicRawClip,
    _index: u32,
    _present: *mut bool,
) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn clip_get_sidecar_file_attached(_this: *mut IBlackmagicRawClip, _attached: *mut bool) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn clip_save_sidecar_file(_this: *mut IBlackmagicRawClip) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn clip_reload_sidecar_file(_this: *mut IBlackmagicRawClip) -> HRESULT {
    E_NOTIMPL
}

unsafe extern "C" fn clip_create_job_read_frame(
    this: *mut IBlackmagicRawClip,
    frame_index: u64,
    job: *mut *mut IBlackmagicRawJob,
) -> HRESULT {
    let clip = state::<ClipState, _>(this);
    if frame_index >= clip.frame_count {
        return E_INVALIDARG;
    }
    create_job(format!("read {frame_index}"), &clip.jobs, job)
}

unsafe extern "C" fn clip_create_job_trim(
    this: *mut IBlackmagicRawClip,
    file_name: RawString,
    frame_index: u64,
    frame_count: u64,
    clip_processing_attributes: *mut IBlackmagicRawClipProcessingAttributes,
    frame_processing_attributes: *mut IBlackmagicRawFrameProcessingAttributes,
    job: *mut *mut IBlackmagicRawJob,
) -> HRESULT {
    let Some(file_name) = text::copy_from_native_string(file_name) else {
        return E_POINTER;
    };
    let description = format!(
        "trim {} {}+{} clip_attributes={} frame_attributes={}",
        file_name,
        frame_index,
        frame_count,
        !clip_processing_attributes.is_null(),
        !frame_processing_attributes.is_null()
    );
    create_job(description, &state::<ClipState, _>(this).jobs, job)
}

// ============================================
// Codec
// ============================================

pub struct CodecState {
    callback: AtomicUsize,
    pub opened: Mutex<Vec<String>>,
    pub flushes: AtomicUsize,
}

pub type MockCodec = MockHandle<CodecState>;

impl MockHandle<CodecState> {
    pub fn new() -> Self {
        Self::wrap(CodecState {
            callback: AtomicUsize::new(0),
            opened: Mutex::new(Vec::new()),
            flushes: AtomicUsize::new(0),
        })
    }
}

impl CodecState {
    /// The installed callback, or null.
    pub fn callback(&self) -> *mut IBlackmagicRawCallback {
        self.callback.load(Ordering::SeqCst) as *mut IBlackmagicRawCallback
    }
}

impl Drop for CodecState {
    fn drop(&mut self) {
        let callback = self.callback();
        if !callback.is_null() {
            unsafe { vcall!(callback, base.Release()) };
        }
    }
}

impl MockState for CodecState {
    type Interface = IBlackmagicRaw;

    fn vtbl() -> *const c_void {
        &CODEC_VTBL as *const _ as *const c_void
    }
}

static CODEC_VTBL: IBlackmagicRawVtbl = IBlackmagicRawVtbl {
    base: unknown_vtbl::<CodecState>(),
    OpenClip: codec_open_clip,
    SetCallback: codec_set_callback,
    PreparePipeline: None,
    PreparePipelineForDevice: None,
    FlushJobs: codec_flush_jobs,
};

unsafe extern "C" fn codec_open_clip(
    this: *mut IBlackmagicRaw,
    file_name: RawString,
    clip: *mut *mut IBlackmagicRawClip,
) -> HRESULT {
    let Some(file_name) = text::copy_from_native_string(file_name) else {
        return E_POINTER;
    };
    let file_name = file_name.to_string_lossy();
    if !file_name.ends_with(".braw") {
        return E_FAIL;
    }
    state::<CodecState, _>(this).opened.lock().unwrap().push(file_name);
    *clip = into_raw(ClipState::new(
        vec![MetadataEntry::string("camera_type", "Blackmagic URSA Mini Pro 12K")],
        None,
    ));
    S_OK
}

unsafe extern "C" fn codec_set_callback(
    this: *mut IBlackmagicRaw,
    callback: *mut IBlackmagicRawCallback,
) -> HRESULT {
    if !callback.is_null() {
        vcall!(callback, base.AddRef());
    }
    let previous = state::<CodecState, _>(this)
        .callback
        .swap(callback as usize, Ordering::SeqCst) as *mut IBlackmagicRawCallback;
    if !previous.is_null() {
        vcall!(previous, base.Release());
    }
    S_OK
}

unsafe extern "C" fn codec_flush_jobs(this: *mut IBlackmagicRaw) -> HRESULT {
    state::<CodecState, _>(this).flushes.fetch_add(1, Ordering::SeqCst);
    S_OK
}

// ============================================
// Factory
// ============================================

pub struct FactoryState {
    pub codecs_created: AtomicUsize,
}

pub type MockFactory = MockHandle<FactoryState>;

impl MockHandle<FactoryState> {
    pub fn new() -> Self {
        Self::wrap(FactoryState {
            codecs_created: AtomicUsize::new(0),
        })
    }
}

impl MockState for FactoryState {
    type Interface = IBlackmagicRawFactory;

    fn vtbl() -> *const c_void {
        &FACTORY_VTBL as *const _ as *const c_void
    }
}

static FACTORY_VTBL: IBlackmagicRawFactoryVtbl = IBlackmagicRawFactoryVtbl {
    base: unknown_vtbl::<FactoryState>(),
    CreateCodec: factory_create_codec,
    CreatePipelineIterator: None,
    CreatePipelineDeviceIterator: None,
};

unsafe extern "C" fn factory_create_codec(
    this: *mut IBlackmagicRawFactory,
    codec: *mut *mut IBlackmagicRaw,
) -> HRESULT {
    state::<FactoryState, _>(this)
        .codecs_created
        .fetch_add(1, Ordering::SeqCst);
    *codec = into_raw(CodecState {
        callback: AtomicUsize::new(0),
        opened: Mutex::new(Vec::new()),
        flushes: AtomicUsize::new(0),
    });
    S_OK
}

/// Read a NUL-terminated string written by code under test.
pub unsafe fn c_str<'a>(ptr: *const libc::c_char) -> &'a str {
    CStr::from_ptr(ptr).to_str().unwrap()
}
