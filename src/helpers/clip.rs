//! Clips, their audio and their processing attributes.

use std::ffi::CString;

use super::{get, get_string, Job, MetadataIterator, MetadataValue};
use crate::api;
use crate::errors::{Result, E_NOINTERFACE};
use crate::interfaces::{
    IBlackmagicRawClip, IBlackmagicRawClipAudio, IBlackmagicRawClipProcessingAttributes,
};

com_wrapper!(
    /// An opened `.braw` clip.
    Clip,
    IBlackmagicRawClip
);

com_wrapper!(
    /// Audio view of a clip.
    ClipAudio,
    IBlackmagicRawClipAudio
);

com_wrapper!(
    /// Clip-level decode settings, passed to decode and trim jobs.
    ClipProcessingAttributes,
    IBlackmagicRawClipProcessingAttributes
);

impl Clip {
    pub fn width(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_clip_get_width(self.as_raw(), out) })
    }

    pub fn height(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_clip_get_height(self.as_raw(), out) })
    }

    pub fn frame_rate(&self) -> Result<f32> {
        get(|out| unsafe { api::blackmagic_raw_clip_get_frame_rate(self.as_raw(), out) })
    }

    pub fn frame_count(&self) -> Result<u64> {
        get(|out| unsafe { api::blackmagic_raw_clip_get_frame_count(self.as_raw(), out) })
    }

    /// SMPTE timecode of a frame, e.g. `01:00:00:12`.
    pub fn timecode_for_frame(&self, frame_index: u64) -> Result<String> {
        get_string("timecode", |out| unsafe {
            api::blackmagic_raw_clip_get_timecode_for_frame(self.as_raw(), frame_index, out)
        })
    }

    pub fn camera_type(&self) -> Result<String> {
        get_string("camera type", |out| unsafe {
            api::blackmagic_raw_clip_get_camera_type(self.as_raw(), out)
        })
    }

    /// Look up one clip metadata entry by key.
    pub fn metadata(&self, key: &str) -> Result<MetadataValue> {
        let key = CString::new(key)?;
        MetadataValue::read(|value| unsafe {
            api::blackmagic_raw_clip_get_metadata(self.as_raw(), key.as_ptr(), value)
        })
    }

    /// Iterate over all clip metadata.
    pub fn metadata_iter(&self) -> Result<MetadataIterator> {
        let mut iterator = std::ptr::null_mut();
        unsafe {
            crate::errors::check(api::blackmagic_raw_clip_get_metadata_iterator(
                self.as_raw(),
                &mut iterator,
            ))?;
            MetadataIterator::from_raw(iterator)
        }
    }

    pub fn clone_processing_attributes(&self) -> Result<ClipProcessingAttributes> {
        let mut attributes = std::ptr::null_mut();
        unsafe {
            crate::errors::check(api::blackmagic_raw_clip_clone_processing_attributes(
                self.as_raw(),
                &mut attributes,
            ))?;
            ClipProcessingAttributes::from_raw(attributes)
        }
    }

    /// The clip's audio, or `None` if it was recorded without.
    pub fn audio(&self) -> Result<Option<ClipAudio>> {
        let mut audio = std::ptr::null_mut();
        let status = unsafe { api::blackmagic_raw_clip_get_audio(self.as_raw(), &mut audio) };
        if status == E_NOINTERFACE {
            return Ok(None);
        }
        crate::errors::check(status)?;
        unsafe { ClipAudio::from_raw(audio) }.map(Some)
    }

    /// Create a job that reads one frame. Submit it to get a `read_complete` callback.
    pub fn create_job_read_frame(&self, frame_index: u64) -> Result<Job> {
        let mut job = std::ptr::null_mut();
        unsafe {
            crate::errors::check(api::blackmagic_raw_clip_create_job_read_frame(
                self.as_raw(),
                frame_index,
                &mut job,
            ))?;
            Job::from_raw(job)
        }
    }

    /// Create a job that writes `frame_count` frames starting at `frame_index` to a new
    /// clip at `file_name`.
    pub fn create_job_trim(
        &self,
        file_name: &str,
        frame_index: u64,
        frame_count: u64,
        clip_processing_attributes: Option<&ClipProcessingAttributes>,
        frame_processing_attributes: Option<&super::FrameProcessingAttributes>,
    ) -> Result<Job> {
        let file_name = CString::new(file_name)?;
        let mut job = std::ptr::null_mut();
        unsafe {
            crate::errors::check(api::blackmagic_raw_clip_create_job_trim(
                self.as_raw(),
                file_name.as_ptr(),
                frame_index,
                frame_count,
                clip_processing_attributes.map_or(std::ptr::null_mut(), |a| a.as_raw()),
                frame_processing_attributes.map_or(std::ptr::null_mut(), |a| a.as_raw()),
                &mut job,
            ))?;
            Job::from_raw(job)
        }
    }
}

impl ClipAudio {
    /// Vendor FourCC of the sample encoding.
    pub fn format(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_clip_audio_get_format(self.as_raw(), out) })
    }

    pub fn bit_depth(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_clip_audio_get_bit_depth(self.as_raw(), out) })
    }

    pub fn channel_count(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_clip_audio_get_channel_count(self.as_raw(), out) })
    }

    pub fn sample_rate(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_clip_audio_get_sample_rate(self.as_raw(), out) })
    }

    /// Number of sample frames in the clip.
    pub fn sample_count(&self) -> Result<u64> {
        get(|out| unsafe { api::blackmagic_raw_clip_audio_get_sample_count(self.as_raw(), out) })
    }

    /// Read interleaved samples starting at `sample_frame_index` into `buffer`.
    ///
    /// Returns the number of sample frames and of bytes written.
    pub fn read_samples(&self, sample_frame_index: i64, buffer: &mut [u8]) -> Result<(u32, u32)> {
        let size = u32::try_from(buffer.len()).unwrap_or(u32::MAX);
        let (mut samples_read, mut bytes_read) = (0, 0);
        unsafe {
            crate::errors::check(api::blackmagic_raw_clip_audio_get_samples(
                self.as_raw(),
                sample_frame_index,
                buffer.as_mut_ptr().cast(),
                size,
                u32::MAX,
                &mut samples_read,
                &mut bytes_read,
            ))?;
        }
        Ok((samples_read, bytes_read))
    }
}
