//! Read frames and the images decoded from them.

use super::{get, get_string, ClipProcessingAttributes, Job, MetadataIterator};
use crate::api;
use crate::errors::{check, Error, Result};
use crate::formats::ResourceFormat;
use crate::interfaces::{
    IBlackmagicRawFrame, IBlackmagicRawFrameProcessingAttributes, IBlackmagicRawProcessedImage,
};

com_wrapper!(
    /// A frame read from a clip, still in its encoded form.
    Frame,
    IBlackmagicRawFrame
);

com_wrapper!(
    /// Frame-level decode settings.
    FrameProcessingAttributes,
    IBlackmagicRawFrameProcessingAttributes
);

com_wrapper!(
    /// A decoded image in CPU memory.
    ProcessedImage,
    IBlackmagicRawProcessedImage
);

impl Frame {
    pub fn frame_index(&self) -> Result<u64> {
        get(|out| unsafe { api::blackmagic_raw_frame_get_frame_index(self.as_raw(), out) })
    }

    pub fn timecode(&self) -> Result<String> {
        get_string("timecode", |out| unsafe {
            api::blackmagic_raw_frame_get_timecode(self.as_raw(), out)
        })
    }

    pub fn metadata_iter(&self) -> Result<MetadataIterator> {
        let mut iterator = std::ptr::null_mut();
        unsafe {
            check(api::blackmagic_raw_frame_get_metadata_iterator(
                self.as_raw(),
                &mut iterator,
            ))?;
            MetadataIterator::from_raw(iterator)
        }
    }

    /// Choose the pixel layout of the image the decode job will produce.
    pub fn set_resource_format(&self, format: ResourceFormat) -> Result<()> {
        check(unsafe { api::blackmagic_raw_frame_set_resource_format(self.as_raw(), format.0) })
    }

    pub fn resource_format(&self) -> Result<ResourceFormat> {
        get(|out| unsafe { api::blackmagic_raw_frame_get_resource_format(self.as_raw(), out) })
            .map(ResourceFormat)
    }

    pub fn clone_processing_attributes(&self) -> Result<FrameProcessingAttributes> {
        let mut attributes = std::ptr::null_mut();
        unsafe {
            check(api::blackmagic_raw_frame_clone_processing_attributes(
                self.as_raw(),
                &mut attributes,
            ))?;
            FrameProcessingAttributes::from_raw(attributes)
        }
    }

    /// Create a job that decodes this frame. Submit it to get a `process_complete`
    /// callback. `None` uses the settings stored in the clip.
    pub fn create_job_decode_and_process_frame(
        &self,
        clip_processing_attributes: Option<&ClipProcessingAttributes>,
        frame_processing_attributes: Option<&FrameProcessingAttributes>,
    ) -> Result<Job> {
        let mut job = std::ptr::null_mut();
        unsafe {
            check(api::blackmagic_raw_frame_create_job_decode_and_process_frame(
                self.as_raw(),
                clip_processing_attributes.map_or(std::ptr::null_mut(), |a| a.as_raw()),
                frame_processing_attributes.map_or(std::ptr::null_mut(), |a| a.as_raw()),
                &mut job,
            ))?;
            Job::from_raw(job)
        }
    }
}

impl ProcessedImage {
    pub fn width(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_processed_image_get_width(self.as_raw(), out) })
    }

    pub fn height(&self) -> Result<u32> {
        get(|out| unsafe { api::blackmagic_raw_processed_image_get_height(self.as_raw(), out) })
    }

    pub fn resource_size_bytes(&self) -> Result<u32> {
        get(|out| unsafe {
            api::blackmagic_raw_processed_image_get_resource_size_bytes(self.as_raw(), out)
        })
    }

    pub fn resource_format(&self) -> Result<ResourceFormat> {
        get(|out| unsafe {
            api::blackmagic_raw_processed_image_get_resource_format(self.as_raw(), out)
        })
        .map(ResourceFormat)
    }

    /// The decoded pixels. Valid for as long as the image is alive.
    pub fn resource(&self) -> Result<&[u8]> {
        let len = self.resource_size_bytes()? as usize;
        let mut data = std::ptr::null_mut();
        unsafe {
            check(api::blackmagic_raw_processed_image_get_resource(
                self.as_raw(),
                &mut data,
            ))?;
            if len == 0 {
                return Ok(&[]);
            }
            if data.is_null() {
                return Err(Error::NullHandle("image resource"));
            }
            Ok(std::slice::from_raw_parts(data as *const u8, len))
        }
    }
}
