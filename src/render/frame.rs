use crate::{
    foundation::{
        error::{CutlineError, CutlineResult},
        time::MediaTime,
    },
    render::pixel_buffer::{PixelBuffer, PixelFormat},
};

/// Timing metadata carried by every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleTiming {
    /// Frame duration.
    pub duration: MediaTime,
    /// Presentation timestamp.
    pub presentation: MediaTime,
    /// Decode timestamp, when the source reports one.
    pub decode: Option<MediaTime>,
}

impl SampleTiming {
    /// Timing with only a presentation timestamp.
    pub fn at(presentation: MediaTime) -> Self {
        Self {
            duration: MediaTime::ZERO,
            presentation,
            decode: None,
        }
    }
}

/// Image format of a video frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDescription {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl FormatDescription {
    /// Describe `buffer`.
    pub fn of(buffer: &PixelBuffer) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            format: buffer.format(),
        }
    }

    /// Whether `buffer` has this exact layout.
    pub fn matches(&self, buffer: &PixelBuffer) -> bool {
        *self == Self::of(buffer)
    }
}

/// A sample flowing through the transform pipeline.
///
/// Audio samples and metadata frames carry no image plane. Cloning is cheap; the pixel storage is
/// shared.
#[derive(Clone, Debug)]
pub struct SampleFrame {
    timing: SampleTiming,
    format: Option<FormatDescription>,
    image: Option<PixelBuffer>,
}

impl SampleFrame {
    /// Video frame backed by `buffer`.
    pub fn video(buffer: PixelBuffer, timing: SampleTiming) -> Self {
        Self {
            timing,
            format: Some(FormatDescription::of(&buffer)),
            image: Some(buffer),
        }
    }

    /// Frame without an image plane.
    pub fn audio(timing: SampleTiming) -> Self {
        Self {
            timing,
            format: None,
            image: None,
        }
    }

    /// Timing metadata.
    pub fn timing(&self) -> SampleTiming {
        self.timing
    }

    /// Presentation timestamp.
    pub fn presentation_time(&self) -> MediaTime {
        self.timing.presentation
    }

    /// Image format, `None` for frames without an image plane.
    pub fn format(&self) -> Option<FormatDescription> {
        self.format
    }

    /// The image plane, if this frame has one.
    pub fn image_buffer(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    /// New frame around `buffer` with this frame's timing.
    ///
    /// Fails when the frame has a format description that `buffer` does not match.
    pub fn rewrap(&self, buffer: PixelBuffer) -> CutlineResult<Self> {
        let format = match self.format {
            Some(format) if !format.matches(&buffer) => {
                return Err(CutlineError::validation(format!(
                    "buffer {}x{} {:?} does not match frame format {}x{} {:?}",
                    buffer.width(),
                    buffer.height(),
                    buffer.format(),
                    format.width,
                    format.height,
                    format.format
                )));
            }
            Some(format) => format,
            None => FormatDescription::of(&buffer),
        };
        Ok(Self {
            timing: self.timing,
            format: Some(format),
            image: Some(buffer),
        })
    }

    /// Whether both frames carry the same timing and share the same pixel storage.
    pub fn same_as(&self, other: &Self) -> bool {
        self.timing == other.timing
            && match (&self.image, &other.image) {
                (Some(a), Some(b)) => a.ptr_eq(b),
                (None, None) => true,
                _ => false,
            }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
