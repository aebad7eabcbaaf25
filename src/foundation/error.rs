/// Convenience result type used across cutline.
pub type CutlineResult<T> = Result<T, CutlineError>;

/// Top-level error taxonomy used by timeline and pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum CutlineError {
    /// A member's track type or media kind does not match the track it is placed on.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A requested start/end time falls outside the allowed range.
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Gapless tracks only accept members with both a start and an end time.
    #[error("cannot add an unbounded member to a gapless track")]
    CannotAddUnbounded,

    /// The member's source media does not carry the requested media kind.
    #[error("media kind not found: {0}")]
    MediaKindNotFound(String),

    /// The asset is not in the `ready` state or has no local file.
    #[error("asset {0} is not ready")]
    AssetNotReady(uuid::Uuid),

    /// The asset location is not an absolute local path.
    #[error("invalid asset path: {0}")]
    InvalidAssetPath(String),

    /// The composition builder could not create a channel.
    #[error("failed to create composition channel: {0}")]
    FailedToCreateChannel(String),

    /// Lowering the tracks into a mix failed.
    #[error("failed to build track mix: {source}")]
    MixBuild {
        /// The failure that aborted lowering.
        source: Box<CutlineError>,
    },

    /// No render service could be constructed.
    #[error("unable to create a renderer: {0}")]
    UnableToCreateRenderer(String),

    /// The buffer processor stack is still running a previous frame.
    #[error("buffer processor stack is busy")]
    StackBusy,

    /// The transform controller is still running a previous frame.
    #[error("transform controller is busy")]
    ControllerBusy,

    /// A buffer processor failed to process a frame.
    #[error("processing error: {0}")]
    ProcessingFailed(String),

    /// The render service failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors produced by a [`RenderService`](crate::RenderService).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The render pipeline could not be initialised.
    #[error("failed to create render pipeline")]
    FailedToCreatePipeline,
    /// The image could not be rendered into the target buffer.
    #[error("failed to render image: {0}")]
    FailedToRenderImage(String),
    /// The target buffer was not locked for the duration of the render.
    #[error("pixel buffer base address is not locked")]
    BufferNotLocked,
    /// The image does not match the target buffer dimensions.
    #[error("image size {image:?} does not match buffer size {buffer:?}")]
    SizeMismatch {
        /// `(width, height)` of the rendered image.
        image: (u32, u32),
        /// `(width, height)` of the destination buffer.
        buffer: (u32, u32),
    },
}

impl CutlineError {
    /// Build a [`CutlineError::TypeMismatch`] value.
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Build a [`CutlineError::InvalidTime`] value.
    pub fn invalid_time(msg: impl Into<String>) -> Self {
        Self::InvalidTime(msg.into())
    }

    /// Build a [`CutlineError::ProcessingFailed`] value.
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }

    /// Build a [`CutlineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a lowering failure into [`CutlineError::MixBuild`].
    pub fn mix_build(source: CutlineError) -> Self {
        Self::MixBuild {
            source: Box::new(source),
        }
    }

    /// Whether this is an expected backpressure signal rather than a fault.
    ///
    /// Callers are expected to drop (or retry) the frame when this returns `true`.
    pub fn is_backpressure(&self) -> bool {
        matches!(self, Self::StackBusy | Self::ControllerBusy)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
