//! Cutline is the timeline and real-time frame transform engine of a camera capture SDK.
//!
//! It has two halves:
//!
//! - A timeline model: [`Member`]s placed on [`Track`]s, grouped by a [`TrackController`] and
//!   owned by a [`Project`], which can be lowered through a [`CompositionBuilder`] into a
//!   [`TrackMix`] for playback or export.
//! - A per-frame pipeline: a [`TransformController`] runs each captured [`SampleFrame`] through a
//!   [`BufferProcessorStack`], composites a z-ordered [`TransformLayerStack`] over the frame
//!   image and hands the result to a [`RenderService`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod foundation;
mod render;
mod timeline;
mod transform;

pub use crate::foundation::core::{
    MediaKind, Orientation, Point, Rect, RenderSize, Rotation, Size, TrackType,
};
pub use crate::foundation::error::{CutlineError, CutlineResult, RenderError};
pub use crate::foundation::observe::{EventHub, Observable};
pub use crate::foundation::time::{MediaTime, TimeRange};

pub use crate::assets::media_asset::{AssetStatus, MediaAsset, MediaAssetInfo, PlayableMedia};

pub use crate::compose::builder::{ChannelId, CompositionBuilder, SourceSegment};
pub use crate::compose::memory::{
    ChannelRecord, ComposedTimeline, GainSpan, InMemoryComposition, InMemoryCompositionOpts,
    PlacedSegment,
};
pub use crate::compose::mix::{
    AudioMix, AudioMixInput, MixParts, TrackMix, VideoComposition, VideoInstruction,
};

pub use crate::timeline::controller::{TrackController, TrackHandle};
pub use crate::timeline::member::{EffectMember, MediaMember, Member};
pub use crate::timeline::project::Project;
pub use crate::timeline::track::{EffectTrack, MediaTrack, PlacementBehavior, Track};

pub use crate::render::cpu::CpuRenderService;
pub use crate::render::frame::{FormatDescription, SampleFrame, SampleTiming};
pub use crate::render::pixel_buffer::{PixelBuffer, PixelBufferLock, PixelFormat};
pub use crate::render::service::{
    BackendKind, PreviewReceiver, RenderService, create_render_service,
};

pub use crate::transform::config::PipelineConfig;
pub use crate::transform::controller::TransformController;
pub use crate::transform::event::StackEvent;
pub use crate::transform::features::{
    FeatureManager, FeatureMap, FeatureSource, ManualOrientation, OrientationSource,
};
pub use crate::transform::layer::{TransformLayer, TransformLayerStack, UpdateContext};
pub use crate::transform::processor::{BufferProcessor, BufferProcessorStack};
