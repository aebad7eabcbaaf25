use std::path::PathBuf;

use uuid::Uuid;

use crate::foundation::{
    core::MediaKind,
    error::CutlineResult,
    time::{MediaTime, TimeRange},
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Handle to a channel created by a [`CompositionBuilder`].
pub struct ChannelId(pub u32);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A slice of one asset's media to be placed on a channel.
pub struct SourceSegment {
    /// Asset the media comes from.
    pub asset_id: Uuid,
    /// Local file backing the asset.
    pub path: PathBuf,
    /// Which channel of the source file is read.
    pub kind: MediaKind,
    /// Range within the source media, in source time.
    pub source: TimeRange,
}

impl SourceSegment {
    /// Length of the placed media.
    pub fn duration(&self) -> MediaTime {
        self.source.duration()
    }
}

/// Narrow interface to a concrete composition backend.
///
/// Track lowering talks only to this trait, so the container/encoder backend can be swapped
/// without touching the timeline model.
pub trait CompositionBuilder {
    /// What [`CompositionBuilder::finish`] produces.
    type Timeline;

    /// Create an empty channel of `kind`.
    ///
    /// Fails with [`CutlineError::FailedToCreateChannel`](crate::CutlineError::FailedToCreateChannel)
    /// when the backend cannot allocate one.
    fn create_channel(&mut self, kind: MediaKind) -> CutlineResult<ChannelId>;

    /// Place `segment` on `channel` starting at composition time `at`.
    fn insert(&mut self, segment: SourceSegment, channel: ChannelId, at: MediaTime)
    -> CutlineResult<()>;

    /// Apply a constant `gain` to `channel` over `range`.
    fn set_gain(&mut self, channel: ChannelId, gain: f32, range: TimeRange) -> CutlineResult<()>;

    /// Seal the builder.
    fn finish(self) -> CutlineResult<Self::Timeline>
    where
        Self: Sized;
}
