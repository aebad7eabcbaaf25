use crate::{
    compose::builder::{ChannelId, CompositionBuilder, SourceSegment},
    foundation::{
        core::MediaKind,
        error::{CutlineError, CutlineResult},
        time::{MediaTime, TimeRange},
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Options for [`InMemoryComposition`].
pub struct InMemoryCompositionOpts {
    /// Upper bound on channels; `None` means unlimited.
    #[serde(default)]
    pub max_channels: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A segment after placement.
pub struct PlacedSegment {
    /// The media slice.
    pub segment: SourceSegment,
    /// Composition time the slice starts at.
    pub at: MediaTime,
}

impl PlacedSegment {
    /// Composition-time range covered by the segment.
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.at,
            end: self.at + self.segment.duration(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Constant gain applied over a range.
pub struct GainSpan {
    /// Linear gain.
    pub gain: f32,
    /// Composition-time range.
    pub range: TimeRange,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One recorded channel.
pub struct ChannelRecord {
    /// Channel handle.
    pub id: ChannelId,
    /// Media kind.
    pub kind: MediaKind,
    /// Segments in insertion order.
    pub segments: Vec<PlacedSegment>,
    /// Gain spans in insertion order.
    pub gains: Vec<GainSpan>,
}

impl ChannelRecord {
    /// End of the last placed segment (zero when empty).
    pub fn end(&self) -> MediaTime {
        self.segments
            .iter()
            .map(|s| s.range().end)
            .max()
            .unwrap_or(MediaTime::ZERO)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Finished output of [`InMemoryComposition`].
pub struct ComposedTimeline {
    /// All channels in creation order.
    pub channels: Vec<ChannelRecord>,
}

impl ComposedTimeline {
    /// Look up a channel.
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelRecord> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Channels carrying `kind`.
    pub fn channels_of(&self, kind: MediaKind) -> impl Iterator<Item = &ChannelRecord> {
        self.channels.iter().filter(move |c| c.kind == kind)
    }

    /// End of the latest segment across all channels.
    pub fn duration(&self) -> MediaTime {
        self.channels
            .iter()
            .map(ChannelRecord::end)
            .max()
            .unwrap_or(MediaTime::ZERO)
    }

    /// Serialize as pretty JSON, for snapshots and debugging.
    pub fn to_json_pretty(&self) -> CutlineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CutlineError::Other(anyhow::Error::new(e)))
    }
}

/// Reference [`CompositionBuilder`] that records every call.
///
/// Used by tests and by callers that hand the description to an external encoder.
#[derive(Debug, Default)]
pub struct InMemoryComposition {
    opts: InMemoryCompositionOpts,
    channels: Vec<ChannelRecord>,
}

impl InMemoryComposition {
    /// Empty builder.
    pub fn new(opts: InMemoryCompositionOpts) -> Self {
        Self {
            opts,
            channels: Vec::new(),
        }
    }

    /// Channels recorded so far.
    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    fn channel_mut(&mut self, id: ChannelId) -> CutlineResult<&mut ChannelRecord> {
        self.channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CutlineError::validation(format!("unknown channel {id}")))
    }
}

impl CompositionBuilder for InMemoryComposition {
    type Timeline = ComposedTimeline;

    fn create_channel(&mut self, kind: MediaKind) -> CutlineResult<ChannelId> {
        if let Some(max) = self.opts.max_channels
            && self.channels.len() >= max
        {
            return Err(CutlineError::FailedToCreateChannel(format!(
                "{kind} channel exceeds limit of {max}"
            )));
        }
        let id = ChannelId(self.channels.len() as u32);
        self.channels.push(ChannelRecord {
            id,
            kind,
            segments: Vec::new(),
            gains: Vec::new(),
        });
        Ok(id)
    }

    fn insert(
        &mut self,
        segment: SourceSegment,
        channel: ChannelId,
        at: MediaTime,
    ) -> CutlineResult<()> {
        if at.is_infinite() || segment.source.end.is_infinite() {
            return Err(CutlineError::invalid_time(format!(
                "cannot place unbounded segment {} at {at}",
                segment.source
            )));
        }
        let record = self.channel_mut(channel)?;
        if record.kind != segment.kind {
            return Err(CutlineError::type_mismatch(format!(
                "{} segment on {} channel {channel}",
                segment.kind, record.kind
            )));
        }
        record.segments.push(PlacedSegment { segment, at });
        Ok(())
    }

    fn set_gain(&mut self, channel: ChannelId, gain: f32, range: TimeRange) -> CutlineResult<()> {
        self.channel_mut(channel)?
            .gains
            .push(GainSpan { gain, range });
        Ok(())
    }

    fn finish(self) -> CutlineResult<ComposedTimeline> {
        Ok(ComposedTimeline {
            channels: self.channels,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/memory.rs"]
mod tests;
