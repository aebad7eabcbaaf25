use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    compose::{
        builder::CompositionBuilder,
        mix::{MixParts, TrackMix},
    },
    foundation::{
        core::{MediaKind, TrackType},
        error::{CutlineError, CutlineResult},
        observe::Observable,
        time::MediaTime,
    },
    timeline::track::{EffectTrack, MediaTrack, Track},
};

/// A media or an effect track registered with a [`TrackController`].
#[derive(Clone, Debug)]
pub enum TrackHandle {
    /// Media track.
    Media(Arc<MediaTrack>),
    /// Effect track.
    Effect(Arc<EffectTrack>),
}

impl TrackHandle {
    /// Generic view of the track.
    pub fn track(&self) -> &Track {
        match self {
            Self::Media(t) => t.track(),
            Self::Effect(t) => t.track(),
        }
    }
}

impl From<Arc<MediaTrack>> for TrackHandle {
    fn from(t: Arc<MediaTrack>) -> Self {
        Self::Media(t)
    }
}

impl From<Arc<EffectTrack>> for TrackHandle {
    fn from(t: Arc<EffectTrack>) -> Self {
        Self::Effect(t)
    }
}

/// Owns the project's tracks and compiles them into a [`TrackMix`].
#[derive(Debug, Default)]
pub struct TrackController {
    media: Observable<Vec<Arc<MediaTrack>>>,
    effects: Observable<Vec<Arc<EffectTrack>>>,
}

impl TrackController {
    /// Controller with no tracks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a track at the end of its family's list.
    pub fn add_track(&self, track: impl Into<TrackHandle>) {
        match track.into() {
            TrackHandle::Media(t) => self.media.modify(|v| v.push(t)),
            TrackHandle::Effect(t) => self.effects.modify(|v| v.push(t)),
        }
    }

    /// Unregister the track with the same id. Returns whether it was registered.
    pub fn remove_track(&self, track: &TrackHandle) -> bool {
        let id = track.track().id();
        match track {
            TrackHandle::Media(_) => self.media.modify_if(|v| {
                let before = v.len();
                v.retain(|t| t.id() != id);
                v.len() != before
            }),
            TrackHandle::Effect(_) => self.effects.modify_if(|v| {
                let before = v.len();
                v.retain(|t| t.id() != id);
                v.len() != before
            }),
        }
    }

    /// All media tracks followed by all effect tracks.
    pub fn current_tracks(&self) -> Vec<TrackHandle> {
        let mut out: Vec<TrackHandle> = self
            .media
            .get()
            .into_iter()
            .map(TrackHandle::Media)
            .collect();
        out.extend(self.effects.get().into_iter().map(TrackHandle::Effect));
        out
    }

    /// Tracks of one family.
    pub fn tracks_of(&self, track_type: TrackType) -> Vec<TrackHandle> {
        match track_type {
            TrackType::Media => self.media.get().into_iter().map(TrackHandle::Media).collect(),
            TrackType::Effect => self
                .effects
                .get()
                .into_iter()
                .map(TrackHandle::Effect)
                .collect(),
        }
    }

    /// Media tracks carrying `kind`.
    pub fn media_tracks_of(&self, kind: MediaKind) -> Vec<Arc<MediaTrack>> {
        self.media.with(|v| {
            v.iter()
                .filter(|t| t.media_kind() == kind)
                .cloned()
                .collect()
        })
    }

    /// Stream of media-track list snapshots.
    pub fn subscribe_media_tracks(&self) -> watch::Receiver<Vec<Arc<MediaTrack>>> {
        self.media.subscribe()
    }

    /// Stream of effect-track list snapshots.
    pub fn subscribe_effect_tracks(&self) -> watch::Receiver<Vec<Arc<EffectTrack>>> {
        self.effects.subscribe()
    }

    /// Latest finite track end across all tracks (zero when there is none).
    pub fn current_duration(&self) -> MediaTime {
        self.current_tracks()
            .iter()
            .map(|t| t.track().time_range().end)
            .filter(|end| end.is_finite())
            .max()
            .unwrap_or(MediaTime::ZERO)
    }

    /// Longest finite back-to-back layout across media tracks (zero when there is none).
    ///
    /// Lowering lays members end to end regardless of their start times, so this is the length
    /// of the composed spine and the limit for unbounded tracks.
    pub fn laid_out_duration(&self) -> MediaTime {
        self.media
            .with(|tracks| {
                tracks
                    .iter()
                    .map(|t| t.total_duration())
                    .filter(|d| d.is_finite())
                    .max()
            })
            .unwrap_or(MediaTime::ZERO)
    }

    /// Lower every media track into `builder` and bundle the result.
    ///
    /// Unbounded tracks are cut at [`TrackController::laid_out_duration`]. Any failure aborts
    /// the build and is reported as [`CutlineError::MixBuild`].
    #[tracing::instrument(skip(self, builder))]
    pub fn build_mix<B: CompositionBuilder>(&self, mut builder: B) -> CutlineResult<TrackMix<B::Timeline>> {
        let limit = self.laid_out_duration();
        let mut parts = MixParts::default();
        let lowered = self
            .media
            .get()
            .iter()
            .try_for_each(|track| track.lower(&mut builder, &mut parts, limit));
        if let Err(err) = lowered {
            tracing::warn!(error = %err, "track mix build failed");
            return Err(CutlineError::mix_build(err));
        }
        let timeline = builder.finish().map_err(CutlineError::mix_build)?;
        tracing::debug!(
            audio_inputs = parts.audio.inputs.len(),
            video_instructions = parts.video.instructions.len(),
            "track mix built"
        );
        Ok(TrackMix::assemble(timeline, parts))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/controller.rs"]
mod tests;
