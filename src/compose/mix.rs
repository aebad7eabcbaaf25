use uuid::Uuid;

use crate::{
    compose::builder::ChannelId,
    foundation::{
        core::Rotation,
        time::TimeRange,
    },
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Constant-gain input for one audio channel.
pub struct AudioMixInput {
    /// Audio channel the gain applies to.
    pub channel: ChannelId,
    /// Linear gain (track volume).
    pub gain: f32,
    /// Composition-time range the gain covers.
    pub range: TimeRange,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Audio mixing parameters for a lowered timeline.
pub struct AudioMix {
    /// One entry per audio channel.
    pub inputs: Vec<AudioMixInput>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Per-segment geometric instruction for a video channel.
pub struct VideoInstruction {
    /// Video channel the instruction targets.
    pub channel: ChannelId,
    /// Member the segment came from.
    pub member_id: Uuid,
    /// Composition-time range of the segment.
    pub range: TimeRange,
    /// Horizontal mirror.
    pub mirrored: bool,
    /// Clockwise rotation.
    pub rotation: Rotation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Video composition instructions for a lowered timeline.
pub struct VideoComposition {
    /// Instructions in lowering order.
    pub instructions: Vec<VideoInstruction>,
}

impl VideoComposition {
    /// Whether any instruction changes the picture geometry.
    pub fn has_transforms(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| i.mirrored || i.rotation != Rotation::Deg0)
    }
}

/// Side outputs collected while tracks lower themselves into a builder.
#[derive(Debug, Default)]
pub struct MixParts {
    /// Audio gain inputs.
    pub audio: AudioMix,
    /// Video instructions.
    pub video: VideoComposition,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Playback/export-ready bundle produced from all tracks.
pub struct TrackMix<T> {
    /// The builder's finished timeline.
    pub timeline: T,
    /// Audio parameters, `None` when no audio channel exists.
    pub audio_mix: Option<AudioMix>,
    /// Video instructions, `None` when no segment is mirrored or rotated.
    pub video_composition: Option<VideoComposition>,
}

impl<T> TrackMix<T> {
    /// Combine a finished timeline with the parts collected during lowering.
    pub fn assemble(timeline: T, parts: MixParts) -> Self {
        let audio_mix = (!parts.audio.inputs.is_empty()).then_some(parts.audio);
        let video_composition = parts.video.has_transforms().then_some(parts.video);
        Self {
            timeline,
            audio_mix,
            video_composition,
        }
    }
}
