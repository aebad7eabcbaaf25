use std::{fmt, ops::Deref};

use parking_lot::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    compose::{
        builder::{ChannelId, CompositionBuilder},
        mix::{AudioMixInput, MixParts, VideoInstruction},
    },
    foundation::{
        core::{MediaKind, TrackType},
        error::{CutlineError, CutlineResult},
        observe::Observable,
        time::{MediaTime, TimeRange},
    },
    timeline::member::{MediaMember, Member},
};

/// How a track places new members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementBehavior {
    /// Exactly one member; adding replaces it.
    Single,
    /// Members packed back to back with no gaps or overlaps.
    Gapless,
}

/// Ordered container of members of one [`TrackType`].
///
/// Member order is caller-controlled and never re-sorted. Every mutation publishes the new list
/// to [`Track::subscribe`] receivers.
pub struct Track {
    id: Uuid,
    track_type: TrackType,
    behavior: PlacementBehavior,
    members: Observable<Vec<Member>>,
    debug_name: RwLock<Option<String>>,
}

impl Track {
    /// Empty track with a fresh id.
    pub fn new(track_type: TrackType, behavior: PlacementBehavior) -> Self {
        Self {
            id: Uuid::new_v4(),
            track_type,
            behavior,
            members: Observable::new(Vec::new()),
            debug_name: RwLock::new(None),
        }
    }

    /// Track id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Member family accepted by this track.
    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    /// Placement policy.
    pub fn behavior(&self) -> PlacementBehavior {
        self.behavior
    }

    /// Snapshot of the members in track order.
    pub fn members(&self) -> Vec<Member> {
        self.members.get()
    }

    /// Stream of member-list snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Member>> {
        self.members.subscribe()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.with(Vec::len)
    }

    /// Whether the track has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Optional name used in logs and `Display`.
    pub fn debug_name(&self) -> Option<String> {
        self.debug_name.read().clone()
    }

    /// Set the debug name.
    pub fn set_debug_name(&self, name: impl Into<String>) {
        *self.debug_name.write() = Some(name.into());
    }

    /// Union of all member ranges, always starting at zero.
    pub fn time_range(&self) -> TimeRange {
        self.members.with(|members| {
            members
                .iter()
                .fold(TimeRange::ZERO, |acc, m| acc.union(m.time_range()))
        })
    }

    /// Sum of member durations.
    pub fn total_duration(&self) -> MediaTime {
        self.members
            .with(|members| members.iter().map(Member::duration).sum())
    }

    fn check_type(&self, member: &Member) -> CutlineResult<()> {
        if member.track_type() != self.track_type {
            return Err(CutlineError::type_mismatch(format!(
                "{} member on {} track",
                member.track_type(),
                self.track_type
            )));
        }
        Ok(())
    }

    /// Add without moving the member: replaces everything on a `Single` track, appends otherwise.
    pub fn add_at_closest_valid_time(&self, member: Member) -> CutlineResult<()> {
        self.check_type(&member)?;
        tracing::debug!(track = %self.label(), member = %member, "add at closest valid time");
        match self.behavior {
            PlacementBehavior::Single => self.members.set(vec![member]),
            PlacementBehavior::Gapless => self.members.modify(|m| m.push(member)),
        }
        Ok(())
    }

    /// Append, packing the member against the track end on gapless tracks.
    ///
    /// On a gapless track the member must be bounded ([`CutlineError::CannotAddUnbounded`]);
    /// its start is discarded and it is shifted so that it starts where the track ends.
    pub fn append(&self, member: Member) -> CutlineResult<()> {
        self.check_type(&member)?;
        if self.behavior == PlacementBehavior::Gapless {
            let Some(start) = member.start().filter(|_| member.is_bounded()) else {
                return Err(CutlineError::CannotAddUnbounded);
            };
            let end = self.time_range().end;
            if end.is_infinite() {
                return Err(CutlineError::invalid_time(format!(
                    "{} has no finite end to pack against",
                    self.label()
                )));
            }
            member.offset(end - start);
        }
        tracing::debug!(track = %self.label(), member = %member, "append");
        self.members.modify(|m| m.push(member));
        Ok(())
    }

    /// Remove `member` (by id). Returns whether it was present.
    pub fn remove(&self, member: &Member) -> bool {
        self.remove_by_id(member.id())
    }

    /// Remove the member with `id`. Returns whether it was present.
    pub fn remove_by_id(&self, id: Uuid) -> bool {
        self.members.modify_if(|members| {
            match members.iter().position(|m| m.id() == id) {
                Some(idx) => {
                    members.remove(idx);
                    true
                }
                None => false,
            }
        })
    }

    /// Move the member at index `from` to index `to`.
    pub fn move_member(&self, from: usize, to: usize) -> CutlineResult<()> {
        let len = self.len();
        if from >= len || to >= len {
            return Err(CutlineError::validation(format!(
                "move {from} -> {to} out of bounds for {len} members"
            )));
        }
        self.members.modify(|members| {
            let member = members.remove(from);
            members.insert(to, member);
        });
        Ok(())
    }

    /// Insert `member` at `index` (which may equal the length).
    pub fn insert_member(&self, member: Member, index: usize) -> CutlineResult<()> {
        self.check_type(&member)?;
        let len = self.len();
        if index > len {
            return Err(CutlineError::validation(format!(
                "insert at {index} out of bounds for {len} members"
            )));
        }
        self.members.modify(|members| members.insert(index, member));
        Ok(())
    }

    /// Drop every member.
    pub fn remove_all_members(&self) {
        self.members.set(Vec::new());
    }

    /// Where a member dropped at `t` should go.
    ///
    /// Free tracks return `t`. Gapless tracks return zero when empty, the nearer boundary of the
    /// member containing `t` (the end on a tie), or the track end when no member contains `t`.
    pub fn insertion_time(&self, t: MediaTime) -> MediaTime {
        if self.behavior != PlacementBehavior::Gapless {
            return t;
        }
        let hit = self.members.with(|members| {
            if members.is_empty() {
                return Some(None);
            }
            let m = members.iter().find(|m| m.contains(t))?;
            let (start, end) = (m.start()?, m.end()?);
            Some(Some((start, end)))
        });
        match hit {
            Some(None) => MediaTime::ZERO,
            Some(Some((start, end))) => {
                if t.abs_diff(start) < t.abs_diff(end) {
                    start
                } else {
                    end
                }
            }
            None => self.time_range().end,
        }
    }

    fn label(&self) -> String {
        self.debug_name().unwrap_or_else(|| self.id.to_string())
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track(id: {}, type: {}, behavior: {:?}, members:",
            self.label(),
            self.track_type,
            self.behavior
        )?;
        for m in self.members() {
            write!(f, "\n\t{m}")?;
        }
        write!(f, "\n)")
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("id", &self.id)
            .field("track_type", &self.track_type)
            .field("behavior", &self.behavior)
            .field("members", &self.len())
            .finish()
    }
}

/// A media track of one [`MediaKind`] with a relative volume.
#[derive(Debug)]
pub struct MediaTrack {
    track: Track,
    media_kind: MediaKind,
    volume: RwLock<f32>,
}

impl MediaTrack {
    /// Empty media track at volume `1.0`.
    pub fn new(media_kind: MediaKind, behavior: PlacementBehavior) -> Self {
        Self {
            track: Track::new(TrackType::Media, behavior),
            media_kind,
            volume: RwLock::new(1.0),
        }
    }

    /// Media kind accepted by this track.
    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    /// Relative volume (nominally `0.0..=1.0`, not clamped).
    pub fn volume(&self) -> f32 {
        *self.volume.read()
    }

    /// Set the relative volume.
    pub fn set_volume(&self, volume: f32) {
        *self.volume.write() = volume;
    }

    /// Underlying generic track.
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Members viewed as media members, in track order.
    pub fn media_members(&self) -> Vec<MediaMember> {
        self.track
            .members()
            .iter()
            .filter_map(Member::as_media)
            .collect()
    }

    fn check_media(&self, member: &Member) -> CutlineResult<()> {
        match member.as_media() {
            Some(media) if media.media_kind() == self.media_kind => Ok(()),
            Some(media) => Err(CutlineError::type_mismatch(format!(
                "{} member on {} track",
                media.media_kind(),
                self.media_kind
            ))),
            None => Err(CutlineError::type_mismatch(format!(
                "non-media member on {} track",
                self.media_kind
            ))),
        }
    }

    /// Like [`Track::add_at_closest_valid_time`], also checking the media kind.
    pub fn add_at_closest_valid_time(&self, member: Member) -> CutlineResult<()> {
        self.check_media(&member)?;
        self.track.add_at_closest_valid_time(member)
    }

    /// Like [`Track::append`], also checking the media kind.
    pub fn append(&self, member: Member) -> CutlineResult<()> {
        self.check_media(&member)?;
        self.track.append(member)
    }

    /// Like [`Track::insert_member`], also checking the media kind.
    pub fn insert_member(&self, member: Member, index: usize) -> CutlineResult<()> {
        self.check_media(&member)?;
        self.track.insert_member(member, index)
    }

    /// Constant-gain mix entry for an audio `channel` of this track.
    pub fn audio_mix_input(&self, channel: ChannelId, duration: MediaTime) -> AudioMixInput {
        AudioMixInput {
            channel,
            gain: self.volume(),
            range: TimeRange {
                start: MediaTime::ZERO,
                end: duration,
            },
        }
    }

    /// Lower this track's members into `builder`.
    ///
    /// A video track creates a video and an audio channel, an audio track one audio channel.
    /// Members are laid out back to back from zero. Placement stops at the track's total
    /// duration, or at `limit` when that total is unbounded.
    #[tracing::instrument(skip(self, builder, parts), fields(track = %self.track.label()))]
    pub fn lower<B: CompositionBuilder + ?Sized>(
        &self,
        builder: &mut B,
        parts: &mut MixParts,
        limit: MediaTime,
    ) -> CutlineResult<()> {
        let total = self.track.total_duration();
        let max_time = if total.is_finite() { total } else { limit };
        let kinds: &[MediaKind] = match self.media_kind {
            MediaKind::Video => &[MediaKind::Video, MediaKind::Audio],
            MediaKind::Audio => &[MediaKind::Audio],
        };
        let members = self.media_members();

        for &kind in kinds {
            let channel = builder.create_channel(kind)?;
            if kind == MediaKind::Audio {
                let input = self.audio_mix_input(channel, max_time);
                builder.set_gain(channel, input.gain, input.range)?;
                parts.audio.inputs.push(input);
            }

            let mut at = MediaTime::ZERO;
            for member in &members {
                let placed = member.insert_into(builder, channel, kind, at, max_time)?;
                if kind == MediaKind::Video
                    && let Some(range) = placed
                {
                    parts.video.instructions.push(VideoInstruction {
                        channel,
                        member_id: member.id(),
                        range,
                        mirrored: member.is_mirrored(),
                        rotation: member.rotation(),
                    });
                }
                at += member.duration();
            }
            tracing::debug!(%channel, %kind, members = members.len(), "lowered channel");
        }
        Ok(())
    }
}

impl Deref for MediaTrack {
    type Target = Track;

    fn deref(&self) -> &Track {
        &self.track
    }
}

/// A track of effect members.
#[derive(Debug)]
pub struct EffectTrack {
    track: Track,
}

impl EffectTrack {
    /// Empty effect track.
    pub fn new(behavior: PlacementBehavior) -> Self {
        Self {
            track: Track::new(TrackType::Effect, behavior),
        }
    }

    /// Underlying generic track.
    pub fn track(&self) -> &Track {
        &self.track
    }
}

impl Deref for EffectTrack {
    type Target = Track;

    fn deref(&self) -> &Track {
        &self.track
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/track.rs"]
mod tests;
