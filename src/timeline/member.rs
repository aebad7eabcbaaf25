use std::{cmp::Ordering, fmt, ops::Deref, sync::Arc};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    assets::media_asset::MediaAsset,
    compose::builder::{ChannelId, CompositionBuilder, SourceSegment},
    foundation::{
        core::{MediaKind, Rotation, TrackType},
        error::{CutlineError, CutlineResult},
        time::{MediaTime, TimeRange},
    },
};

#[derive(Clone, Debug)]
struct MemberState {
    start: Option<MediaTime>,
    end: Option<MediaTime>,
    // placement shift accumulated by `offset`; source time = member time - source_offset
    source_offset: MediaTime,
    debug_name: Option<String>,
    mirrored: bool,
    rotation: Rotation,
    loop_media: bool,
}

#[derive(Debug)]
struct EffectPayload {
    kind: String,
    params: RwLock<serde_json::Value>,
}

#[derive(Debug)]
enum Payload {
    Media { asset: MediaAsset, kind: MediaKind },
    Effect(Arc<EffectPayload>),
}

#[derive(Debug)]
struct MemberInner {
    id: Uuid,
    track_type: TrackType,
    state: RwLock<MemberState>,
    payload: Payload,
}

/// A placed interval of media or effect content.
///
/// `Member` is a shared handle: the flat project list and the tracks hold clones of the same
/// member, so timing edits made through one are seen by all. Equality is by id; use
/// [`Member::cmp_by_start`] for temporal ordering.
#[derive(Clone)]
pub struct Member {
    inner: Arc<MemberInner>,
}

impl Member {
    fn from_parts(
        track_type: TrackType,
        start: Option<MediaTime>,
        end: Option<MediaTime>,
        payload: Payload,
    ) -> Self {
        Self {
            inner: Arc::new(MemberInner {
                id: Uuid::new_v4(),
                track_type,
                state: RwLock::new(MemberState {
                    start,
                    end,
                    source_offset: MediaTime::ZERO,
                    debug_name: None,
                    mirrored: false,
                    rotation: Rotation::Deg0,
                    loop_media: true,
                }),
                payload,
            }),
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Which family of tracks this member may be placed on.
    pub fn track_type(&self) -> TrackType {
        self.inner.track_type
    }

    /// Start time, if set.
    pub fn start(&self) -> Option<MediaTime> {
        self.inner.state.read().start
    }

    /// Exclusive end time, if set.
    pub fn end(&self) -> Option<MediaTime> {
        self.inner.state.read().end
    }

    /// `[start ?? 0, end ?? +inf)`.
    pub fn time_range(&self) -> TimeRange {
        let s = self.inner.state.read();
        TimeRange::from_bounds(s.start, s.end)
    }

    /// `end - start`, infinite for unbounded members.
    pub fn duration(&self) -> MediaTime {
        self.time_range().duration()
    }

    /// Whether both start and end are set.
    pub fn is_bounded(&self) -> bool {
        let s = self.inner.state.read();
        s.start.is_some() && s.end.is_some()
    }

    /// Upper limit for the end time: the asset duration for media, unbounded for effects.
    pub fn source_duration(&self) -> MediaTime {
        match &self.inner.payload {
            Payload::Media { asset, .. } => asset.duration(),
            Payload::Effect(_) => MediaTime::POSITIVE_INFINITY,
        }
    }

    /// Set the start time.
    ///
    /// Fails with [`CutlineError::InvalidTime`] unless `0 <= t <= end` (when an end is set);
    /// the member is unchanged on failure.
    pub fn set_start(&self, t: MediaTime) -> CutlineResult<()> {
        let mut s = self.inner.state.write();
        let upper_ok = s.end.is_none_or(|end| t <= end);
        if t < MediaTime::ZERO || !upper_ok {
            return Err(CutlineError::invalid_time(format!(
                "start {t} outside [0, {}]",
                s.end.unwrap_or(MediaTime::POSITIVE_INFINITY)
            )));
        }
        s.start = Some(t);
        Ok(())
    }

    /// Set the end time.
    ///
    /// Fails with [`CutlineError::InvalidTime`] unless `start <= t <= source duration`. For a
    /// member that was shifted with [`Member::offset`], the source limit moves with it.
    pub fn set_end(&self, t: MediaTime) -> CutlineResult<()> {
        let source = self.source_duration();
        let mut s = self.inner.state.write();
        let limit = source + s.source_offset;
        let start = s.start.unwrap_or(MediaTime::ZERO);
        if t < start || t > limit {
            return Err(CutlineError::invalid_time(format!(
                "end {t} outside [{start}, {limit}]"
            )));
        }
        s.end = Some(t);
        Ok(())
    }

    /// Shift both bounds by `delta`. No-op when the member has no end.
    ///
    /// Shifting moves the member on the timeline; [`Member::source_range`] is unchanged.
    pub fn offset(&self, delta: MediaTime) {
        let mut s = self.inner.state.write();
        let Some(end) = s.end else {
            return;
        };
        if let Some(start) = s.start {
            s.start = Some(start + delta);
        }
        s.end = Some(end + delta);
        s.source_offset += delta;
    }

    /// The part of the source media this member plays, in source time.
    pub fn source_range(&self) -> TimeRange {
        let s = self.inner.state.read();
        TimeRange::from_bounds(s.start, s.end).shift(-s.source_offset)
    }

    /// Half-open membership of `t` in [`Member::time_range`].
    pub fn contains(&self, t: MediaTime) -> bool {
        self.time_range().contains(t)
    }

    /// Compare by start time, a missing start sorting as zero.
    pub fn cmp_by_start(&self, other: &Self) -> Ordering {
        let a = self.start().unwrap_or(MediaTime::ZERO);
        let b = other.start().unwrap_or(MediaTime::ZERO);
        a.cmp(&b)
    }

    /// Optional name used in logs and `Display`.
    pub fn debug_name(&self) -> Option<String> {
        self.inner.state.read().debug_name.clone()
    }

    /// Set the debug name.
    pub fn set_debug_name(&self, name: impl Into<String>) {
        self.inner.state.write().debug_name = Some(name.into());
    }

    /// Media view of this member, if it carries media.
    pub fn as_media(&self) -> Option<MediaMember> {
        match &self.inner.payload {
            Payload::Media { asset, kind } => Some(MediaMember {
                member: self.clone(),
                asset: asset.clone(),
                kind: *kind,
            }),
            Payload::Effect(_) => None,
        }
    }

    /// Effect view of this member, if it carries an effect.
    pub fn as_effect(&self) -> Option<EffectMember> {
        match &self.inner.payload {
            Payload::Effect(effect) => Some(EffectMember {
                member: self.clone(),
                effect: Arc::clone(effect),
            }),
            Payload::Media { .. } => None,
        }
    }

    /// Whether both handles refer to the same member state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Member {}

impl std::hash::Hash for Member {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.state.read();
        let name = s
            .debug_name
            .clone()
            .unwrap_or_else(|| self.inner.id.to_string());
        write!(
            f,
            "Member(id: {name}, s: {}, e: {})",
            s.start.unwrap_or(MediaTime::ZERO),
            s.end.unwrap_or(MediaTime::POSITIVE_INFINITY)
        )
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.state.read();
        f.debug_struct("Member")
            .field("id", &self.inner.id)
            .field("track_type", &self.inner.track_type)
            .field("start", &s.start)
            .field("end", &s.end)
            .finish()
    }
}

/// A member placing (a trimmed range of) one media asset.
#[derive(Clone, Debug)]
pub struct MediaMember {
    member: Member,
    asset: MediaAsset,
    kind: MediaKind,
}

impl MediaMember {
    /// Video member covering the whole asset, `0..duration`.
    pub fn video(asset: MediaAsset) -> Self {
        let end = asset.duration();
        Self::build(asset, MediaKind::Video, Some(MediaTime::ZERO), Some(end))
    }

    /// Audio member covering the whole asset, or unbounded when `repeats` is set.
    pub fn audio(asset: MediaAsset, repeats: bool) -> Self {
        let (start, end) = if repeats {
            (None, None)
        } else {
            (Some(MediaTime::ZERO), Some(asset.duration()))
        };
        Self::build(asset, MediaKind::Audio, start, end)
    }

    fn build(
        asset: MediaAsset,
        kind: MediaKind,
        start: Option<MediaTime>,
        end: Option<MediaTime>,
    ) -> Self {
        let member = Member::from_parts(
            TrackType::Media,
            start,
            end,
            Payload::Media {
                asset: asset.clone(),
                kind,
            },
        );
        Self {
            member,
            asset,
            kind,
        }
    }

    /// Backing asset.
    pub fn asset(&self) -> &MediaAsset {
        &self.asset
    }

    /// Whether this is a video or an audio member.
    pub fn media_kind(&self) -> MediaKind {
        self.kind
    }

    /// Base member handle.
    pub fn member(&self) -> &Member {
        &self.member
    }

    /// Consume into the base member handle.
    pub fn into_member(self) -> Member {
        self.member
    }

    /// Horizontal mirror flag.
    pub fn is_mirrored(&self) -> bool {
        self.member.inner.state.read().mirrored
    }

    /// Current rotation.
    pub fn rotation(&self) -> Rotation {
        self.member.inner.state.read().rotation
    }

    /// Whether the source repeats to fill a duration longer than the asset.
    pub fn loop_media(&self) -> bool {
        self.member.inner.state.read().loop_media
    }

    /// Enable or disable looping.
    pub fn set_loop_media(&self, enabled: bool) {
        self.member.inner.state.write().loop_media = enabled;
    }

    /// Toggle the mirror flag. Audio members ignore this.
    pub fn mirror(&self) {
        if self.media_kind() == MediaKind::Video {
            let mut s = self.member.inner.state.write();
            s.mirrored = !s.mirrored;
        }
    }

    /// Step the rotation a quarter turn clockwise. Audio members ignore this.
    pub fn rotate_clockwise(&self) {
        if self.media_kind() == MediaKind::Video {
            let mut s = self.member.inner.state.write();
            s.rotation = s.rotation.next_clockwise();
        }
    }

    /// Step the rotation a quarter turn counter-clockwise. Audio members ignore this.
    pub fn rotate_counter_clockwise(&self) {
        if self.media_kind() == MediaKind::Video {
            let mut s = self.member.inner.state.write();
            s.rotation = s.rotation.next_counter_clockwise();
        }
    }

    /// Play the whole asset again, keeping the member where it is placed.
    pub fn reset_trim(&self) {
        let duration = self.asset().duration();
        let mut s = self.member.inner.state.write();
        s.start = Some(s.source_offset);
        s.end = Some(s.source_offset + duration);
    }

    /// Source time at `fraction` (clamped to `0..=1`) of the asset duration.
    pub fn source_time_at(&self, fraction: f64) -> MediaTime {
        let total = self.asset().duration();
        if total.is_infinite() {
            return total;
        }
        let f = fraction.clamp(0.0, 1.0);
        MediaTime::from_micros((total.as_micros() as f64 * f).round() as i64)
    }

    /// End time obtained by trimming `fraction` of the asset duration off the tail.
    pub fn trimmed_end_for(&self, fraction: f64) -> MediaTime {
        self.asset().duration() - self.source_time_at(fraction)
    }

    /// Independent copy with a new id.
    ///
    /// Audio copies start from the untrimmed asset; video copies keep trim, mirror and rotation.
    pub fn duplicate(&self) -> Self {
        match self.media_kind() {
            MediaKind::Audio => Self::audio(self.asset().clone(), false),
            MediaKind::Video => {
                let copy = Self::video(self.asset().clone());
                {
                    let src = self.member.inner.state.read().clone();
                    let mut dst = copy.member.inner.state.write();
                    dst.start = src.start;
                    dst.end = src.end;
                    dst.source_offset = src.source_offset;
                    dst.mirrored = src.mirrored;
                    dst.rotation = src.rotation;
                    dst.loop_media = src.loop_media;
                }
                copy
            }
        }
    }

    /// Place this member's media on `channel` (carrying `channel_kind`) starting at `at`.
    ///
    /// Nothing is inserted when the source lacks a `channel_kind` channel. Placement never
    /// extends past `at + duration` or past `max_time`. When looping and the requested duration
    /// exceeds the source, the whole source is repeated back to back.
    ///
    /// Returns the composition-time range actually covered, if any.
    pub fn insert_into<B: CompositionBuilder + ?Sized>(
        &self,
        builder: &mut B,
        channel: ChannelId,
        channel_kind: MediaKind,
        at: MediaTime,
        max_time: MediaTime,
    ) -> CutlineResult<Option<TimeRange>> {
        let media = self.asset().playable()?;
        if !media.has_channel(channel_kind) {
            tracing::trace!(member = %self.member, kind = %channel_kind, "source has no such channel");
            return Ok(None);
        }

        let range = self.member.source_range();
        let mut span = range.duration();
        if max_time.is_finite() {
            span = span.min(max_time - at);
        }
        if span <= MediaTime::ZERO {
            return Ok(None);
        }
        if span.is_infinite() {
            return Err(CutlineError::invalid_time(format!(
                "{} has no finite extent to place",
                self.member
            )));
        }

        let source_len = media.duration;
        let segment = |source: TimeRange| SourceSegment {
            asset_id: media.asset_id,
            path: media.path.clone(),
            kind: channel_kind,
            source,
        };

        if self.loop_media() && span > source_len {
            let loops = span.div_ceil(source_len).ok_or_else(|| {
                CutlineError::invalid_time(format!("cannot loop source of length {source_len}"))
            })?;
            let mut placed = MediaTime::ZERO;
            for i in 0..loops {
                let offset = source_len.saturating_mul(i as i64);
                let piece = source_len.min(span - offset);
                builder.insert(
                    segment(TimeRange {
                        start: MediaTime::ZERO,
                        end: piece,
                    }),
                    channel,
                    at + offset,
                )?;
                placed += piece;
            }
            return Ok(Some(TimeRange {
                start: at,
                end: at + placed,
            }));
        }

        let start = range.start.max(MediaTime::ZERO).min(source_len);
        let end = (start + span).min(source_len);
        if end <= start {
            return Ok(None);
        }
        builder.insert(segment(TimeRange { start, end }), channel, at)?;
        Ok(Some(TimeRange {
            start: at,
            end: at + (end - start),
        }))
    }
}

impl Deref for MediaMember {
    type Target = Member;

    fn deref(&self) -> &Member {
        &self.member
    }
}

impl PartialEq for MediaMember {
    fn eq(&self, other: &Self) -> bool {
        self.member == other.member
    }
}

impl Eq for MediaMember {}

impl From<MediaMember> for Member {
    fn from(m: MediaMember) -> Self {
        m.member
    }
}

/// A member carrying an effect with free-form parameters.
#[derive(Clone, Debug)]
pub struct EffectMember {
    member: Member,
    effect: Arc<EffectPayload>,
}

impl EffectMember {
    /// Effect of `kind` over `[start, end)`; `None` bounds leave the member open.
    pub fn new(
        kind: impl Into<String>,
        params: serde_json::Value,
        start: Option<MediaTime>,
        end: Option<MediaTime>,
    ) -> CutlineResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            TimeRange::new(s, e)?;
        }
        let effect = Arc::new(EffectPayload {
            kind: kind.into(),
            params: RwLock::new(params),
        });
        let member = Member::from_parts(
            TrackType::Effect,
            start,
            end,
            Payload::Effect(Arc::clone(&effect)),
        );
        Ok(Self { member, effect })
    }

    /// Effect kind identifier.
    pub fn kind(&self) -> &str {
        &self.effect.kind
    }

    /// Snapshot of the parameters.
    pub fn params(&self) -> serde_json::Value {
        self.effect.params.read().clone()
    }

    /// Replace the parameters.
    pub fn set_params(&self, params: serde_json::Value) {
        *self.effect.params.write() = params;
    }

    /// Base member handle.
    pub fn member(&self) -> &Member {
        &self.member
    }
}

impl Deref for EffectMember {
    type Target = Member;

    fn deref(&self) -> &Member {
        &self.member
    }
}

impl PartialEq for EffectMember {
    fn eq(&self, other: &Self) -> bool {
        self.member == other.member
    }
}

impl Eq for EffectMember {}

impl From<EffectMember> for Member {
    fn from(m: EffectMember) -> Self {
        m.member
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/member.rs"]
mod tests;
