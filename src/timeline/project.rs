use std::{collections::HashMap, sync::Arc};

use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::{
    assets::media_asset::MediaAsset,
    compose::{builder::CompositionBuilder, mix::TrackMix},
    foundation::{
        core::MediaKind,
        error::{CutlineError, CutlineResult},
        observe::EventHub,
        time::MediaTime,
    },
    timeline::{
        controller::TrackController,
        member::{MediaMember, Member},
        track::{MediaTrack, PlacementBehavior},
    },
};

/// A recording/editing session: the canonical edit order of media members plus the tracks
/// derived from it.
///
/// The flat member list, the per-asset reference map and the internal gapless video track are
/// kept in sync by every mutating method. `Project` is not internally synchronised; mutation
/// takes `&mut self`.
#[derive(Debug)]
pub struct Project {
    id: Uuid,
    recording_limit: MediaTime,
    members: Vec<MediaMember>,
    asset_refs: HashMap<Uuid, (MediaAsset, Vec<Uuid>)>,
    tracks: TrackController,
    video_track: Arc<MediaTrack>,
    deletions: EventHub<MediaAsset>,
}

impl Project {
    /// Empty project with a fresh id.
    pub fn new(recording_limit: MediaTime) -> Self {
        Self::with_id(Uuid::new_v4(), recording_limit)
    }

    /// Empty project with a caller-chosen id.
    pub fn with_id(id: Uuid, recording_limit: MediaTime) -> Self {
        let tracks = TrackController::new();
        let video_track = Arc::new(MediaTrack::new(MediaKind::Video, PlacementBehavior::Gapless));
        video_track.set_debug_name(format!("project-{id}-video"));
        tracks.add_track(Arc::clone(&video_track));
        Self {
            id,
            recording_limit,
            members: Vec::new(),
            asset_refs: HashMap::new(),
            tracks,
            video_track,
            deletions: EventHub::new(),
        }
    }

    /// Project id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Maximum total recording time.
    pub fn recording_limit(&self) -> MediaTime {
        self.recording_limit
    }

    /// Members in edit order.
    pub fn members(&self) -> &[MediaMember] {
        &self.members
    }

    /// Tracks owned by the project.
    pub fn track_controller(&self) -> &TrackController {
        &self.tracks
    }

    /// Snapshot of the internal video track, in track order.
    pub fn video_members(&self) -> Vec<Member> {
        self.video_track.members()
    }

    /// Receiver of every subsequent video track snapshot.
    pub fn subscribe_video_members(&self) -> watch::Receiver<Vec<Member>> {
        self.video_track.subscribe()
    }

    /// Back-to-back length of the video members.
    pub fn video_spine_duration(&self) -> MediaTime {
        self.video_track.total_duration()
    }

    /// Assets referenced by at least one member.
    pub fn member_assets(&self) -> Vec<MediaAsset> {
        self.asset_refs.values().map(|(a, _)| a.clone()).collect()
    }

    /// Receive every asset whose last referencing member is removed.
    pub fn subscribe_deletions(&self) -> mpsc::UnboundedReceiver<MediaAsset> {
        self.deletions.subscribe()
    }

    fn retain_asset(&mut self, member: &MediaMember) {
        self.asset_refs
            .entry(member.asset().id())
            .or_insert_with(|| (member.asset().clone(), Vec::new()))
            .1
            .push(member.id());
    }

    // video members that precede flat index `index`
    fn video_index(&self, index: usize) -> usize {
        self.members[..index]
            .iter()
            .filter(|m| m.media_kind() == MediaKind::Video)
            .count()
    }

    /// Append `member`.
    ///
    /// Video members also join the internal video track; a track error leaves the project
    /// unchanged and is returned.
    #[tracing::instrument(skip(self, member), fields(member = %member.id()))]
    pub fn add(&mut self, member: MediaMember) -> CutlineResult<()> {
        if member.media_kind() == MediaKind::Video {
            self.video_track
                .add_at_closest_valid_time(member.member().clone())?;
        }
        self.retain_asset(&member);
        self.members.push(member);
        Ok(())
    }

    /// Insert `member` at flat-list position `index`, keeping the video track order in step.
    #[tracing::instrument(skip(self, member), fields(member = %member.id()))]
    pub fn insert(&mut self, member: MediaMember, index: usize) -> CutlineResult<()> {
        if index > self.members.len() {
            return Err(CutlineError::validation(format!(
                "insert at {index} out of bounds for {} members",
                self.members.len()
            )));
        }
        if member.media_kind() == MediaKind::Video {
            let at = self.video_index(index);
            self.video_track.insert_member(member.member().clone(), at)?;
        }
        self.retain_asset(&member);
        self.members.insert(index, member);
        Ok(())
    }

    /// Remove `member`. Returns `false` when the project does not reference it.
    ///
    /// When this was the last member referencing its asset, the asset is published to
    /// [`Project::subscribe_deletions`] receivers.
    #[tracing::instrument(skip(self, member), fields(member = %member.id()))]
    pub fn remove(&mut self, member: &MediaMember) -> bool {
        let asset_id = member.asset().id();
        let Some((asset, refs)) = self.asset_refs.get_mut(&asset_id) else {
            return false;
        };
        let before = refs.len();
        refs.retain(|id| *id != member.id());
        if refs.len() == before {
            return false;
        }
        if refs.is_empty() {
            let asset = asset.clone();
            self.asset_refs.remove(&asset_id);
            tracing::debug!(asset = %asset_id, "last reference removed");
            self.deletions.emit(asset);
        }
        self.members.retain(|m| m.id() != member.id());
        if member.media_kind() == MediaKind::Video {
            self.video_track.remove_by_id(member.id());
        }
        true
    }

    /// Remove every member, publishing one deletion per referenced asset.
    pub fn remove_all(&mut self) {
        self.members.clear();
        for (_, (asset, _)) in self.asset_refs.drain() {
            self.deletions.emit(asset);
        }
        self.video_track.remove_all_members();
    }

    /// Move the member at flat index `from` to `to`, keeping the video track order in step.
    pub fn move_member(&mut self, from: usize, to: usize) -> CutlineResult<()> {
        let len = self.members.len();
        if from >= len || to >= len {
            return Err(CutlineError::validation(format!(
                "move {from} -> {to} out of bounds for {len} members"
            )));
        }
        let is_video = self.members[from].media_kind() == MediaKind::Video;
        let from_video = self.video_index(from);
        let member = self.members.remove(from);
        self.members.insert(to, member);
        if is_video {
            let to_video = self.video_index(to);
            self.video_track.move_member(from_video, to_video)?;
        }
        Ok(())
    }

    /// Trim `member` from both ends of its source.
    ///
    /// `start_offset` is measured from the head of the source and `end_offset` from its tail.
    /// A member already shifted on its track keeps that shift.
    pub fn update_trim(
        &mut self,
        member: &MediaMember,
        start_offset: Option<MediaTime>,
        end_offset: Option<MediaTime>,
    ) -> CutlineResult<()> {
        let shift = member.time_range().start - member.source_range().start;
        if let Some(head) = start_offset {
            member.set_start(head + shift)?;
        }
        if let Some(tail) = end_offset {
            member.set_end(member.source_duration() + shift - tail)?;
        }
        Ok(())
    }

    /// Sum of every member's duration, video and audio alike.
    pub fn video_duration(&self) -> MediaTime {
        self.members.iter().map(|m| m.duration()).sum()
    }

    /// Recording time left before reaching the limit.
    pub fn remaining_recording_time(&self) -> MediaTime {
        (self.recording_limit - self.video_duration()).max(MediaTime::ZERO)
    }

    /// Start of each member when members are played back to back in edit order.
    pub fn first_frame_timestamps(&self) -> Vec<MediaTime> {
        self.members
            .iter()
            .scan(MediaTime::ZERO, |next, m| {
                let start = *next;
                *next += m.duration();
                Some(start)
            })
            .collect()
    }

    /// Member playing at `t` in back-to-back playback, `None` outside `[0, video_duration)`.
    pub fn member_at(&self, t: MediaTime) -> Option<&MediaMember> {
        if t < MediaTime::ZERO || t >= self.video_duration() {
            return None;
        }
        let stamps = self.first_frame_timestamps();
        let idx = stamps.partition_point(|s| *s <= t).checked_sub(1)?;
        self.members.get(idx)
    }

    /// Compile the project's tracks into a playable/exportable mix.
    pub fn build_mix<B: CompositionBuilder>(
        &self,
        builder: B,
    ) -> CutlineResult<TrackMix<B::Timeline>> {
        self.tracks.build_mix(builder)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/project.rs"]
mod tests;
