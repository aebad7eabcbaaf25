use super::*;
use crate::{
    assets::media_asset::MediaAsset,
    compose::memory::InMemoryComposition,
    foundation::core::Rotation,
    timeline::member::EffectMember,
};

fn secs(s: i64) -> MediaTime {
    MediaTime::from_secs(s)
}

fn video(duration: i64) -> MediaMember {
    MediaMember::video(
        MediaAsset::ready(MediaKind::Video, secs(duration), "/media/v.mov").unwrap(),
    )
}

fn audio(duration: i64, repeats: bool) -> MediaMember {
    MediaMember::audio(
        MediaAsset::ready(MediaKind::Audio, secs(duration), "/media/a.m4a").unwrap(),
        repeats,
    )
}

#[test]
fn gapless_append_packs_against_track_end() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Gapless);
    let a = video(2);
    let b = video(10);
    b.set_start(secs(5)).unwrap();
    b.set_end(secs(8)).unwrap();

    track.append(a.member().clone()).unwrap();
    track.append(b.member().clone()).unwrap();

    assert_eq!(b.start(), Some(secs(2)));
    assert_eq!(b.end(), Some(secs(5)));
    assert_eq!(track.time_range().end, secs(5));
    assert_eq!(track.total_duration(), secs(5));
}

#[test]
fn gapless_append_rejects_unbounded() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Gapless);
    let err = track.append(audio(2, true).into()).unwrap_err();
    assert!(matches!(err, CutlineError::CannotAddUnbounded));
    assert!(track.is_empty());
}

#[test]
fn single_track_replaces_on_add() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Single);
    let first = video(1);
    let second = video(2);
    track.add_at_closest_valid_time(first.into()).unwrap();
    track
        .add_at_closest_valid_time(second.member().clone())
        .unwrap();
    let members = track.members();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id(), second.id());
}

#[test]
fn type_mismatch_is_rejected() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Gapless);
    let fx = EffectMember::new("glow", serde_json::Value::Null, None, None).unwrap();
    assert!(matches!(
        track.add_at_closest_valid_time(fx.into()),
        Err(CutlineError::TypeMismatch(_))
    ));

    let audio_track = MediaTrack::new(MediaKind::Audio, PlacementBehavior::Gapless);
    assert!(matches!(
        audio_track.append(video(1).into()),
        Err(CutlineError::TypeMismatch(_))
    ));
}

#[test]
fn remove_is_noop_when_absent_and_notifies_when_present() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Gapless);
    let a = video(1);
    track.append(a.member().clone()).unwrap();
    let mut rx = track.subscribe();

    assert!(!track.remove_by_id(Uuid::new_v4()));
    assert!(!rx.has_changed().unwrap());

    assert!(track.remove(&a));
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_empty());
}

#[test]
fn list_surgery_keeps_caller_order() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Gapless);
    let (a, b, c) = (video(1), video(1), video(1));
    track.add_at_closest_valid_time(a.member().clone()).unwrap();
    track.add_at_closest_valid_time(b.member().clone()).unwrap();
    track.insert_member(c.member().clone(), 0).unwrap();
    track.move_member(2, 1).unwrap();

    let ids: Vec<_> = track.members().iter().map(Member::id).collect();
    assert_eq!(ids, vec![c.id(), b.id(), a.id()]);
    assert!(track.move_member(0, 3).is_err());
    assert!(track.insert_member(video(1).into(), 9).is_err());

    track.remove_all_members();
    assert!(track.is_empty());
}

#[test]
fn insertion_time_snaps_to_nearest_boundary() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Gapless);
    assert_eq!(track.insertion_time(secs(7)), MediaTime::ZERO);

    track.append(video(4).into()).unwrap();
    track.append(video(4).into()).unwrap();

    assert_eq!(track.insertion_time(secs(1)), MediaTime::ZERO);
    assert_eq!(track.insertion_time(secs(3)), secs(4));
    assert_eq!(track.insertion_time(secs(2)), secs(4));
    assert_eq!(track.insertion_time(secs(5)), secs(4));
    assert_eq!(track.insertion_time(secs(20)), secs(8));

    let free = Track::new(TrackType::Media, PlacementBehavior::Single);
    assert_eq!(free.insertion_time(secs(3)), secs(3));
}

#[test]
fn display_lists_members() {
    let track = Track::new(TrackType::Media, PlacementBehavior::Gapless);
    track.set_debug_name("spine");
    let m = video(1);
    m.set_debug_name("a");
    track.append(m.into()).unwrap();
    let text = track.to_string();
    assert!(text.starts_with("Track(id: spine, type: media, behavior: Gapless"));
    assert!(text.contains("Member(id: a"));
}

#[test]
fn video_track_lowers_into_video_and_audio_channels() {
    let track = MediaTrack::new(MediaKind::Video, PlacementBehavior::Gapless);
    track.set_volume(0.5);
    let a = video(2);
    let b = video(3);
    b.rotate_clockwise();
    track.append(a.member().clone()).unwrap();
    track.append(b.member().clone()).unwrap();

    let mut builder = InMemoryComposition::default();
    let mut parts = MixParts::default();
    track
        .lower(&mut builder, &mut parts, MediaTime::POSITIVE_INFINITY)
        .unwrap();

    let channels = builder.channels();
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].kind, MediaKind::Video);
    assert_eq!(channels[0].segments.len(), 2);
    assert_eq!(channels[0].segments[1].at, secs(2));
    assert_eq!(channels[1].gains[0].gain, 0.5);

    assert_eq!(parts.audio.inputs.len(), 1);
    assert_eq!(parts.audio.inputs[0].range.end, secs(5));
    assert_eq!(parts.video.instructions.len(), 2);
    assert_eq!(parts.video.instructions[1].rotation, Rotation::Deg90);
    assert!(parts.video.has_transforms());
}

#[test]
fn unbounded_audio_track_fills_to_limit() {
    let track = MediaTrack::new(MediaKind::Audio, PlacementBehavior::Single);
    track
        .add_at_closest_valid_time(audio(2, true).into())
        .unwrap();
    let mut builder = InMemoryComposition::default();
    let mut parts = MixParts::default();
    track.lower(&mut builder, &mut parts, secs(3)).unwrap();

    let segs = &builder.channels()[0].segments;
    assert_eq!(segs.len(), 2);
    assert_eq!(segs[1].at, secs(2));
    assert_eq!(segs[1].segment.duration(), secs(1));
}

#[test]
fn channel_failure_aborts_lowering() {
    use crate::compose::memory::InMemoryCompositionOpts;

    let track = MediaTrack::new(MediaKind::Video, PlacementBehavior::Gapless);
    track.append(video(1).into()).unwrap();
    let mut builder = InMemoryComposition::new(InMemoryCompositionOpts {
        max_channels: Some(1),
    });
    let mut parts = MixParts::default();
    let err = track
        .lower(&mut builder, &mut parts, MediaTime::POSITIVE_INFINITY)
        .unwrap_err();
    assert!(matches!(err, CutlineError::FailedToCreateChannel(_)));
}
