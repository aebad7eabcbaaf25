use super::*;
use crate::compose::memory::{InMemoryComposition, InMemoryCompositionOpts};

fn secs(s: i64) -> MediaTime {
    MediaTime::from_secs(s)
}

fn ready_video(duration: i64) -> MediaAsset {
    MediaAsset::ready(MediaKind::Video, secs(duration), "/media/clip.mov").unwrap()
}

fn ready_audio(duration: i64) -> MediaAsset {
    MediaAsset::ready(MediaKind::Audio, secs(duration), "/media/song.m4a").unwrap()
}

#[test]
fn set_start_round_trips_inside_range_and_rejects_outside() {
    let m = MediaMember::video(ready_video(10));
    m.set_start(secs(3)).unwrap();
    assert_eq!(m.start(), Some(secs(3)));

    assert!(matches!(
        m.set_start(secs(11)),
        Err(CutlineError::InvalidTime(_))
    ));
    assert!(m.set_start(MediaTime::from_millis(-1)).is_err());
    assert_eq!(m.start(), Some(secs(3)));
}

#[test]
fn set_end_is_bounded_by_start_and_source() {
    let m = MediaMember::video(ready_video(10));
    m.set_start(secs(2)).unwrap();
    assert!(m.set_end(secs(1)).is_err());
    assert!(m.set_end(secs(11)).is_err());
    m.set_end(secs(8)).unwrap();
    assert_eq!(m.duration(), secs(6));
}

#[test]
fn offset_shifts_bounded_and_ignores_unbounded() {
    let m = MediaMember::video(ready_video(4));
    m.offset(secs(2));
    assert_eq!(m.time_range(), TimeRange::new(secs(2), secs(6)).unwrap());

    let looped = MediaMember::audio(ready_audio(4), true);
    looped.offset(secs(2));
    assert_eq!(looped.start(), None);
    assert!(!looped.is_bounded());
    assert_eq!(looped.duration(), MediaTime::POSITIVE_INFINITY);
}

#[test]
fn contains_is_half_open() {
    let m = MediaMember::video(ready_video(3));
    assert!(m.contains(MediaTime::ZERO));
    assert!(!m.contains(secs(3)));
}

#[test]
fn mirror_and_rotation_only_affect_video() {
    let v = MediaMember::video(ready_video(1));
    v.mirror();
    v.rotate_clockwise();
    v.rotate_clockwise();
    assert!(v.is_mirrored());
    assert_eq!(v.rotation(), Rotation::Deg180);

    let a = MediaMember::audio(ready_audio(1), false);
    a.mirror();
    a.rotate_counter_clockwise();
    assert!(!a.is_mirrored());
    assert_eq!(a.rotation(), Rotation::Deg0);
}

#[test]
fn trim_helpers_use_asset_duration() {
    let m = MediaMember::video(ready_video(10));
    assert_eq!(m.source_time_at(0.25), MediaTime::from_millis(2500));
    assert_eq!(m.trimmed_end_for(0.25), MediaTime::from_millis(7500));
    m.set_start(secs(1)).unwrap();
    m.set_end(secs(2)).unwrap();
    m.reset_trim();
    assert_eq!(m.time_range(), TimeRange::new(MediaTime::ZERO, secs(10)).unwrap());
}

#[test]
fn duplicate_gets_new_id_and_keeps_video_look() {
    let m = MediaMember::video(ready_video(10));
    m.mirror();
    m.set_end(secs(5)).unwrap();
    let copy = m.duplicate();
    assert_ne!(copy.id(), m.id());
    assert!(copy.is_mirrored());
    assert_eq!(copy.end(), Some(secs(5)));
}

#[test]
fn views_round_trip_through_base_member() {
    let fx = EffectMember::new("blur", serde_json::json!({"radius": 4}), None, None).unwrap();
    let base: Member = fx.clone().into();
    assert!(base.as_media().is_none());
    let again = base.as_effect().unwrap();
    again.set_params(serde_json::json!({"radius": 8}));
    assert_eq!(fx.params()["radius"], 8);
    assert_eq!(fx.kind(), "blur");
    assert_eq!(base.track_type(), TrackType::Effect);
}

#[test]
fn display_uses_debug_name() {
    let m = MediaMember::video(ready_video(2));
    m.set_debug_name("intro");
    assert_eq!(m.to_string(), "Member(id: intro, s: 0.000s, e: 2.000s)");
}

#[test]
fn insertion_skips_missing_channel() {
    let m = MediaMember::audio(ready_audio(3), false);
    let mut b = InMemoryComposition::new(InMemoryCompositionOpts::default());
    let ch = b.create_channel(MediaKind::Video).unwrap();
    let placed = m
        .insert_into(&mut b, ch, MediaKind::Video, MediaTime::ZERO, secs(3))
        .unwrap();
    assert!(placed.is_none());
    assert!(b.channels()[0].segments.is_empty());
}

#[test]
fn insertion_of_unready_asset_fails() {
    let m = MediaMember::video(MediaAsset::new(MediaKind::Video, secs(3)));
    let mut b = InMemoryComposition::default();
    let ch = b.create_channel(MediaKind::Video).unwrap();
    assert!(matches!(
        m.insert_into(&mut b, ch, MediaKind::Video, MediaTime::ZERO, secs(3)),
        Err(CutlineError::AssetNotReady(_))
    ));
}

#[test]
fn trimmed_insertion_places_source_range() {
    let m = MediaMember::video(ready_video(10));
    m.set_start(secs(2)).unwrap();
    m.set_end(secs(5)).unwrap();
    let mut b = InMemoryComposition::default();
    let ch = b.create_channel(MediaKind::Video).unwrap();
    let placed = m
        .insert_into(&mut b, ch, MediaKind::Video, secs(4), MediaTime::POSITIVE_INFINITY)
        .unwrap()
        .unwrap();
    assert_eq!(placed, TimeRange::new(secs(4), secs(7)).unwrap());
    let seg = &b.channels()[0].segments[0];
    assert_eq!(seg.at, secs(4));
    assert_eq!(seg.segment.source, TimeRange::new(secs(2), secs(5)).unwrap());
}

#[test]
fn looping_member_repeats_source_and_truncates_at_limit() {
    let m = MediaMember::audio(ready_audio(2), true);
    let mut b = InMemoryComposition::default();
    let ch = b.create_channel(MediaKind::Audio).unwrap();
    let placed = m
        .insert_into(&mut b, ch, MediaKind::Audio, MediaTime::ZERO, secs(5))
        .unwrap()
        .unwrap();
    assert_eq!(placed.end, secs(5));

    let segs = &b.channels()[0].segments;
    assert_eq!(segs.len(), 3);
    assert_eq!(segs[1].at, secs(2));
    assert_eq!(segs[2].at, secs(4));
    assert_eq!(segs[2].segment.source.end, secs(1));
}

#[test]
fn unbounded_member_without_limit_is_rejected() {
    let m = MediaMember::audio(ready_audio(2), true);
    let mut b = InMemoryComposition::default();
    let ch = b.create_channel(MediaKind::Audio).unwrap();
    assert!(matches!(
        m.insert_into(&mut b, ch, MediaKind::Audio, MediaTime::ZERO, MediaTime::POSITIVE_INFINITY),
        Err(CutlineError::InvalidTime(_))
    ));
}

#[test]
fn offset_moves_placement_but_not_source() {
    let m = MediaMember::video(ready_video(10));
    m.set_start(secs(5)).unwrap();
    m.set_end(secs(8)).unwrap();
    m.offset(secs(-3));

    assert_eq!(m.time_range(), TimeRange::new(secs(2), secs(5)).unwrap());
    assert_eq!(m.source_range(), TimeRange::new(secs(5), secs(8)).unwrap());

    // source limit moves with the member
    assert!(m.set_end(secs(8)).is_err());
    m.set_end(secs(7)).unwrap();
    assert_eq!(m.source_range().end, secs(10));
}
