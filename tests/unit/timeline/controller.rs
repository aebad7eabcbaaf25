use super::*;
use crate::{
    assets::media_asset::MediaAsset,
    compose::memory::{InMemoryComposition, InMemoryCompositionOpts},
    timeline::{
        member::{EffectMember, MediaMember},
        project::Project,
        track::PlacementBehavior,
    },
};

fn secs(s: i64) -> MediaTime {
    MediaTime::from_secs(s)
}

fn video(duration: i64) -> MediaMember {
    MediaMember::video(
        MediaAsset::ready(MediaKind::Video, secs(duration), "/media/v.mov").unwrap(),
    )
}

#[test]
fn tracks_are_grouped_by_family() {
    let ctl = TrackController::new();
    let v = Arc::new(MediaTrack::new(MediaKind::Video, PlacementBehavior::Gapless));
    let a = Arc::new(MediaTrack::new(MediaKind::Audio, PlacementBehavior::Single));
    let fx = Arc::new(EffectTrack::new(PlacementBehavior::Single));
    ctl.add_track(Arc::clone(&v));
    ctl.add_track(Arc::clone(&a));
    ctl.add_track(Arc::clone(&fx));

    assert_eq!(ctl.current_tracks().len(), 3);
    assert_eq!(ctl.tracks_of(TrackType::Media).len(), 2);
    assert_eq!(ctl.tracks_of(TrackType::Effect).len(), 1);
    assert_eq!(ctl.media_tracks_of(MediaKind::Audio)[0].id(), a.id());

    assert!(ctl.remove_track(&TrackHandle::from(Arc::clone(&a))));
    assert!(!ctl.remove_track(&TrackHandle::from(a)));
    assert!(ctl.media_tracks_of(MediaKind::Audio).is_empty());
}

#[test]
fn duration_ignores_unbounded_tracks() {
    let ctl = TrackController::new();
    let v = Arc::new(MediaTrack::new(MediaKind::Video, PlacementBehavior::Gapless));
    v.append(video(4).into()).unwrap();
    v.append(video(3).into()).unwrap();
    let fx = Arc::new(EffectTrack::new(PlacementBehavior::Single));
    fx.add_at_closest_valid_time(
        EffectMember::new("grain", serde_json::Value::Null, None, None)
            .unwrap()
            .into(),
    )
    .unwrap();
    ctl.add_track(v);
    ctl.add_track(fx);

    assert_eq!(ctl.current_duration(), secs(7));
}

#[test]
fn subscribers_see_track_list_changes() {
    let ctl = TrackController::new();
    let mut rx = ctl.subscribe_media_tracks();
    ctl.add_track(Arc::new(MediaTrack::new(
        MediaKind::Video,
        PlacementBehavior::Gapless,
    )));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 1);
}

#[test]
fn build_mix_lowers_all_media_tracks() {
    let ctl = TrackController::new();
    let v = Arc::new(MediaTrack::new(MediaKind::Video, PlacementBehavior::Gapless));
    v.append(video(2).into()).unwrap();
    ctl.add_track(v);

    let mix = ctl.build_mix(InMemoryComposition::default()).unwrap();
    assert_eq!(mix.timeline.channels.len(), 2);
    assert_eq!(mix.timeline.duration(), secs(2));
    assert!(mix.audio_mix.is_some());
    assert!(mix.video_composition.is_none());
}

#[test]
fn looping_music_spans_the_whole_project_spine() {
    let mut project = Project::new(secs(60));
    project.add(video(3)).unwrap();
    project.add(video(2)).unwrap();
    let music = Arc::new(MediaTrack::new(MediaKind::Audio, PlacementBehavior::Single));
    music
        .add_at_closest_valid_time(
            MediaMember::audio(
                MediaAsset::ready(MediaKind::Audio, secs(2), "/media/song.m4a").unwrap(),
                true,
            )
            .into(),
        )
        .unwrap();
    let ctl = project.track_controller();
    ctl.add_track(music);

    // project clips are not packed on the track, but lowering lays them end to end
    assert_eq!(ctl.current_duration(), secs(3));
    assert_eq!(ctl.laid_out_duration(), secs(5));

    let mix = ctl.build_mix(InMemoryComposition::default()).unwrap();
    let music_channel = mix.timeline.channels.last().unwrap();
    assert_eq!(music_channel.kind, MediaKind::Audio);
    assert_eq!(music_channel.segments.len(), 3);
    assert_eq!(music_channel.end(), secs(5));
    assert_eq!(mix.timeline.duration(), secs(5));
    let gains = &mix.audio_mix.unwrap().inputs;
    assert!(gains.iter().all(|g| g.range.end == secs(5)));
}

#[test]
fn laid_out_duration_skips_unbounded_tracks() {
    let ctl = TrackController::new();
    assert_eq!(ctl.laid_out_duration(), MediaTime::ZERO);
    let music = Arc::new(MediaTrack::new(MediaKind::Audio, PlacementBehavior::Single));
    music
        .add_at_closest_valid_time(
            MediaMember::audio(
                MediaAsset::ready(MediaKind::Audio, secs(2), "/media/song.m4a").unwrap(),
                true,
            )
            .into(),
        )
        .unwrap();
    ctl.add_track(music);
    assert_eq!(ctl.laid_out_duration(), MediaTime::ZERO);
}

#[test]
fn build_failure_is_a_distinct_error() {
    let ctl = TrackController::new();
    let v = Arc::new(MediaTrack::new(MediaKind::Video, PlacementBehavior::Gapless));
    v.append(video(2).into()).unwrap();
    ctl.add_track(v);

    let err = ctl
        .build_mix(InMemoryComposition::new(InMemoryCompositionOpts {
            max_channels: Some(0),
        }))
        .unwrap_err();
    match err {
        CutlineError::MixBuild { source } => {
            assert!(matches!(*source, CutlineError::FailedToCreateChannel(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
