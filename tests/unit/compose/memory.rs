use std::path::PathBuf;

use super::*;

fn segment(kind: MediaKind, secs: i64) -> SourceSegment {
    SourceSegment {
        asset_id: uuid::Uuid::new_v4(),
        path: PathBuf::from("/media/a.mov"),
        kind,
        source: TimeRange::new(MediaTime::ZERO, MediaTime::from_secs(secs)).unwrap(),
    }
}

#[test]
fn channel_limit_surfaces_creation_failure() {
    let mut b = InMemoryComposition::new(InMemoryCompositionOpts {
        max_channels: Some(1),
    });
    b.create_channel(MediaKind::Video).unwrap();
    let err = b.create_channel(MediaKind::Audio).unwrap_err();
    assert!(matches!(err, CutlineError::FailedToCreateChannel(_)));
}

#[test]
fn records_segments_and_gains() {
    let mut b = InMemoryComposition::default();
    let v = b.create_channel(MediaKind::Video).unwrap();
    let a = b.create_channel(MediaKind::Audio).unwrap();
    b.insert(segment(MediaKind::Video, 2), v, MediaTime::ZERO)
        .unwrap();
    b.insert(segment(MediaKind::Video, 3), v, MediaTime::from_secs(2))
        .unwrap();
    b.set_gain(
        a,
        0.5,
        TimeRange::new(MediaTime::ZERO, MediaTime::from_secs(5)).unwrap(),
    )
    .unwrap();

    let out = b.finish().unwrap();
    assert_eq!(out.duration(), MediaTime::from_secs(5));
    assert_eq!(out.channel(v).unwrap().segments.len(), 2);
    assert_eq!(out.channel(a).unwrap().gains[0].gain, 0.5);
    assert_eq!(out.channels_of(MediaKind::Audio).count(), 1);
    assert!(out.to_json_pretty().unwrap().contains("\"kind\": \"video\""));
}

#[test]
fn rejects_wrong_kind_and_unknown_channel() {
    let mut b = InMemoryComposition::default();
    let a = b.create_channel(MediaKind::Audio).unwrap();
    assert!(matches!(
        b.insert(segment(MediaKind::Video, 1), a, MediaTime::ZERO),
        Err(CutlineError::TypeMismatch(_))
    ));
    assert!(matches!(
        b.insert(segment(MediaKind::Audio, 1), ChannelId(9), MediaTime::ZERO),
        Err(CutlineError::Validation(_))
    ));
}
