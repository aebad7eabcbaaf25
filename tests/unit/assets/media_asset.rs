use super::*;

#[test]
fn playable_requires_ready_status_and_path() {
    let asset = MediaAsset::new(MediaKind::Video, MediaTime::from_secs(4));
    assert!(matches!(
        asset.playable(),
        Err(CutlineError::AssetNotReady(id)) if id == asset.id()
    ));

    asset.set_local_path("/tmp/clip.mov").unwrap();
    assert!(asset.playable().is_err());

    asset.set_status(AssetStatus::Ready);
    let media = asset.playable().unwrap();
    assert_eq!(media.path, PathBuf::from("/tmp/clip.mov"));
    assert_eq!(media.duration, MediaTime::from_secs(4));
    assert!(media.has_channel(MediaKind::Audio));
}

#[test]
fn relative_paths_are_rejected() {
    let asset = MediaAsset::new(MediaKind::Audio, MediaTime::from_secs(1));
    let err = asset.set_local_path("clips/a.m4a").unwrap_err();
    assert!(matches!(err, CutlineError::InvalidAssetPath(_)));
    assert!(asset.local_path().is_none());
}

#[test]
fn clones_share_status() {
    let asset = MediaAsset::new(MediaKind::Video, MediaTime::from_secs(1));
    let other = asset.clone();
    let mut rx = other.subscribe_status();
    asset.set_status(AssetStatus::Downloading);
    assert_eq!(other.status(), AssetStatus::Downloading);
    assert!(rx.has_changed().unwrap());
    assert!(asset.ptr_eq(&other));
}

#[test]
fn json_round_trip_preserves_identity() {
    let asset = MediaAsset::ready(MediaKind::Video, MediaTime::from_millis(2500), "/media/a.mov")
        .unwrap();
    asset.mark_deleted(true);
    let json = serde_json::to_string(&asset).unwrap();
    let back: MediaAsset = serde_json::from_str(&json).unwrap();
    assert_eq!(back, asset);
    assert!(!back.ptr_eq(&asset));
    assert_eq!(back.info(), asset.info());
}

#[test]
fn deserialising_a_relative_path_fails() {
    let json = format!(
        r#"{{"id":"{}","kind":"audio","status":"ready","local_path":"x.m4a","duration":1000}}"#,
        uuid::Uuid::new_v4()
    );
    assert!(serde_json::from_str::<MediaAsset>(&json).is_err());
}

#[test]
fn missing_channels_default_to_primary_kind() {
    let info = MediaAssetInfo {
        id: uuid::Uuid::new_v4(),
        kind: MediaKind::Video,
        status: AssetStatus::Unavailable,
        local_path: None,
        duration: MediaTime::from_secs(1),
        channels: BTreeSet::new(),
        deleted: false,
    };
    let asset = MediaAsset::from_info(info).unwrap();
    assert!(asset.has_channel(MediaKind::Video));
    assert!(!asset.has_channel(MediaKind::Audio));
}
