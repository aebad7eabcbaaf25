use super::*;
use serde_json::json;

#[test]
fn add_update_and_remove_features() {
    let features = FeatureManager::new();
    let mut rx = features.subscribe();

    features.add_or_update("face_count", json!(1));
    features.add_or_update("face_count", json!(2));
    assert_eq!(features.get("face_count"), Some(json!(2)));
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 1);

    assert_eq!(features.remove("missing"), None);
    assert!(!rx.has_changed().unwrap());

    assert_eq!(features.remove("face_count"), Some(json!(2)));
    assert!(features.current_features().is_empty());
}

#[test]
fn manual_orientation_only_notifies_on_change() {
    let source = ManualOrientation::new(Orientation::Portrait);
    let mut rx = source.subscribe();
    source.set(Orientation::Portrait);
    assert!(!rx.has_changed().unwrap());

    source.set(Orientation::LandscapeLeft);
    assert!(rx.has_changed().unwrap());
    rx.mark_unchanged();
    assert_eq!(source.current_orientation(), Orientation::LandscapeLeft);
}
