use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::watch;

use crate::foundation::{core::Orientation, observe::Observable};

/// Keyed side-channel values handed to every layer on each update pass.
pub type FeatureMap = BTreeMap<String, Value>;

/// Supplier of the feature snapshot read once per update pass.
pub trait FeatureSource: Send + Sync {
    /// Current features.
    fn current_features(&self) -> FeatureMap;
}

/// Supplier of the device orientation read once per transformed frame.
pub trait OrientationSource: Send + Sync {
    /// Current orientation.
    fn current_orientation(&self) -> Orientation;
}

/// Mutable, observable feature store.
///
/// Layers and effects publish values here; the transform controller snapshots the whole map before
/// each layer update pass.
#[derive(Debug, Default)]
pub struct FeatureManager {
    features: Observable<FeatureMap>,
}

impl FeatureManager {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn add_or_update(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.features.modify(|map| {
            map.insert(key, value);
        });
    }

    /// Remove `key`, returning its value. Subscribers are only notified if the key existed.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut removed = None;
        self.features.modify_if(|map| {
            removed = map.remove(key);
            removed.is_some()
        });
        removed
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.features.with(|map| map.get(key).cloned())
    }

    /// Snapshot of all features.
    pub fn current(&self) -> FeatureMap {
        self.features.get()
    }

    /// Receiver of subsequent snapshots.
    pub fn subscribe(&self) -> watch::Receiver<FeatureMap> {
        self.features.subscribe()
    }
}

impl FeatureSource for FeatureManager {
    fn current_features(&self) -> FeatureMap {
        self.current()
    }
}

/// Orientation set by the host, e.g. from device motion callbacks.
#[derive(Debug, Default)]
pub struct ManualOrientation {
    value: Observable<Orientation>,
}

impl ManualOrientation {
    /// Source reporting `initial` until changed.
    pub fn new(initial: Orientation) -> Self {
        Self {
            value: Observable::new(initial),
        }
    }

    /// Report a new orientation. Subscribers are notified only on change.
    pub fn set(&self, orientation: Orientation) {
        self.value.modify_if(|current| {
            let changed = *current != orientation;
            *current = orientation;
            changed
        });
    }

    /// Receiver of subsequent orientations.
    pub fn subscribe(&self) -> watch::Receiver<Orientation> {
        self.value.subscribe()
    }
}

impl OrientationSource for ManualOrientation {
    fn current_orientation(&self) -> Orientation {
        self.value.get()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/features.rs"]
mod tests;
