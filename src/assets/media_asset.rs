use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

use crate::foundation::{
    core::MediaKind,
    error::{CutlineError, CutlineResult},
    observe::Observable,
    time::MediaTime,
};

/// Availability of an asset's backing media.
///
/// Status normally moves `Unavailable -> Downloading -> Ready` (or `Writing -> Ready` for
/// recordings), but observers must tolerate backwards transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Not available locally and not yet loading.
    #[default]
    Unavailable,
    /// Being fetched from a remote source.
    Downloading,
    /// Being written by a recording session.
    Writing,
    /// Fully available on local storage.
    Ready,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Plain snapshot of a [`MediaAsset`], used for (de)serialization.
pub struct MediaAssetInfo {
    /// Asset id.
    pub id: Uuid,
    /// Primary media kind.
    pub kind: MediaKind,
    /// Availability.
    #[serde(default)]
    pub status: AssetStatus,
    /// Absolute local file path, when the media exists locally.
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Native duration of the media.
    pub duration: MediaTime,
    /// Channels the media carries. Empty means "only `kind`".
    #[serde(default)]
    pub channels: BTreeSet<MediaKind>,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// What a ready asset hands to the composition layer.
pub struct PlayableMedia {
    /// Asset the media belongs to.
    pub asset_id: Uuid,
    /// Local file backing the media.
    pub path: PathBuf,
    /// Native duration.
    pub duration: MediaTime,
    /// Channels present in the file.
    pub channels: BTreeSet<MediaKind>,
}

impl PlayableMedia {
    /// Whether the media carries a channel of `kind`.
    pub fn has_channel(&self, kind: MediaKind) -> bool {
        self.channels.contains(&kind)
    }
}

struct AssetInner {
    id: Uuid,
    kind: MediaKind,
    duration: MediaTime,
    channels: BTreeSet<MediaKind>,
    status: Observable<AssetStatus>,
    local_path: RwLock<Option<PathBuf>>,
    deleted: AtomicBool,
}

/// Shared handle to a single piece of video or audio media.
///
/// Cloning is cheap and every clone observes the same status. Equality and hashing use the id.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "MediaAssetInfo", into = "MediaAssetInfo")]
pub struct MediaAsset {
    inner: Arc<AssetInner>,
}

impl MediaAsset {
    /// New asset of `kind` with a fresh id, status `Unavailable`, and no local file.
    ///
    /// Video assets are assumed to carry an audio channel as well; use
    /// [`MediaAsset::from_info`] to describe silent video.
    pub fn new(kind: MediaKind, duration: MediaTime) -> Self {
        let channels = match kind {
            MediaKind::Video => BTreeSet::from([MediaKind::Video, MediaKind::Audio]),
            MediaKind::Audio => BTreeSet::from([MediaKind::Audio]),
        };
        Self::from_parts(Uuid::new_v4(), kind, duration, channels, AssetStatus::Unavailable, None)
    }

    /// New asset that is already available at `path`.
    pub fn ready(kind: MediaKind, duration: MediaTime, path: impl Into<PathBuf>) -> CutlineResult<Self> {
        let asset = Self::new(kind, duration);
        asset.set_local_path(path)?;
        asset.set_status(AssetStatus::Ready);
        Ok(asset)
    }

    /// Rebuild an asset from a snapshot, validating the local path.
    pub fn from_info(info: MediaAssetInfo) -> CutlineResult<Self> {
        if let Some(path) = &info.local_path {
            validate_local_path(path)?;
        }
        let channels = if info.channels.is_empty() {
            BTreeSet::from([info.kind])
        } else {
            info.channels
        };
        let asset = Self::from_parts(
            info.id,
            info.kind,
            info.duration,
            channels,
            info.status,
            info.local_path,
        );
        asset.inner.deleted.store(info.deleted, Ordering::Relaxed);
        Ok(asset)
    }

    fn from_parts(
        id: Uuid,
        kind: MediaKind,
        duration: MediaTime,
        channels: BTreeSet<MediaKind>,
        status: AssetStatus,
        local_path: Option<PathBuf>,
    ) -> Self {
        Self {
            inner: Arc::new(AssetInner {
                id,
                kind,
                duration,
                channels,
                status: Observable::new(status),
                local_path: RwLock::new(local_path),
                deleted: AtomicBool::new(false),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn info(&self) -> MediaAssetInfo {
        MediaAssetInfo {
            id: self.inner.id,
            kind: self.inner.kind,
            status: self.status(),
            local_path: self.local_path(),
            duration: self.inner.duration,
            channels: self.inner.channels.clone(),
            deleted: self.is_deleted(),
        }
    }

    /// Asset id.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Primary media kind.
    pub fn kind(&self) -> MediaKind {
        self.inner.kind
    }

    /// Native duration of the source media.
    pub fn duration(&self) -> MediaTime {
        self.inner.duration
    }

    /// Whether the media carries a channel of `kind`.
    pub fn has_channel(&self, kind: MediaKind) -> bool {
        self.inner.channels.contains(&kind)
    }

    /// Current status.
    pub fn status(&self) -> AssetStatus {
        self.inner.status.get()
    }

    /// Whether the status is `Ready`.
    pub fn is_ready(&self) -> bool {
        self.status() == AssetStatus::Ready
    }

    /// Change the status and notify subscribers.
    pub fn set_status(&self, status: AssetStatus) {
        tracing::debug!(asset = %self.inner.id, ?status, "asset status changed");
        self.inner.status.set(status);
    }

    /// Stream of status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<AssetStatus> {
        self.inner.status.subscribe()
    }

    /// Local file path, if any.
    pub fn local_path(&self) -> Option<PathBuf> {
        self.inner.local_path.read().clone()
    }

    /// Point the asset at a local file. Relative paths are rejected.
    pub fn set_local_path(&self, path: impl Into<PathBuf>) -> CutlineResult<()> {
        let path = path.into();
        validate_local_path(&path)?;
        *self.inner.local_path.write() = Some(path);
        Ok(())
    }

    /// Soft-delete flag; a deleted asset is reclaimed by an external cleanup pass.
    pub fn is_deleted(&self) -> bool {
        self.inner.deleted.load(Ordering::Relaxed)
    }

    /// Set or clear the soft-delete flag.
    pub fn mark_deleted(&self, deleted: bool) {
        self.inner.deleted.store(deleted, Ordering::Relaxed);
    }

    /// Resolve the media for composition.
    ///
    /// Fails with [`CutlineError::AssetNotReady`] unless the status is `Ready` and a local path
    /// is set.
    pub fn playable(&self) -> CutlineResult<PlayableMedia> {
        let path = self.local_path();
        match path {
            Some(path) if self.is_ready() => Ok(PlayableMedia {
                asset_id: self.inner.id,
                path,
                duration: self.inner.duration,
                channels: self.inner.channels.clone(),
            }),
            _ => Err(CutlineError::AssetNotReady(self.inner.id)),
        }
    }

    /// Whether both handles point at the same shared asset state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

fn validate_local_path(path: &Path) -> CutlineResult<()> {
    if path.as_os_str().is_empty() || !path.is_absolute() {
        return Err(CutlineError::InvalidAssetPath(path.display().to_string()));
    }
    Ok(())
}

impl PartialEq for MediaAsset {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for MediaAsset {}

impl std::hash::Hash for MediaAsset {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl std::fmt::Debug for MediaAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAsset")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("status", &self.status())
            .field("duration", &self.inner.duration)
            .finish()
    }
}

impl From<MediaAsset> for MediaAssetInfo {
    fn from(asset: MediaAsset) -> Self {
        asset.info()
    }
}

impl TryFrom<MediaAssetInfo> for MediaAsset {
    type Error = CutlineError;

    fn try_from(info: MediaAssetInfo) -> Result<Self, Self::Error> {
        Self::from_info(info)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media_asset.rs"]
mod tests;
