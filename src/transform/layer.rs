use std::{collections::HashSet, sync::Arc};

use image::RgbaImage;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    foundation::{
        core::{Orientation, Point, Rect, RenderSize},
        observe::EventHub,
        time::MediaTime,
    },
    transform::{event::StackEvent, features::FeatureMap},
};

/// Inputs of one layer update pass.
#[derive(Clone, Copy, Debug)]
pub struct UpdateContext<'a> {
    /// Size of the final rendered frame.
    pub size: RenderSize,
    /// Current capture orientation.
    pub orientation: Orientation,
    /// Presentation time of the frame being transformed.
    pub time: MediaTime,
    /// Feature snapshot shared by every layer in the pass.
    pub features: &'a FeatureMap,
}

/// A visual stage composited over the extracted frame image.
///
/// Expensive work belongs in [`TransformLayer::update`]; [`TransformLayer::render`] runs on the
/// frame path and must return quickly.
pub trait TransformLayer: Send + Sync {
    /// Stable identity inside a stack.
    fn id(&self) -> Uuid;

    /// Name used in trace spans.
    fn debug_name(&self) -> &str;

    /// Whether the layer always sorts behind every other layer.
    ///
    /// Read once when the layer is added.
    fn stays_at_back(&self) -> bool {
        false
    }

    /// Hidden layers receive no update, render or hit-test calls.
    fn is_hidden(&self) -> bool {
        false
    }

    /// Set by the layer itself when it wants to leave the stack on the next update pass.
    fn should_remove(&self) -> bool {
        false
    }

    /// Called instead of [`TransformLayer::update`] on the pass that removes this layer.
    fn prepare_for_removal(&self) {}

    /// Refresh internal state ahead of rendering.
    fn update(&self, ctx: &UpdateContext<'_>);

    /// Composite onto `input`, the accumulation of every layer below. `None` skips this layer.
    fn render(&self, input: &RgbaImage) -> Option<RgbaImage>;

    /// Whether a tap at `point` inside `rect` selects this layer.
    fn hit_test(&self, _point: Point, _rect: Rect) -> bool {
        false
    }
}

#[derive(Clone)]
struct LayerEntry {
    layer: Arc<dyn TransformLayer>,
    z: i64,
    pinned: bool,
}

/// Z-ordered collection of [`TransformLayer`]s.
///
/// Layers are kept sorted with back-pinned layers first and then by ascending z-index. All
/// reordering is done by changing z-indices, never by moving list entries directly.
pub struct TransformLayerStack {
    entries: Mutex<Vec<LayerEntry>>,
    events: EventHub<StackEvent>,
}

impl TransformLayerStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            events: EventHub::new(),
        }
    }

    fn sort(entries: &mut [LayerEntry]) {
        entries.sort_by_key(|e| (!e.pinned, e.z));
    }

    fn min_z(entries: &[LayerEntry]) -> i64 {
        entries.iter().map(|e| e.z).min().unwrap_or(0)
    }

    fn max_z(entries: &[LayerEntry]) -> i64 {
        entries.iter().map(|e| e.z).max().unwrap_or(0)
    }

    fn position(entries: &[LayerEntry], id: Uuid) -> Option<usize> {
        entries.iter().position(|e| e.layer.id() == id)
    }

    /// Add `layer`. Returns `false` if a layer with the same id is already present.
    ///
    /// A back-pinned layer takes the current minimum z-index; any other layer goes in front of
    /// everything.
    pub fn add(&self, layer: Arc<dyn TransformLayer>) -> bool {
        let id = layer.id();
        if self.contains(id) {
            return false;
        }
        self.events.emit(StackEvent::WillAdd(id));
        {
            let mut entries = self.entries.lock();
            let pinned = layer.stays_at_back();
            if pinned {
                let z = Self::min_z(&entries);
                entries.insert(0, LayerEntry { layer, z, pinned });
            } else {
                let z = Self::max_z(&entries) + 1;
                entries.push(LayerEntry { layer, z, pinned });
            }
            Self::sort(&mut entries);
        }
        self.events.emit(StackEvent::DidAdd(id));
        true
    }

    /// Remove the layer with `id`. Returns `false` if it is not in the stack.
    pub fn remove(&self, id: Uuid) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.events.emit(StackEvent::WillRemove(id));
        self.entries.lock().retain(|e| e.layer.id() != id);
        self.events.emit(StackEvent::DidRemove(id));
        true
    }

    /// Whether a layer with `id` is in the stack.
    pub fn contains(&self, id: Uuid) -> bool {
        Self::position(&self.entries.lock(), id).is_some()
    }

    /// Layer with `id`.
    pub fn find_layer(&self, id: Uuid) -> Option<Arc<dyn TransformLayer>> {
        let entries = self.entries.lock();
        Self::position(&entries, id).map(|i| Arc::clone(&entries[i].layer))
    }

    /// Current z-index of the layer with `id`.
    pub fn z_index_of(&self, id: Uuid) -> Option<i64> {
        let entries = self.entries.lock();
        Self::position(&entries, id).map(|i| entries[i].z)
    }

    /// Layers back to front.
    pub fn layers(&self) -> Vec<Arc<dyn TransformLayer>> {
        self.entries
            .lock()
            .iter()
            .map(|e| Arc::clone(&e.layer))
            .collect()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Receive add/remove events.
    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<StackEvent> {
        self.events.subscribe()
    }

    /// Whether the layer can step one place towards the back without passing a pinned layer.
    pub fn can_move_backward(&self, id: Uuid) -> bool {
        let entries = self.entries.lock();
        Self::can_move_backward_in(&entries, id)
    }

    fn can_move_backward_in(entries: &[LayerEntry], id: Uuid) -> bool {
        match Self::position(entries, id) {
            Some(i) if i > 0 => !entries[i].pinned && !entries[i - 1].pinned,
            _ => false,
        }
    }

    /// Whether the layer can step one place towards the front.
    pub fn can_move_forward(&self, id: Uuid) -> bool {
        let entries = self.entries.lock();
        Self::can_move_forward_in(&entries, id)
    }

    fn can_move_forward_in(entries: &[LayerEntry], id: Uuid) -> bool {
        match Self::position(entries, id) {
            Some(i) => i + 1 < entries.len() && !entries[i].pinned,
            None => false,
        }
    }

    /// Swap z-indices with the layer directly behind. Returns whether anything moved.
    pub fn move_backward(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock();
        if !Self::can_move_backward_in(&entries, id) {
            return false;
        }
        let Some(i) = Self::position(&entries, id) else {
            return false;
        };
        Self::swap_z(&mut entries, i, i - 1);
        true
    }

    /// Swap z-indices with the layer directly in front. Returns whether anything moved.
    pub fn move_forward(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock();
        if !Self::can_move_forward_in(&entries, id) {
            return false;
        }
        let Some(i) = Self::position(&entries, id) else {
            return false;
        };
        Self::swap_z(&mut entries, i, i + 1);
        true
    }

    /// Put the layer behind every other non-pinned layer.
    pub fn move_to_back(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock();
        if !Self::can_move_backward_in(&entries, id) {
            return false;
        }
        let z = Self::min_z(&entries) - 1;
        Self::set_z(&mut entries, id, z);
        true
    }

    /// Put the layer in front of every other layer.
    pub fn move_to_front(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock();
        if !Self::can_move_forward_in(&entries, id) {
            return false;
        }
        let z = Self::max_z(&entries) + 1;
        Self::set_z(&mut entries, id, z);
        true
    }

    /// Exchange the z-indices of two layers. Pinned layers keep sorting first.
    pub fn swap(&self, a: Uuid, b: Uuid) -> bool {
        let mut entries = self.entries.lock();
        match (Self::position(&entries, a), Self::position(&entries, b)) {
            (Some(i), Some(j)) => {
                Self::swap_z(&mut entries, i, j);
                true
            }
            _ => false,
        }
    }

    fn swap_z(entries: &mut [LayerEntry], i: usize, j: usize) {
        let z = entries[i].z;
        entries[i].z = entries[j].z;
        entries[j].z = z;
        Self::sort(entries);
    }

    fn set_z(entries: &mut [LayerEntry], id: Uuid, z: i64) {
        if let Some(i) = Self::position(entries, id) {
            entries[i].z = z;
        }
        Self::sort(entries);
    }

    /// Update every visible layer, finalising and dropping layers flagged for removal.
    ///
    /// Layer callbacks run without the stack lock held, so a layer may add or remove layers from
    /// inside `update`.
    pub fn update(&self, ctx: &UpdateContext<'_>) {
        let _span = tracing::debug_span!("layer_stack_update", t = %ctx.time).entered();
        let snapshot = self.layers();
        let mut removed = HashSet::new();
        for layer in &snapshot {
            if layer.should_remove() {
                self.events.emit(StackEvent::WillRemove(layer.id()));
                layer.prepare_for_removal();
                removed.insert(layer.id());
            } else if !layer.is_hidden() {
                layer.update(ctx);
            }
        }
        if removed.is_empty() {
            return;
        }
        self.entries
            .lock()
            .retain(|e| !removed.contains(&e.layer.id()));
        for id in removed {
            tracing::debug!(layer = %id, "removed flagged layer");
            self.events.emit(StackEvent::DidRemove(id));
        }
    }

    /// Fold `input` through every visible layer, back to front.
    pub fn render(&self, input: RgbaImage) -> RgbaImage {
        let _span = tracing::debug_span!("layer_stack_render").entered();
        self.layers()
            .iter()
            .filter(|layer| !layer.is_hidden())
            .fold(input, |acc, layer| {
                let out = layer.render(&acc).unwrap_or(acc);
                tracing::trace!(layer = layer.debug_name(), "rendered");
                out
            })
    }

    /// Front-most visible layer that claims a tap at `point` inside `rect`.
    pub fn test_selection(&self, point: Point, rect: Rect) -> Option<Arc<dyn TransformLayer>> {
        self.layers()
            .into_iter()
            .rev()
            .find(|layer| !layer.is_hidden() && layer.hit_test(point, rect))
    }
}

impl Default for TransformLayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransformLayerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_list()
            .entries(entries.iter().map(|e| (e.layer.debug_name().to_owned(), e.z, e.pinned)))
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/layer.rs"]
mod tests;
