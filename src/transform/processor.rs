use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures_util::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    foundation::{
        core::Orientation,
        error::{CutlineError, CutlineResult},
        observe::EventHub,
    },
    render::frame::SampleFrame,
    transform::event::StackEvent,
};

/// A stage that works on raw frames before the image plane is extracted.
pub trait BufferProcessor: Send + Sync {
    /// Stable identity inside a stack.
    fn id(&self) -> Uuid;

    /// Name used in trace spans.
    fn debug_name(&self) -> &str;

    /// Set by the processor itself when it wants to leave the stack.
    ///
    /// Checked once per frame, before any processor runs.
    fn should_remove(&self) -> bool {
        false
    }

    /// Called instead of [`BufferProcessor::process`] on the pass that removes this processor.
    fn prepare_for_removal(&self) {}

    /// Process one frame, resolving to a new frame or the input when nothing changed.
    fn process(
        &self,
        frame: SampleFrame,
        orientation: Orientation,
    ) -> BoxFuture<'static, CutlineResult<SampleFrame>>;
}

// Clears the busy flag however the chain ends, including when its future is dropped.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Ordered chain of [`BufferProcessor`]s with single-flight admission.
///
/// While a frame's chain is in flight every new submission fails with
/// [`CutlineError::StackBusy`]; nothing is queued.
pub struct BufferProcessorStack {
    processors: Mutex<Vec<Arc<dyn BufferProcessor>>>,
    busy: Arc<AtomicBool>,
    events: EventHub<StackEvent>,
}

impl BufferProcessorStack {
    /// Empty, idle stack.
    pub fn new() -> Self {
        Self {
            processors: Mutex::new(Vec::new()),
            busy: Arc::new(AtomicBool::new(false)),
            events: EventHub::new(),
        }
    }

    /// Append `processor`. Returns `false` if a processor with the same id is already present.
    pub fn add(&self, processor: Arc<dyn BufferProcessor>) -> bool {
        let id = processor.id();
        if self.contains(id) {
            return false;
        }
        self.events.emit(StackEvent::WillAdd(id));
        self.processors.lock().push(processor);
        self.events.emit(StackEvent::DidAdd(id));
        true
    }

    /// Remove the processor with `id`. Returns `false` if it is not in the stack.
    pub fn remove(&self, id: Uuid) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.events.emit(StackEvent::WillRemove(id));
        self.processors.lock().retain(|p| p.id() != id);
        self.events.emit(StackEvent::DidRemove(id));
        true
    }

    /// Whether a processor with `id` is in the stack.
    pub fn contains(&self, id: Uuid) -> bool {
        self.processors.lock().iter().any(|p| p.id() == id)
    }

    /// Processors in chain order.
    pub fn processors(&self) -> Vec<Arc<dyn BufferProcessor>> {
        self.processors.lock().clone()
    }

    /// Number of processors.
    pub fn len(&self) -> usize {
        self.processors.lock().len()
    }

    /// Whether the stack has no processors.
    pub fn is_empty(&self) -> bool {
        self.processors.lock().is_empty()
    }

    /// Whether a frame's chain is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Receive add/remove events.
    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<StackEvent> {
        self.events.subscribe()
    }

    /// Run `frame` through every processor in order.
    ///
    /// Processors flagged for removal are finalised and dropped first. An empty stack resolves to
    /// the input frame. The stack is marked busy from this call until the returned future
    /// completes or is dropped.
    pub fn process(
        &self,
        frame: SampleFrame,
        orientation: Orientation,
    ) -> BoxFuture<'static, CutlineResult<SampleFrame>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("buffer stack busy, rejecting frame");
            return future::ready(Err(CutlineError::StackBusy)).boxed();
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let chain = self.prune_removed();
        if chain.is_empty() {
            drop(guard);
            return future::ready(Ok(frame)).boxed();
        }

        let span = tracing::debug_span!(
            "buffer_stack_process",
            processors = chain.len(),
            t = %frame.presentation_time()
        );
        async move {
            let _guard = guard;
            let mut frame = frame;
            for processor in chain {
                frame = processor.process(frame, orientation).await?;
                tracing::trace!(processor = processor.debug_name(), "processed");
            }
            Ok(frame)
        }
        .instrument(span)
        .boxed()
    }

    // Finalise and drop flagged processors, returning the survivors.
    fn prune_removed(&self) -> Vec<Arc<dyn BufferProcessor>> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .processors
            .lock()
            .iter()
            .cloned()
            .partition(|p| p.should_remove());
        if removed.is_empty() {
            return kept;
        }
        for processor in &removed {
            self.events.emit(StackEvent::WillRemove(processor.id()));
            processor.prepare_for_removal();
        }
        self.processors.lock().retain(|p| !removed.iter().any(|r| r.id() == p.id()));
        for processor in &removed {
            tracing::debug!(processor = processor.debug_name(), "removed flagged processor");
            self.events.emit(StackEvent::DidRemove(processor.id()));
        }
        kept
    }
}

impl Default for BufferProcessorStack {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BufferProcessorStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferProcessorStack")
            .field("processors", &self.len())
            .field("busy", &self.is_busy())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/processor.rs"]
mod tests;
