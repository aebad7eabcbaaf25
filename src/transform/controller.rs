use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use tracing::Instrument;

use crate::{
    foundation::{
        core::{Rect, RenderSize},
        error::{CutlineError, CutlineResult},
    },
    render::{
        frame::SampleFrame,
        service::{PreviewReceiver, RenderService, create_render_service},
    },
    transform::{
        config::PipelineConfig,
        features::{FeatureManager, FeatureSource, ManualOrientation, OrientationSource},
        layer::{TransformLayerStack, UpdateContext},
        processor::BufferProcessorStack,
    },
};

/// Per-frame orchestrator of the transform pipeline.
///
/// Each call to [`TransformController::transform`] updates the layer stack, runs the buffer
/// processors, composites the layers over the frame image, renders the result back into the
/// frame's pixel buffer and re-wraps it with the original timing.
pub struct TransformController {
    size: RenderSize,
    features: Arc<dyn FeatureSource>,
    orientation: Arc<dyn OrientationSource>,
    layers: Arc<TransformLayerStack>,
    processors: Arc<BufferProcessorStack>,
    renderer: Arc<dyn RenderService>,
}

impl TransformController {
    /// Controller with empty stacks, an empty [`FeatureManager`] and a portrait
    /// [`ManualOrientation`].
    pub fn new(size: RenderSize, renderer: Arc<dyn RenderService>) -> Self {
        Self {
            size,
            features: Arc::new(FeatureManager::new()),
            orientation: Arc::new(ManualOrientation::default()),
            layers: Arc::new(TransformLayerStack::new()),
            processors: Arc::new(BufferProcessorStack::new()),
            renderer,
        }
    }

    /// Build a controller and its render service from `config`.
    pub fn from_config(config: &PipelineConfig) -> CutlineResult<Self> {
        config.validate()?;
        let renderer = create_render_service(config.backend, config.preview_size()?)
            .map_err(|e| CutlineError::UnableToCreateRenderer(e.to_string()))?;
        tracing::debug!(backend = ?config.backend, "created render service");
        Ok(Self::new(config.render_size()?, renderer))
    }

    /// Read features from `features`.
    pub fn with_features(mut self, features: Arc<dyn FeatureSource>) -> Self {
        self.features = features;
        self
    }

    /// Read the orientation from `orientation`.
    pub fn with_orientation(mut self, orientation: Arc<dyn OrientationSource>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Use a shared layer stack.
    pub fn with_layer_stack(mut self, layers: Arc<TransformLayerStack>) -> Self {
        self.layers = layers;
        self
    }

    /// Use a shared processor stack.
    pub fn with_processor_stack(mut self, processors: Arc<BufferProcessorStack>) -> Self {
        self.processors = processors;
        self
    }

    /// Size passed to layer updates.
    pub fn size(&self) -> RenderSize {
        self.size
    }

    /// The layer stack.
    pub fn layer_stack(&self) -> &Arc<TransformLayerStack> {
        &self.layers
    }

    /// The buffer processor stack.
    pub fn processor_stack(&self) -> &Arc<BufferProcessorStack> {
        &self.processors
    }

    /// The render service.
    pub fn render_service(&self) -> &Arc<dyn RenderService> {
        &self.renderer
    }

    /// The render service's preview surface.
    pub fn preview(&self) -> PreviewReceiver {
        self.renderer.preview()
    }

    /// Transform one frame.
    ///
    /// Fails with [`CutlineError::ControllerBusy`] while the previous frame is still in the
    /// processor stack. Frames without an image plane come back unchanged, and a frame whose
    /// rendered buffer cannot be re-wrapped comes back as the original.
    pub fn transform(&self, frame: SampleFrame) -> BoxFuture<'static, CutlineResult<SampleFrame>> {
        let time = frame.presentation_time();
        let orientation = self.orientation.current_orientation();
        let features = self.features.current_features();
        self.layers.update(&UpdateContext {
            size: self.size,
            orientation,
            time,
            features: &features,
        });

        if self.processors.is_busy() {
            tracing::debug!(t = %time, "controller busy, dropping frame");
            return future::ready(Err(CutlineError::ControllerBusy)).boxed();
        }
        let processed = self.processors.process(frame, orientation);

        let layers = Arc::clone(&self.layers);
        let renderer = Arc::clone(&self.renderer);
        async move {
            let frame = processed.await.map_err(|e| match e {
                CutlineError::StackBusy => CutlineError::ControllerBusy,
                other => other,
            })?;

            let Some(buffer) = frame.image_buffer().cloned() else {
                tracing::debug!("frame has no image plane, passing through");
                return Ok(frame);
            };
            let _lock = buffer.lock_base_address();
            let input = match buffer.to_image() {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!(error = %e, "cannot read frame image, passing through");
                    return Ok(frame);
                }
            };

            let composited = layers.render(input);
            let target = Rect::new(0.0, 0.0, f64::from(buffer.width()), f64::from(buffer.height()));
            let rendered = renderer
                .render(composited, target, buffer.clone())
                .instrument(tracing::debug_span!("transform_render_final_image"))
                .await?;

            match frame.rewrap(rendered) {
                Ok(out) => Ok(out),
                Err(e) => {
                    tracing::warn!(error = %e, "re-wrap failed, returning original frame");
                    Ok(frame)
                }
            }
        }
        .instrument(tracing::debug_span!("transform_frame", t = %time))
        .boxed()
    }
}

impl std::fmt::Debug for TransformController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformController")
            .field("size", &self.size)
            .field("layers", &self.layers)
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/controller.rs"]
mod tests;
