use std::sync::Arc;

use futures_util::future::BoxFuture;
use image::RgbaImage;
use tokio::sync::watch;

use crate::{
    foundation::{core::RenderSize, core::Rect, error::CutlineResult, error::RenderError},
    render::pixel_buffer::PixelBuffer,
};

/// Latest composited image shown by a render service's preview surface.
pub type PreviewReceiver = watch::Receiver<Option<Arc<RgbaImage>>>;

/// Pixel-level renderer at the end of the transform pipeline.
///
/// Implementations do their work off the calling thread and keep the target buffer's base address
/// locked while writing to it.
pub trait RenderService: Send + Sync {
    /// Render the `target` region of `image` into `buffer`, resolving to the written buffer.
    fn render(
        &self,
        image: RgbaImage,
        target: Rect,
        buffer: PixelBuffer,
    ) -> BoxFuture<'static, Result<PixelBuffer, RenderError>>;

    /// Render `image` into `buffer` on the calling thread.
    fn render_sync(&self, image: &RgbaImage, buffer: &PixelBuffer) -> Result<(), RenderError>;

    /// Preview surface: receives every composited image after it is rendered.
    fn preview(&self) -> PreviewReceiver;
}

/// Available render service kinds.
///
/// - `Cpu` is always available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// CPU renderer built on `image::imageops`.
    #[default]
    Cpu,
}

/// Create a render service implementation whose preview surface has `preview_size`.
///
/// - `BackendKind::Cpu` is always available.
pub fn create_render_service(
    kind: BackendKind,
    preview_size: RenderSize,
) -> CutlineResult<Arc<dyn RenderService>> {
    match kind {
        BackendKind::Cpu => Ok(Arc::new(crate::render::cpu::CpuRenderService::new(
            preview_size,
        ))),
    }
}
