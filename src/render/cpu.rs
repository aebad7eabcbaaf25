use std::sync::Arc;

use futures_util::future::BoxFuture;
use image::{RgbaImage, imageops};
use tokio::sync::watch;

use crate::{
    foundation::{
        core::{Rect, RenderSize},
        error::RenderError,
    },
    render::{
        pixel_buffer::PixelBuffer,
        service::{PreviewReceiver, RenderService},
    },
};

/// Fallback renderer that composites with `image::imageops` on the blocking thread pool.
///
/// Outside a tokio runtime the returned future does the work itself when polled.
pub struct CpuRenderService {
    preview_size: RenderSize,
    preview: Arc<watch::Sender<Option<Arc<RgbaImage>>>>,
}

impl CpuRenderService {
    /// Service whose preview surface is `preview_size`.
    pub fn new(preview_size: RenderSize) -> Self {
        Self {
            preview_size,
            preview: Arc::new(watch::Sender::new(None)),
        }
    }

    /// Preview surface dimensions.
    pub fn preview_size(&self) -> RenderSize {
        self.preview_size
    }
}

impl std::fmt::Debug for CpuRenderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderService")
            .field("preview_size", &self.preview_size)
            .field("preview_receivers", &self.preview.receiver_count())
            .finish()
    }
}

impl RenderService for CpuRenderService {
    fn render(
        &self,
        image: RgbaImage,
        target: Rect,
        buffer: PixelBuffer,
    ) -> BoxFuture<'static, Result<PixelBuffer, RenderError>> {
        let preview = Arc::clone(&self.preview);
        let preview_size = self.preview_size;
        let job = move || -> Result<PixelBuffer, RenderError> {
            let _span = tracing::debug_span!("render_final_image", w = buffer.width(), h = buffer.height())
                .entered();
            let _lock = buffer.lock_base_address();
            let frame = fit_region(&image, target, buffer.width(), buffer.height())?;
            buffer.write_image(&frame)?;
            publish_preview(&preview, &frame, preview_size);
            Ok(buffer)
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn_blocking(job);
                Box::pin(async move {
                    task.await.map_err(|e| {
                        RenderError::FailedToRenderImage(format!("render task failed: {e}"))
                    })?
                })
            }
            Err(_) => Box::pin(async move { job() }),
        }
    }

    fn render_sync(&self, image: &RgbaImage, buffer: &PixelBuffer) -> Result<(), RenderError> {
        let _lock = buffer.lock_base_address();
        let full = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
        let frame = fit_region(image, full, buffer.width(), buffer.height())?;
        buffer.write_image(&frame)?;
        publish_preview(&self.preview, &frame, self.preview_size);
        Ok(())
    }

    fn preview(&self) -> PreviewReceiver {
        self.preview.subscribe()
    }
}

// Crop `image` to `target` and scale the crop to `width`x`height`.
fn fit_region(
    image: &RgbaImage,
    target: Rect,
    width: u32,
    height: u32,
) -> Result<RgbaImage, RenderError> {
    let bounds = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
    let region = target.intersect(bounds);
    if region.width() <= 0.0 || region.height() <= 0.0 {
        return Err(RenderError::FailedToRenderImage(format!(
            "target {target:?} does not overlap the {}x{} image",
            image.width(),
            image.height()
        )));
    }
    let x = region.x0.floor() as u32;
    let y = region.y0.floor() as u32;
    let w = (region.x1.ceil() as u32).saturating_sub(x).max(1);
    let h = (region.y1.ceil() as u32).saturating_sub(y).max(1);

    let cropped = imageops::crop_imm(image, x, y, w, h).to_image();
    if cropped.dimensions() == (width, height) {
        Ok(cropped)
    } else {
        Ok(imageops::resize(
            &cropped,
            width,
            height,
            imageops::FilterType::Triangle,
        ))
    }
}

fn publish_preview(
    preview: &watch::Sender<Option<Arc<RgbaImage>>>,
    frame: &RgbaImage,
    size: RenderSize,
) {
    if preview.receiver_count() == 0 {
        return;
    }
    let shown = if frame.dimensions() == (size.width, size.height) {
        frame.clone()
    } else {
        imageops::resize(frame, size.width, size.height, imageops::FilterType::Triangle)
    };
    preview.send_replace(Some(Arc::new(shown)));
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
