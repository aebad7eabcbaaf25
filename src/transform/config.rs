use crate::{
    foundation::{
        core::RenderSize,
        error::{CutlineError, CutlineResult},
    },
    render::service::BackendKind,
};

/// Settings for building a [`TransformController`](crate::TransformController).
///
/// Missing JSON fields fall back to [`PipelineConfig::default`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Width of the rendered output, in pixels.
    pub render_width: u32,
    /// Height of the rendered output, in pixels.
    pub render_height: u32,
    /// Render service to construct.
    pub backend: BackendKind,
    /// Preview surface size; the render size when unset.
    pub preview: Option<RenderSize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render_width: 1080,
            render_height: 1920,
            backend: BackendKind::Cpu,
            preview: None,
        }
    }
}

impl PipelineConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(json: &str) -> CutlineResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CutlineError::validation(format!("parse pipeline config JSON: {e}")))
    }

    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CutlineResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| CutlineError::validation(format!("parse pipeline config JSON: {e}")))
    }

    /// Check every size is non-zero.
    pub fn validate(&self) -> CutlineResult<()> {
        self.render_size()?;
        if let Some(preview) = self.preview {
            RenderSize::new(preview.width, preview.height)
                .map_err(|_| CutlineError::validation("preview size must be non-zero"))?;
        }
        Ok(())
    }

    /// Render size as a validated [`RenderSize`].
    pub fn render_size(&self) -> CutlineResult<RenderSize> {
        RenderSize::new(self.render_width, self.render_height)
    }

    /// Effective preview surface size.
    pub fn preview_size(&self) -> CutlineResult<RenderSize> {
        match self.preview {
            Some(size) => Ok(size),
            None => self.render_size(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/config.rs"]
mod tests;
