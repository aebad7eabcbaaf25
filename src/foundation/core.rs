use crate::foundation::error::{CutlineError, CutlineResult};

pub use kurbo::{Point, Rect, Size};

/// Kind of media carried by an asset channel or a media track.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Picture channel.
    Video,
    /// Sound channel.
    Audio,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Which family of tracks a member may be placed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    /// Tracks carrying media members.
    Media,
    /// Tracks carrying effect members.
    Effect,
}

impl std::fmt::Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Media => f.write_str("media"),
            Self::Effect => f.write_str("effect"),
        }
    }
}

/// Device orientation at the time a frame is transformed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Upright portrait.
    #[default]
    Portrait,
    /// Portrait, rotated 180 degrees.
    PortraitUpsideDown,
    /// Landscape with the top of the device to the left.
    LandscapeLeft,
    /// Landscape with the top of the device to the right.
    LandscapeRight,
}

impl Orientation {
    /// Whether width and height are swapped relative to portrait.
    pub fn is_landscape(self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }
}

/// Pixel dimensions of the render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RenderSize {
    /// Build a size, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> CutlineResult<Self> {
        if width == 0 || height == 0 {
            return Err(CutlineError::validation("render size must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Full-frame rectangle anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Size as floating point extent.
    pub fn to_size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Size with width and height swapped when `orientation` is landscape.
    pub fn oriented(self, orientation: Orientation) -> Self {
        if orientation.is_landscape() {
            Self {
                width: self.height,
                height: self.width,
            }
        } else {
            self
        }
    }
}

/// Clockwise rotation applied to a video member, in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// 90 degrees clockwise.
    Deg90,
    /// 180 degrees.
    Deg180,
    /// 270 degrees clockwise.
    Deg270,
}

impl Rotation {
    /// Rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Next quarter turn clockwise, wrapping 270 to 0.
    pub fn next_clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    /// Next quarter turn counter-clockwise, wrapping 0 to 270.
    pub fn next_counter_clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg270,
            Self::Deg90 => Self::Deg0,
            Self::Deg180 => Self::Deg90,
            Self::Deg270 => Self::Deg180,
        }
    }

    /// Affine rotating a frame of `size` and translating it back into the positive quadrant.
    pub fn to_affine(self, size: Size) -> kurbo::Affine {
        let turn = kurbo::Affine::rotate(f64::from(self.degrees()).to_radians());
        let (w, h) = (size.width, size.height);
        let shift = match self {
            Self::Deg0 => kurbo::Vec2::ZERO,
            Self::Deg90 => kurbo::Vec2::new(h, 0.0),
            Self::Deg180 => kurbo::Vec2::new(w, h),
            Self::Deg270 => kurbo::Vec2::new(0.0, w),
        };
        kurbo::Affine::translate(shift) * turn
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
