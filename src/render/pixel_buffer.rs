use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use image::RgbaImage;
use parking_lot::RwLock;

use crate::foundation::error::{CutlineError, CutlineResult, RenderError};

/// Byte layout of a [`PixelBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Straight RGBA, 8 bits per channel.
    Rgba8,
    /// Straight BGRA, 8 bits per channel (typical camera output).
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }
}

struct Storage {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: RwLock<Vec<u8>>,
    locks: AtomicUsize,
}

/// Shared, lockable pixel storage handed between pipeline stages.
///
/// Pixel writes require the base address to be locked through [`PixelBuffer::lock_base_address`];
/// the returned guard unlocks on drop, so every exit path (including a dropped future) releases
/// the lock.
#[derive(Clone)]
pub struct PixelBuffer {
    storage: Arc<Storage>,
}

impl PixelBuffer {
    /// Zero-filled buffer.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> CutlineResult<Self> {
        if width == 0 || height == 0 {
            return Err(CutlineError::validation("pixel buffer size must be non-zero"));
        }
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(format.bytes_per_pixel());
        Ok(Self::from_parts(width, height, format, vec![0; len]))
    }

    /// Buffer holding a copy of `image`, stored in `format`.
    pub fn from_image(image: &RgbaImage, format: PixelFormat) -> Self {
        let mut data = image.as_raw().clone();
        if format == PixelFormat::Bgra8 {
            swap_red_blue(&mut data);
        }
        Self::from_parts(image.width(), image.height(), format, data)
    }

    fn from_parts(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            storage: Arc::new(Storage {
                width,
                height,
                format,
                data: RwLock::new(data),
                locks: AtomicUsize::new(0),
            }),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.storage.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.storage.height
    }

    /// Byte layout.
    pub fn format(&self) -> PixelFormat {
        self.storage.format
    }

    /// Lock the base address for pixel access until the guard is dropped.
    ///
    /// Locks nest: the buffer stays locked while any guard is alive.
    pub fn lock_base_address(&self) -> PixelBufferLock {
        self.storage.locks.fetch_add(1, Ordering::AcqRel);
        PixelBufferLock {
            buffer: self.clone(),
        }
    }

    /// Whether at least one lock guard is alive.
    pub fn is_locked(&self) -> bool {
        self.storage.locks.load(Ordering::Acquire) > 0
    }

    /// Number of live lock guards.
    pub fn lock_count(&self) -> usize {
        self.storage.locks.load(Ordering::Acquire)
    }

    /// Copy the pixels out as straight RGBA.
    pub fn to_image(&self) -> Result<RgbaImage, RenderError> {
        let mut data = self.storage.data.read().clone();
        if self.storage.format == PixelFormat::Bgra8 {
            swap_red_blue(&mut data);
        }
        RgbaImage::from_raw(self.storage.width, self.storage.height, data).ok_or(
            RenderError::SizeMismatch {
                image: (self.storage.width, self.storage.height),
                buffer: (self.storage.width, self.storage.height),
            },
        )
    }

    /// Overwrite the pixels with `image`. The buffer must be locked and sizes must match.
    pub fn write_image(&self, image: &RgbaImage) -> Result<(), RenderError> {
        if !self.is_locked() {
            return Err(RenderError::BufferNotLocked);
        }
        if image.dimensions() != (self.storage.width, self.storage.height) {
            return Err(RenderError::SizeMismatch {
                image: image.dimensions(),
                buffer: (self.storage.width, self.storage.height),
            });
        }
        let mut data = self.storage.data.write();
        data.copy_from_slice(image.as_raw());
        if self.storage.format == PixelFormat::Bgra8 {
            swap_red_blue(&mut data);
        }
        Ok(())
    }

    /// Whether both handles share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("storage_ptr", &Arc::as_ptr(&self.storage))
            .field("width", &self.storage.width)
            .field("height", &self.storage.height)
            .field("format", &self.storage.format)
            .field("locks", &self.lock_count())
            .finish()
    }
}

/// RAII base-address lock on a [`PixelBuffer`].
#[derive(Debug)]
pub struct PixelBufferLock {
    buffer: PixelBuffer,
}

impl PixelBufferLock {
    /// The locked buffer.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}

impl Drop for PixelBufferLock {
    fn drop(&mut self) {
        self.buffer.storage.locks.fetch_sub(1, Ordering::AcqRel);
    }
}

fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pixel_buffer.rs"]
mod tests;
