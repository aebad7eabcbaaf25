//! Frames, pixel storage and the render services at the end of the transform pipeline.

/// CPU render service.
pub mod cpu;
/// Sample frames and their timing metadata.
pub mod frame;
/// Lockable pixel storage.
pub mod pixel_buffer;
/// Render service trait and factory.
pub mod service;
