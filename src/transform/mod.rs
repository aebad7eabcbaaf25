//! Real-time frame transform pipeline: buffer processors, z-ordered layers and the controller
//! that drives them for every captured frame.

/// Settings for building a pipeline.
pub mod config;
/// Per-frame orchestrator.
pub mod controller;
/// Stack membership events.
pub mod event;
/// Feature and orientation sources.
pub mod features;
/// Transform layers and their z-ordered stack.
pub mod layer;
/// Buffer processors and their single-flight stack.
pub mod processor;
