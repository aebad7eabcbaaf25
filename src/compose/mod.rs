//! Lowering of tracks into a composition backend.
//!
//! The timeline only talks to [`builder::CompositionBuilder`]; [`memory::InMemoryComposition`] is
//! the reference backend used by tests and tooling.

/// Composition builder seam.
pub mod builder;
/// In-memory reference builder.
pub mod memory;
/// Track mix output.
pub mod mix;
