//! Shared primitives: errors, time, geometry and observable state.

pub mod core;
pub mod error;
pub mod observe;
pub mod time;
