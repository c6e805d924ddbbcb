//! Pure domain types with minimal dependencies
//!
//! This module contains the cell data model used throughout the engine.
//! Nothing here knows about snapping, history or gestures.

pub mod annotation;
pub mod cell;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use cell::*;
pub use geometry::*;
pub use selection::*;
