//! Data models for volatility surface grids and meshes
//!
//! This module contains the wire payload delivered by the pricing service,
//! the validated grid, and the triangulated mesh derived from it.

mod grid;
mod mesh;

pub use grid::*;
pub use mesh::*;
