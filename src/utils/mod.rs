mod color;
pub mod mesh_builder;
pub mod mesh_cache;
mod plotting;

pub use color::*;
pub use mesh_builder::{build_mesh, MeshBuilder};
pub use mesh_cache::MeshCache;
pub use plotting::*;
