//! Rebuild-on-change cache for surface meshes

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ndarray::Array2;
use tracing::debug;

use crate::models::{Grid, Mesh};
use crate::utils::mesh_builder::MeshBuilder;

/// Holds the mesh of the most recently seen grid.
///
/// A mesh is a pure function of its grid, so it is rebuilt only when the grid
/// content or the builder settings change.
#[derive(Debug, Default)]
pub struct MeshCache {
    builder: MeshBuilder,
    entry: Option<(u64, Arc<Mesh>)>,
}

impl MeshCache {
    pub fn new(builder: MeshBuilder) -> Self {
        Self {
            builder,
            entry: None,
        }
    }

    pub fn builder(&self) -> MeshBuilder {
        self.builder
    }

    /// Swap builder settings, dropping the cached mesh if they differ.
    pub fn set_builder(&mut self, builder: MeshBuilder) {
        if builder != self.builder {
            self.builder = builder;
            self.entry = None;
        }
    }

    pub fn get_or_build(&mut self, grid: &Grid) -> Arc<Mesh> {
        let key = grid_fingerprint(grid);
        if let Some((cached_key, mesh)) = &self.entry {
            if *cached_key == key {
                debug!(key, "mesh cache hit");
                return Arc::clone(mesh);
            }
        }

        debug!(key, "mesh cache miss");
        let mesh = Arc::new(self.builder.build(grid));
        self.entry = Some((key, Arc::clone(&mesh)));
        mesh
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// Content hash over the grid shape and the bit patterns of every cell.
pub fn grid_fingerprint(grid: &Grid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.dim().hash(&mut hasher);
    for array in [grid.x(), grid.y(), grid.vol()] {
        hash_array(array, &mut hasher);
    }
    hasher.finish()
}

fn hash_array<H: Hasher>(array: &Array2<f64>, hasher: &mut H) {
    for v in array.iter() {
        v.to_bits().hash(hasher);
    }
}
