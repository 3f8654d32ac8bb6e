use serde::{Deserialize, Serialize};

use crate::utils::VolBounds;

/// Which lattice the vertex buffer covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VertexLayout {
    /// One vertex per lattice point (R x C). Every index addresses a vertex.
    #[default]
    Lattice,
    /// One vertex per visited cell ((R-1) x (C-1)), indices still use the
    /// lattice stride C.
    Cell,
}

/// Triangulated, colored surface ready for rendering
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    /// Flat (x, y, z) triples
    pub vertices: Vec<f32>,
    /// Flat (r, g, b) triples, one per vertex
    pub colors: Vec<f32>,
    /// Triangle list, three lattice positions per triangle
    pub indices: Vec<u32>,
    /// Observed volatility range of the source grid
    pub bounds: Option<VolBounds>,
    /// Source grid rows
    pub rows: usize,
    /// Source grid columns
    pub cols: usize,
    pub layout: VertexLayout,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    pub fn vertex_colors(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.colors.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Buffer slot holding the vertex for lattice position `index`.
    ///
    /// `Lattice` stores every point at its own index. `Cell` only stores
    /// points with `i < rows - 1` and `j < cols - 1`, packed with stride
    /// `cols - 1`; other points have no vertex.
    pub fn vertex_slot(&self, index: u32) -> Option<u32> {
        if self.rows < 2 || self.cols < 2 {
            return None;
        }
        let index = index as usize;
        let (i, j) = (index / self.cols, index % self.cols);
        let slot = match self.layout {
            VertexLayout::Lattice if i < self.rows => index,
            VertexLayout::Cell if i < self.rows - 1 && j < self.cols - 1 => {
                i * (self.cols - 1) + j
            }
            _ => return None,
        };
        u32::try_from(slot).ok()
    }

    /// Position and color of the vertex at lattice position `index`.
    pub fn lattice_vertex(&self, index: u32) -> Option<([f32; 3], [f32; 3])> {
        let slot = self.vertex_slot(index)?;
        Some((self.position(slot)?, self.color(slot)?))
    }

    /// Position of a vertex, `None` when the index has no emitted vertex.
    pub fn position(&self, index: u32) -> Option<[f32; 3]> {
        let base = index as usize * 3;
        self.vertices
            .get(base..base + 3)
            .map(|p| [p[0], p[1], p[2]])
    }

    pub fn color(&self, index: u32) -> Option<[f32; 3]> {
        let base = index as usize * 3;
        self.colors.get(base..base + 3).map(|c| [c[0], c[1], c[2]])
    }
}
