//! Grid to triangle mesh conversion
//!
//! Every grid cell with a right and a down neighbor becomes a quad made of two
//! triangles:
//!
//! ```text
//!   (i,j) ---- (i,j+1)
//!     |      /    |
//!     |    /      |
//!  (i+1,j) -- (i+1,j+1)
//! ```
//!
//! Triangle one is `(i,j), (i,j+1), (i+1,j)` and triangle two is
//! `(i,j+1), (i+1,j+1), (i+1,j)`, where lattice position `(i,j)` is flattened
//! to `i * cols + j`. Vertex colors come from the volatility normalized against
//! the min/max of the whole grid.

use tracing::debug;

use crate::error::Result;
use crate::models::{Grid, Mesh, SurfaceData, VertexLayout};
use crate::utils::color::{ColorScale, VolBounds, NEUTRAL_T};

/// Configurable grid-to-mesh converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshBuilder {
    layout: VertexLayout,
    color_scale: ColorScale,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(mut self, layout: VertexLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn color_scale(mut self, color_scale: ColorScale) -> Self {
        self.color_scale = color_scale;
        self
    }

    pub fn vertex_layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn scale(&self) -> ColorScale {
        self.color_scale
    }

    /// Validate raw surface data and build its mesh.
    ///
    /// Malformed input fails with `VizError::MalformedGrid`; nothing partial
    /// is returned.
    pub fn build_from_data(&self, data: &SurfaceData) -> Result<Mesh> {
        let grid = Grid::try_from(data)?;
        Ok(self.build(&grid))
    }

    /// Build the mesh for a validated grid.
    ///
    /// Grids with fewer than two rows or columns give an empty mesh.
    pub fn build(&self, grid: &Grid) -> Mesh {
        let (rows, cols) = grid.dim();
        let bounds = VolBounds::from_values(grid.vol().iter().copied());

        let mut mesh = Mesh {
            bounds,
            rows,
            cols,
            layout: self.layout,
            ..Mesh::default()
        };

        if rows < 2 || cols < 2 {
            debug!(rows, cols, "grid too small to triangulate");
            return mesh;
        }

        let cells = (rows - 1) * (cols - 1);
        let vertex_count = match self.layout {
            VertexLayout::Lattice => rows * cols,
            VertexLayout::Cell => cells,
        };
        mesh.vertices.reserve_exact(vertex_count * 3);
        mesh.colors.reserve_exact(vertex_count * 3);
        mesh.indices.reserve_exact(cells * 6);

        let (x, y, vol) = (grid.x(), grid.y(), grid.vol());
        let stride = cols as u32;

        for i in 0..rows {
            for j in 0..cols {
                let interior = i + 1 < rows && j + 1 < cols;

                if interior || self.layout == VertexLayout::Lattice {
                    let v = vol[[i, j]];
                    mesh.vertices
                        .extend_from_slice(&[x[[i, j]] as f32, y[[i, j]] as f32, v as f32]);

                    let t = bounds.map_or(NEUTRAL_T, |b| b.normalize(v));
                    mesh.colors.extend_from_slice(&self.color_scale.rgb(t));
                }

                if interior {
                    let a = i as u32 * stride + j as u32;
                    let b = a + 1;
                    let c = a + stride;
                    let d = c + 1;
                    mesh.indices.extend_from_slice(&[a, b, c, b, d, c]);
                }
            }
        }

        debug!(
            rows,
            cols,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            layout = ?self.layout,
            "built surface mesh"
        );

        mesh
    }
}

/// Build a mesh with the default lattice layout and red-green colors.
pub fn build_mesh(grid: &Grid) -> Mesh {
    MeshBuilder::default().build(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;
    use approx::assert_abs_diff_eq;

    fn two_by_two() -> Grid {
        Grid::from_rows(
            &[vec![0.0, 1.0], vec![0.0, 1.0]],
            &[vec![0.0, 0.0], vec![1.0, 1.0]],
            &[vec![5.0, 6.0], vec![8.0, 9.0]],
        )
        .unwrap()
    }

    fn ramp(rows: usize, cols: usize) -> Grid {
        let row = |f: &dyn Fn(usize, usize) -> f64| -> Vec<Vec<f64>> {
            (0..rows).map(|i| (0..cols).map(|j| f(i, j)).collect()).collect()
        };
        Grid::from_rows(
            &row(&|i, _| i as f64 * 0.25),
            &row(&|_, j| j as f64 * 0.1),
            &row(&|i, j| 0.15 + 0.01 * (i * cols + j) as f64),
        )
        .unwrap()
    }

    #[test]
    fn single_cell_per_cell_layout() {
        let mesh = MeshBuilder::new()
            .layout(VertexLayout::Cell)
            .build(&two_by_two());

        assert_eq!(mesh.vertices, vec![0.0, 0.0, 5.0]);
        assert_eq!(mesh.colors, vec![0.0, 1.0, 0.5]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
        let bounds = mesh.bounds.unwrap();
        assert_eq!((bounds.min, bounds.max), (5.0, 9.0));
    }

    #[test]
    fn single_cell_lattice_layout() {
        let mesh = build_mesh(&two_by_two());

        assert_eq!(
            mesh.vertices,
            vec![0.0, 0.0, 5.0, 1.0, 0.0, 6.0, 0.0, 1.0, 8.0, 1.0, 1.0, 9.0]
        );
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
        let colors: Vec<[f32; 3]> = mesh.vertex_colors().collect();
        assert_eq!(colors[0], [0.0, 1.0, 0.5]);
        assert_abs_diff_eq!(colors[1][0], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(colors[2][0], 0.75, epsilon = 1e-6);
        assert_eq!(colors[3], [1.0, 0.0, 0.5]);
    }

    #[test]
    fn buffer_lengths_per_layout() {
        let grid = ramp(4, 6);
        let cells = 3 * 5;

        let cell = MeshBuilder::new().layout(VertexLayout::Cell).build(&grid);
        assert_eq!(cell.vertices.len(), 3 * cells);
        assert_eq!(cell.colors.len(), cell.vertices.len());
        assert_eq!(cell.indices.len(), 6 * cells);

        let lattice = build_mesh(&grid);
        assert_eq!(lattice.vertices.len(), 3 * 4 * 6);
        assert_eq!(lattice.colors.len(), lattice.vertices.len());
        assert_eq!(lattice.indices, cell.indices);
        assert!(lattice
            .indices
            .iter()
            .all(|&idx| (idx as usize) < lattice.vertex_count()));
    }

    #[test]
    fn triangles_share_winding() {
        let mesh = build_mesh(&ramp(3, 3));
        let cols = 3;
        for (cell, quad) in mesh.indices.chunks_exact(6).enumerate() {
            let (i, j) = (cell / 2, cell % 2);
            let a = (i * cols + j) as u32;
            assert_eq!(
                quad,
                &[a, a + 1, a + cols as u32, a + 1, a + cols as u32 + 1, a + cols as u32]
            );
        }
    }

    #[test]
    fn flat_surface_is_neutral_gray() {
        let grid = Grid::from_rows(
            &vec![vec![0.0, 1.0, 2.0]; 3],
            &[vec![0.0; 3], vec![1.0; 3], vec![2.0; 3]],
            &vec![vec![0.2; 3]; 3],
        )
        .unwrap();
        let mesh = build_mesh(&grid);
        assert!(!mesh.colors.is_empty());
        assert!(mesh.colors.iter().all(|&c| c == 0.5));
    }

    #[test]
    fn thin_grids_give_empty_meshes() {
        for (rows, cols) in [(0, 0), (1, 5), (5, 1), (1, 1)] {
            let mesh = build_mesh(&ramp(rows, cols));
            assert!(mesh.vertices.is_empty(), "{}x{}", rows, cols);
            assert!(mesh.colors.is_empty());
            assert!(mesh.indices.is_empty());
        }
    }

    #[test]
    fn thin_grid_still_reports_bounds() {
        let mesh = build_mesh(&ramp(1, 3));
        let bounds = mesh.bounds.unwrap();
        assert_abs_diff_eq!(bounds.min, 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.max, 0.17, epsilon = 1e-12);
    }

    #[test]
    fn bounds_cover_cells_without_vertices() {
        // The maximum sits in the last row, which the cell layout never emits.
        let grid = Grid::from_rows(
            &[vec![0.0, 1.0], vec![0.0, 1.0]],
            &[vec![0.0, 0.0], vec![1.0, 1.0]],
            &[vec![1.0, 2.0], vec![3.0, 11.0]],
        )
        .unwrap();
        let mesh = MeshBuilder::new().layout(VertexLayout::Cell).build(&grid);
        assert_eq!(mesh.bounds.unwrap().max, 11.0);
        assert_eq!(mesh.colors, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn build_from_data_rejects_malformed_input() {
        let data = SurfaceData {
            grid_x: vec![vec![0.0, 1.0], vec![0.0, 1.0]],
            grid_y: vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]],
            grid_vol: vec![vec![5.0, 6.0], vec![8.0, 9.0]],
        };
        let err = MeshBuilder::new().build_from_data(&data).unwrap_err();
        assert!(matches!(err, VizError::MalformedGrid(_)));
    }

    #[test]
    fn non_finite_cell_gets_neutral_color() {
        let grid = Grid::from_rows(
            &[vec![0.0, 1.0], vec![0.0, 1.0]],
            &[vec![0.0, 0.0], vec![1.0, 1.0]],
            &[vec![f64::NAN, 0.1], vec![0.2, 0.3]],
        )
        .unwrap();
        let mesh = build_mesh(&grid);
        assert_eq!(mesh.color(0), Some([0.5, 0.5, 0.5]));
        assert!(mesh.colors.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn viridis_scale_is_applied() {
        let mesh = MeshBuilder::new()
            .color_scale(ColorScale::Viridis)
            .build(&two_by_two());
        assert_eq!(mesh.color(0), Some(ColorScale::Viridis.rgb(0.0)));
        assert_eq!(mesh.color(3), Some(ColorScale::Viridis.rgb(1.0)));
    }
}
